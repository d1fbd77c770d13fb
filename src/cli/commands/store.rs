use std::sync::Arc;

use anyhow::Context;
use serde_json::json;

use crate::cli::{utils::output_success, OutputFormat};
use crate::config::{AppConfig, StoreBackend};
use crate::database::{DatabaseManager, Store};

/// Store settings from the environment. The in-memory backend is refused
/// because anything written to it is gone when the command exits.
fn load() -> anyhow::Result<AppConfig> {
    let config = AppConfig::store_from_env().context("loading configuration")?;
    ensure_persistent(&config)?;
    Ok(config)
}

fn ensure_persistent(config: &AppConfig) -> anyhow::Result<()> {
    if config.database.backend == StoreBackend::Memory {
        anyhow::bail!("STORE=memory does not persist between runs; point the CLI at Postgres with DATABASE_URL");
    }
    Ok(())
}

/// Open the configured store; Postgres schema is created as part of connecting
pub(crate) async fn open() -> anyhow::Result<(Arc<dyn Store>, AppConfig)> {
    let config = load()?;
    let store = DatabaseManager::connect(&config.database)
        .await
        .context("opening the store")?;
    Ok((store, config))
}

pub async fn migrate(output_format: OutputFormat) -> anyhow::Result<()> {
    let config = load()?;
    let pool = DatabaseManager::pool(&config.database).await?;
    DatabaseManager::migrate(&pool).await?;

    output_success(
        &output_format,
        "Schema is up to date",
        Some(json!({ "environment": config.environment })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_is_refused() {
        let mut config = AppConfig::development();
        config.database.backend = StoreBackend::Memory;
        let err = ensure_persistent(&config).unwrap_err();
        assert!(err.to_string().contains("STORE=memory"));

        config.database.backend = StoreBackend::Postgres;
        assert!(ensure_persistent(&config).is_ok());
    }
}
