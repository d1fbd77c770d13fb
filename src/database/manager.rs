use std::sync::Arc;
use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use super::memory::MemoryStore;
use super::postgres::PgStore;
use super::store::{Collection, Store};
use crate::config::{DatabaseConfig, StoreBackend};

/// Errors from the store layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate value: {0}")]
    Duplicate(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Migration error: {0}")]
    MigrationError(String),

    #[error("Document serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Builds the configured store backend.
pub struct DatabaseManager;

impl DatabaseManager {
    pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn Store>, DatabaseError> {
        match config.backend {
            StoreBackend::Memory => {
                info!("Using in-memory store");
                Ok(Arc::new(MemoryStore::new()))
            }
            StoreBackend::Postgres => {
                let pool = Self::pool(config).await?;
                if config.run_migrations {
                    Self::migrate(&pool).await?;
                }
                Ok(Arc::new(PgStore::new(pool)))
            }
        }
    }

    /// Open a Postgres pool with the configured limits
    pub async fn pool(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        if config.url.is_empty() {
            return Err(DatabaseError::ConfigMissing("DATABASE_URL"));
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&config.url)
            .await
            .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

        info!("Created database pool ({} max connections)", config.max_connections);
        Ok(pool)
    }

    /// Create the document tables and indexes if they do not exist yet
    pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
        let mut tx = pool.begin().await?;

        for statement in Self::schema_statements() {
            sqlx::query(&statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| DatabaseError::MigrationError(format!("{}: {}", statement, e)))?;
        }

        tx.commit().await?;
        info!("Schema up to date ({} collections)", Collection::ALL.len());
        Ok(())
    }

    fn schema_statements() -> Vec<String> {
        let mut statements = Vec::new();

        for collection in Collection::ALL {
            let table = collection.table_name();
            statements.push(format!(
                "CREATE TABLE IF NOT EXISTS \"{table}\" (
                    id UUID PRIMARY KEY,
                    doc JSONB NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
                )"
            ));
            statements.push(format!(
                "CREATE INDEX IF NOT EXISTS \"{table}_doc_idx\" ON \"{table}\" USING GIN (doc jsonb_path_ops)"
            ));
        }

        statements.push(
            "CREATE UNIQUE INDEX IF NOT EXISTS \"users_email_key\" ON \"users\" ((lower(doc->>'email')))".to_string(),
        );

        statements
    }
}
