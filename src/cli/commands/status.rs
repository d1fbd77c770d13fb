use anyhow::Context;
use serde_json::Value;

use crate::cli::{
    utils::{output_error, output_success},
    OutputFormat,
};

pub async fn check(url: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let endpoint = format!("{}/health", url.trim_end_matches('/'));
    let response = reqwest::get(&endpoint)
        .await
        .with_context(|| format!("requesting {}", endpoint))?;

    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);

    if status.is_success() {
        output_success(&output_format, &format!("{} is healthy", url), Some(body))
    } else {
        output_error(&output_format, &format!("{} reported {}", url, status), "UNHEALTHY")?;
        anyhow::bail!("server is not healthy")
    }
}
