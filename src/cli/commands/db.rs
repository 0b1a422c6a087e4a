use anyhow::Context;
use serde_json::json;

use crate::cli::utils::{output_error, output_success};
use crate::cli::OutputFormat;
use crate::config;
use crate::database::{DatabaseManager, IssueStore, PgIssueStore};

fn store_from_config() -> anyhow::Result<PgIssueStore> {
    let pool = DatabaseManager::connect_lazy(&config::config().database)
        .context("failed to configure database pool")?;
    Ok(PgIssueStore::new(pool))
}

/// `init-db`: create the issues table idempotently
pub async fn init_db(output_format: OutputFormat) -> anyhow::Result<()> {
    let store = store_from_config()?;
    store
        .ensure_schema()
        .await
        .context("failed to create issues table")?;
    store.pool().close().await;

    output_success(&output_format, "Issues table is ready", None)
}

/// `check-db`: run the connectivity probe and fail when it does not pass
pub async fn check_db(output_format: OutputFormat) -> anyhow::Result<()> {
    let store = store_from_config()?;
    let status = store.check_connectivity().await;
    store.pool().close().await;

    if status.reachable {
        output_success(
            &output_format,
            &status.message,
            Some(json!({ "reachable": true })),
        )
    } else {
        output_error(&output_format, &status.message)?;
        anyhow::bail!("database is unreachable")
    }
}
