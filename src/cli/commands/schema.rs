use anyhow::Context;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::PgStore;

pub async fn init(config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let store = PgStore::connect(config)
        .await
        .context("failed to connect to the database")?;
    store.apply_schema().await.context("failed to apply schema")?;
    store.close().await;

    output_success(
        output_format,
        &format!("Schema ready in database '{}'", config.database.name),
        None,
    )
}
