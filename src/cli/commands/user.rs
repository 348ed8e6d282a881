use anyhow::Context;
use serde_json::json;

use crate::auth::password::hash_password;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::models::{validate_username, Level, NewUser, UserChanges};
use crate::database::{PgStore, Store, StoreError};

async fn connect(config: &AppConfig) -> anyhow::Result<PgStore> {
    PgStore::connect(config)
        .await
        .context("failed to connect to the database")
}

pub async fn create(
    username: &str,
    password: &str,
    manager: bool,
    config: &AppConfig,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    validate_username(username).map_err(anyhow::Error::msg)?;
    let level = if manager { Level::Manager } else { Level::User };
    let password_hash = hash_password(password, config.security.bcrypt_cost).await?;

    let store = connect(config).await?;
    let result = store
        .insert_user(NewUser { username: username.to_string(), password_hash, level })
        .await
        .with_context(|| format!("failed to create user '{}'", username));
    store.close().await;
    result?;

    output_success(
        output_format,
        &format!("Created user '{}'", username),
        Some(json!({ "username": username, "level": level.to_string() })),
    )
}

pub async fn reset_password(
    username: &str,
    password: &str,
    config: &AppConfig,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let password_hash = hash_password(password, config.security.bcrypt_cost).await?;
    let changes = UserChanges { password_hash: Some(password_hash), level: None };

    let store = connect(config).await?;
    let result = reset_and_revoke(&store, username, changes).await;
    store.close().await;

    let revoked = match result? {
        None => anyhow::bail!("user '{}' not found", username),
        Some(revoked) => revoked,
    };
    output_success(
        output_format,
        &format!("Password updated for '{}'", username),
        Some(json!({ "revoked_sessions": revoked })),
    )
}

async fn reset_and_revoke(store: &PgStore, username: &str, changes: UserChanges) -> Result<Option<u64>, StoreError> {
    if store.update_user(username, changes).await? == 0 {
        return Ok(None);
    }
    store.delete_sessions_for(username).await.map(Some)
}

pub async fn hash(password: &str, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let hash = hash_password(password, config.security.bcrypt_cost).await?;
    output_success(output_format, "Password hashed", Some(json!({ "hash": hash })))
}
