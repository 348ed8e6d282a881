use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use pokemon_trainers::config;
use pokemon_trainers::database::PgStore;
use pokemon_trainers::{is_production, router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DB_HOST, SESSION_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::config().clone();
    tracing::info!("Starting pokemon-trainers in {:?} mode", config.environment);

    if config.session_secret_missing() {
        anyhow::bail!("SESSION_SECRET must be set");
    }
    if !is_production!() && std::env::var("SESSION_SECRET").is_err() {
        tracing::warn!("SESSION_SECRET not set, using the development fallback secret");
    }

    let store = PgStore::connect(&config)
        .await
        .context("failed to connect to the database")?;

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let app = router(AppState::new(Arc::new(store.clone()), config));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("the server is listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    store.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
