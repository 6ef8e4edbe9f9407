use anyhow::Context;
use tracing::info;

use crate::auth::{load_key_set, TokenValidator};
use crate::config::AppConfig;
use crate::database::{open_store, reset_and_seed};
use crate::routes;
use crate::state::AppState;

pub async fn handle(config: AppConfig) -> anyhow::Result<()> {
    config.validate()?;
    info!("Starting drinks API in {:?} mode", config.environment);

    let store = open_store(&config.database)
        .await
        .context("failed to open drink store")?;
    if config.database.reset_on_boot {
        reset_and_seed(store.as_ref()).await?;
    }

    let keys = load_key_set(&config.security).await?;
    info!("Loaded {} signing key(s)", keys.keys.len());
    let validator = TokenValidator::from_config(&config.security, keys)?;

    let state = AppState::new(store, validator);
    let app = routes::app(state, &config.security);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Drinks API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
