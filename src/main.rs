mod api;
mod app_state;
mod config;
mod core;
mod domain;
mod errors;
mod logging;
mod routes;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

use crate::app_state::build_app_state;
use crate::config::AppConfig;
use crate::routes::app_router;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env()?;
    let _log_guard = logging::init_logging(&config.log_dir)?;

    info!("Starting swarmdeck-core {}", env!("CARGO_PKG_VERSION"));
    info!("Registry records from {}", config.registry_file().display());

    let state = build_app_state(&config)?;
    let app = app_router(state);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
