pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

use tracing::{error, info};

use crate::commands::AppState;
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};

/// Builds application state and serves HTTP until ctrl-c.
pub async fn serve(config: AppConfig) -> AppResult<()> {
    let addr = config.bind_addr()?;
    let state = AppState::new(config)?;
    let app = crate::commands::router(state);

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|err| {
        error!(target: "app::server", %addr, error = %err, "failed to bind");
        AppError::Io(err)
    })?;
    info!(target: "app::server", %addr, "burnout-guard listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!(target: "app::server", "server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(target: "app::server", error = %err, "failed to listen for shutdown signal");
    }
}
