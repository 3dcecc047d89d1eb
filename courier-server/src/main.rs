//! Courier Server
//!
//! HTTP front end for bulk WhatsApp sends.
//!
//! Architecture:
//! - Configuration: environment variables with defaults
//! - API: upload a recipients spreadsheet, watch progress, stop the job
//! - Runner: one background job at a time, driving WhatsApp Web via chromedriver
//!
//! On Ctrl-C or SIGTERM the server stops accepting requests, then stops the
//! active job and waits briefly for it to release the browser.

mod api;
mod config;
mod spreadsheet;
mod state;
mod storage;

use anyhow::{Context, Result};
use courier_runner::{JobManager, WhatsAppWebClient};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::state::AppState;
use crate::storage::UploadStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "courier_server=debug,courier_runner=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Courier server...");

    let config = Config::from_env();
    config.validate().context("Invalid configuration")?;
    info!(
        "Loaded configuration: bind_addr={}, webdriver_url={}, upload_dir={}",
        config.bind_addr,
        config.webdriver_url,
        config.upload_dir.display()
    );

    let uploads = UploadStore::new(&config.upload_dir);
    uploads.ensure_dir().await.with_context(|| {
        format!(
            "Failed to create upload directory {}",
            config.upload_dir.display()
        )
    })?;

    probe_webdriver(&config.webdriver_url).await;

    let client = Arc::new(WhatsAppWebClient::new(config.whatsapp_settings()));
    let manager = Arc::new(JobManager::new(client, config.runner_settings()));

    let state = AppState {
        manager: Arc::clone(&manager),
        uploads,
    };
    let app = api::create_router(state, config.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped accepting connections, stopping job runner");
    manager.shutdown().await;
    info!("Graceful shutdown complete");

    Ok(())
}

/// Logs whether chromedriver is reachable; jobs fail to start until it is
async fn probe_webdriver(url: &str) {
    match courier_webdriver::driver_status(url).await {
        Ok(status) if status.ready => info!("WebDriver at {} is ready", url),
        Ok(status) => warn!("WebDriver at {} is not ready: {}", url, status.message),
        Err(e) => warn!("WebDriver at {} is unreachable: {}", url, e),
    }
}

/// Resolves on Ctrl-C, or SIGTERM on Unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl-C, starting graceful shutdown"),
        () = terminate => info!("Received SIGTERM, starting graceful shutdown"),
    }
}
