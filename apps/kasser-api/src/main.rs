//! # Kasser API
//!
//! REST server for the multi-tenant Kasser POS backend.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kasser API Server                                │
//! │                                                                         │
//! │  Checkout terminal ───► HTTP (8080) ───► Handlers ───► kasser-db       │
//! │                              │                             │            │
//! │                              ▼                             ▼            │
//! │                     Bearer JWT → TenantContext      SQLite (WAL)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use kasser_api::{ApiConfig, AppState};
use kasser_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,kasser_api=debug,tower_http=debug".into()),
        )
        .with_target(true)
        .init();

    info!("Starting Kasser API server...");

    // Load configuration
    let config = ApiConfig::load().context("loading configuration")?;
    info!(
        port = config.http_port,
        database = %config.database_path.display(),
        pricing = %config.pricing,
        "Configuration loaded"
    );

    // Open database (migrations run on connect)
    let db_config =
        DbConfig::new(config.database_path.clone()).max_connections(config.db_max_connections);
    let db = Database::new(db_config)
        .await
        .context("opening database")?
        .with_checkout_config(config.checkout()?);

    // Build server address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let app = AppState::new(db.clone(), &config).into_router();

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
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
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
