//! Time Billing - API Server Binary
//!
//! This binary starts the HTTP API server for the time-billing system.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin invoice-api
//!
//! # Run with environment variables
//! INVOICE_PORT=8080 DATABASE_URL=postgres://... cargo run --bin invoice-api
//! ```
//!
//! # Environment Variables
//!
//! * `INVOICE_HOST` - Server host (default: 0.0.0.0)
//! * `INVOICE_PORT` - Server port (default: 8080)
//! * `INVOICE_DATABASE_URL` - PostgreSQL connection string (or `DATABASE_URL`)
//! * `INVOICE_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `INVOICE_LOG_FORMAT` - `pretty` or `json` (default: pretty)
//! * `INVOICE_LOGO_PATH` - JPEG printed in the invoice header

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresInvoiceAdapter};
use interface_api::{config::AppConfig, create_router, telemetry::init_tracing, AppState};

/// Main entry point for the API server.
///
/// Initializes logging, loads configuration, connects to the database,
/// applies migrations and starts the HTTP server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().context("Invalid configuration")?;
    init_tracing(&config.log_level, config.log_format);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        "Starting time billing API server"
    );

    let pool = create_pool(DatabaseConfig::new(&config.database_url).max_connections(10))
        .await
        .context("Cannot connect to the database")?;
    run_migrations(&pool).await.context("Migrations failed")?;

    let state = AppState::new(Arc::new(PostgresInvoiceAdapter::new(pool)), config.clone())
        .context("Cannot load the invoice logo")?;
    let app = create_router(state);

    let addr: SocketAddr = config.server_addr().parse()?;
    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Waits for Ctrl+C or SIGTERM so in-flight requests can finish.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
