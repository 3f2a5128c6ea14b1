//! `invoice-admin`: batch invoicing, printing and reports from the shell
//!
//! ```bash
//! invoice-admin create-invoices --until 2012-09-30 --user 1
//! invoice-admin print-invoice --invoice 42 --out /tmp
//! invoice-admin mail-time-summary --days 7
//! ```
//!
//! Reads the same `INVOICE_*` environment as the API server.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresInvoiceAdapter, PostgresMailAdapter};
use interface_api::admin::{run, AdminContext, Cli};
use interface_api::{config::AppConfig, telemetry::init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::from_env().context("Invalid configuration")?;
    init_tracing(&config.log_level, config.log_format);

    let pool = create_pool(DatabaseConfig::new(&config.database_url).max_connections(2))
        .await
        .context("Cannot connect to the database")?;
    run_migrations(&pool).await.context("Migrations failed")?;

    let ctx = AdminContext {
        port: Arc::new(PostgresInvoiceAdapter::new(pool.clone())),
        mail: Arc::new(PostgresMailAdapter::new(pool)),
        config,
    };
    run(cli.command, &ctx).await
}
