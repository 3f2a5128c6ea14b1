//! Infrastructure Database Layer
//!
//! PostgreSQL storage for the time-billing system using SQLx.
//!
//! # Architecture
//!
//! - **Repositories** own the SQL for a group of tables and return row types
//! - **Adapters** implement the domain ports on top of the repositories
//!
//! Billing a time record is a conditional update inside the transaction that
//! stores the invoice line, so a record can never be linked to two lines.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresInvoiceAdapter};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/billing")).await?;
//! run_migrations(&pool).await?;
//! let port = PostgresInvoiceAdapter::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;

pub use pool::{DatabasePool, DatabaseConfig, create_pool, create_pool_from_url, run_migrations};
pub use error::DatabaseError;
pub use adapters::{PostgresInvoiceAdapter, PostgresMailAdapter};
