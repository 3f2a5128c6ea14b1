//! Domain Adapters
//!
//! Implementations of the invoicing ports on PostgreSQL. Each adapter
//! translates between domain types and the repository row types.
//!
//! # Usage
//!
//! ```rust,ignore
//! use infra_db::adapters::{PostgresInvoiceAdapter, PostgresMailAdapter};
//!
//! let invoices = PostgresInvoiceAdapter::new(pool.clone());
//! let mail = PostgresMailAdapter::new(pool);
//! ```

pub mod invoice;
pub mod mail;

pub use invoice::PostgresInvoiceAdapter;
pub use mail::PostgresMailAdapter;
