//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! time-billing test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built contacts, tickets, users and settings
//! - `builders`: Builders for time records and seeded in-memory scenarios
//! - `database`: PostgreSQL test containers
//! - `assertions`: Custom assertion helpers for invoices and time records
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
