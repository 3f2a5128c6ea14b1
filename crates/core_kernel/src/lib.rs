//! Core Kernel - Foundational types for the time-billing system
//!
//! This crate provides the building blocks shared by every other crate:
//! - Money and VAT rate types with precise decimal arithmetic
//! - Work intervals and calendar helpers for time records
//! - Integer identifiers for persisted records
//! - Port error and health types for the storage adapters

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod ports;
pub mod error;

pub use money::{Money, Currency, MoneyError, VatRate};
pub use temporal::{WorkInterval, TemporalError};
pub use identifiers::{
    ContactId, TicketId, UserId, TimeRecordId, InvoiceId, InvoiceLineId, MailMessageId,
};
pub use ports::{
    PortError, DomainPort, AdapterHealth, HealthCheckResult, HealthCheckable, OperationMetadata,
};
pub use error::CoreError;
