//! Invoicing domain errors

use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::{InvoiceId, MoneyError, PortError, TemporalError, TimeRecordId};

/// Errors that can occur in the invoicing domain
#[derive(Debug, Error)]
pub enum InvoiceError {
    /// Time cannot be billed to a contact without a rate
    #[error("Hourly rate for the contact has not been set: {0}")]
    MissingHourlyRate(String),

    /// Invoice settings have not been configured
    #[error("Invoice settings have not been set up")]
    MissingSettings,

    /// Time record interval is invalid
    #[error("Invalid time range: {0}")]
    InvalidTimeRange(#[from] TemporalError),

    /// Line price below zero (credits use a negative quantity instead)
    #[error("Price cannot be negative: {0}")]
    NegativePrice(Decimal),

    /// Line numbers start at 1
    #[error("Invalid line number: {0}")]
    InvalidLineNumber(i32),

    /// A line with this number already exists on the invoice
    #[error("Line {line_number} already exists on invoice {invoice_id}")]
    DuplicateLineNumber {
        invoice_id: InvoiceId,
        line_number: i32,
    },

    /// Units must fit the stored column
    #[error("Units '{0}' exceed 5 characters")]
    UnitsTooLong(String),

    /// The time record is already linked to an invoice line
    #[error("Time record {0} has already been billed")]
    AlreadyBilled(TimeRecordId),

    /// Money error
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    /// Storage error
    #[error(transparent)]
    Port(#[from] PortError),

    /// Other validation failure
    #[error("Validation error: {0}")]
    Validation(String),
}

impl InvoiceError {
    /// Returns true for failures caused by the caller's input or setup
    pub fn is_validation(&self) -> bool {
        !matches!(self, InvoiceError::Port(_))
    }

    /// Returns true when the underlying record does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, InvoiceError::Port(e) if e.is_not_found())
    }
}
