//! Invoicing Domain - Billing logged time to contacts
//!
//! This crate turns billable time records into VAT invoices:
//!
//! - **Contacts and tickets**: read-only CRM data; a contact carries the
//!   hourly rate its time is billed at
//! - **Time records**: work logged against a ticket, converted to decimal
//!   hours when billed
//! - **Invoices**: numbered lines with net and VAT amounts derived from
//!   quantity, price and rate; totals are always summed from the lines
//! - **Services**: single-contact and batch invoice creation, draft
//!   invoices with manual lines, time recording
//! - **Reports**: the daily time summary mail and chargeable time by week
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_invoice::{InvoiceCreate, InvoiceCreateBatch};
//!
//! let create = InvoiceCreate::new(port.clone(), settings.vat_rate, until);
//! let outcome = InvoiceCreateBatch::new(create).create(staff).await?;
//! for failure in &outcome.failures {
//!     eprintln!("{}: {}", failure.contact_name, failure.error);
//! }
//! ```

pub mod contact;
pub mod time_record;
pub mod invoice;
pub mod settings;
pub mod ports;
pub mod service;
pub mod report;
pub mod error;

pub use contact::{Contact, Ticket, User};
pub use time_record::{NewTimeRecord, TimeRecord};
pub use invoice::{
    Invoice, InvoiceLine, NewInvoice, NewInvoiceLine, DEFAULT_UNITS, PRICE_LIMIT, QUANTITY_LIMIT,
};
pub use settings::InvoiceSettings;
pub use ports::{
    InvoicePort, InvoicePortExt, MailPort, InvoiceDetail, DetailLine, NewMailMessage,
    TimeRecordQuery,
};
pub use service::{
    InvoiceCreate, InvoiceCreateBatch, BatchOutcome, BatchFailure, InvoiceEditor,
    TimeRecordService,
};
pub use report::{
    ChargeableTimeReport, DaySummary, TicketTime, TimeSummaryMailer, time_summary,
    time_summary_message,
};
pub use error::InvoiceError;
