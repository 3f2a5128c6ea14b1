//! Repository implementations
//!
//! Each repository owns the SQL for one group of tables and maps rows with
//! `sqlx::FromRow`. Queries are checked at runtime, so the crate builds
//! without a database.

pub mod crm;
pub mod time_record;
pub mod invoice;
pub mod settings;
pub mod mail;

pub use crm::CrmRepository;
pub use time_record::TimeRecordRepository;
pub use invoice::InvoiceRepository;
pub use settings::SettingsRepository;
pub use mail::MailRepository;
