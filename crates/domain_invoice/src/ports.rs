//! Invoicing Domain Ports
//!
//! The invoicing services reach every persisted record through the traits in
//! this module, so they run unchanged against PostgreSQL or in memory.
//!
//! # Architecture
//!
//! - **InvoicePort**: contacts, tickets, users, time records, invoices and
//!   the settings record
//! - **MailPort**: queues outgoing mail; delivery happens elsewhere
//!
//! Adapters:
//!
//! - **PostgreSQL Adapter**: `infra_db::PostgresInvoiceAdapter`
//! - **Mock Adapter**: [`mock::MockInvoicePort`] for tests
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_invoice::ports::{InvoicePort, InvoicePortExt};
//! use std::sync::Arc;
//!
//! let port: Arc<dyn InvoicePort> = Arc::new(PostgresInvoiceAdapter::new(pool));
//! let detail = port.get_invoice_detail(invoice_id).await?;
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{
    ContactId, DomainPort, HealthCheckable, InvoiceId, MailMessageId, OperationMetadata, PortError,
    TicketId, TimeRecordId, UserId,
};

use crate::contact::{Contact, Ticket, User};
use crate::invoice::{Invoice, InvoiceLine, NewInvoice, NewInvoiceLine};
use crate::settings::InvoiceSettings;
use crate::time_record::{NewTimeRecord, TimeRecord};

/// Query parameters for finding billable time
#[derive(Debug, Clone, Default)]
pub struct TimeRecordQuery {
    /// Only records logged by this user
    pub user_id: Option<UserId>,
    /// First day included
    pub from: Option<NaiveDate>,
    /// Last day included
    pub to: Option<NaiveDate>,
}

impl TimeRecordQuery {
    /// All billable time
    pub fn all() -> Self {
        Self::default()
    }

    /// One user's billable time between two days inclusive
    pub fn for_user(user_id: UserId, from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            user_id: Some(user_id),
            from: Some(from),
            to: Some(to),
        }
    }

    /// True when a record falls inside the query
    pub fn matches(&self, record: &TimeRecord) -> bool {
        record.billable
            && self.user_id.map_or(true, |u| record.user_id == u)
            && self.from.map_or(true, |d| record.date_started() >= d)
            && self.to.map_or(true, |d| record.date_started() <= d)
    }
}

/// A mail message waiting to be sent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMailMessage {
    /// User the message is about
    pub user_id: UserId,
    pub recipients: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// An invoice line with the time record billed on it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailLine {
    pub line: InvoiceLine,
    pub time_record: Option<TimeRecord>,
    pub ticket: Option<Ticket>,
}

/// Everything needed to print an invoice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceDetail {
    pub invoice: Invoice,
    pub contact: Contact,
    /// Lines in line number order
    pub lines: Vec<DetailLine>,
}

/// The main port trait for invoicing operations
///
/// All methods are async and report failures as [`PortError`].
#[async_trait]
pub trait InvoicePort: DomainPort + HealthCheckable {
    // ========================================================================
    // CRM records (read-only)
    // ========================================================================

    /// All contacts in id order
    async fn list_contacts(&self) -> Result<Vec<Contact>, PortError>;

    /// Retrieves a contact, or `PortError::NotFound`
    async fn get_contact(&self, id: ContactId) -> Result<Contact, PortError>;

    /// Retrieves a ticket, or `PortError::NotFound`
    async fn get_ticket(&self, id: TicketId) -> Result<Ticket, PortError>;

    /// Retrieves a user, or `PortError::NotFound`
    async fn get_user(&self, id: UserId) -> Result<User, PortError>;

    /// All staff users in id order
    async fn list_users(&self) -> Result<Vec<User>, PortError>;

    // ========================================================================
    // Time records
    // ========================================================================

    /// Billable, unbilled records on any of the contact's tickets dated on
    /// or before `until`
    ///
    /// Ordered by ticket id, then start date and start time.
    async fn find_unbilled_time_records(
        &self,
        contact_id: ContactId,
        until: NaiveDate,
    ) -> Result<Vec<TimeRecord>, PortError>;

    /// Billable records matching the query, ordered by start date and time
    async fn find_billable_time_records(
        &self,
        query: TimeRecordQuery,
    ) -> Result<Vec<TimeRecord>, PortError>;

    /// Records billed on the lines of an invoice
    async fn find_time_records_for_invoice(
        &self,
        invoice_id: InvoiceId,
    ) -> Result<Vec<TimeRecord>, PortError>;

    /// Logs time against a ticket
    async fn create_time_record(
        &self,
        record: NewTimeRecord,
        metadata: Option<OperationMetadata>,
    ) -> Result<TimeRecord, PortError>;

    // ========================================================================
    // Invoices
    // ========================================================================

    /// Creates an empty invoice with the next sequential id
    async fn create_invoice(
        &self,
        invoice: NewInvoice,
        metadata: Option<OperationMetadata>,
    ) -> Result<Invoice, PortError>;

    /// Retrieves an invoice with its lines
    async fn get_invoice(&self, id: InvoiceId) -> Result<Invoice, PortError>;

    /// Stores a line and, when given, links the time record to it
    ///
    /// Both happen atomically. Linking fails with `PortError::Conflict` when
    /// the record is already billed, and the line is not stored.
    async fn add_line(
        &self,
        invoice_id: InvoiceId,
        line: NewInvoiceLine,
        time_record_id: Option<TimeRecordId>,
        metadata: Option<OperationMetadata>,
    ) -> Result<InvoiceLine, PortError>;

    // ========================================================================
    // Settings
    // ========================================================================

    /// The settings record, None until it has been set up
    async fn get_settings(&self) -> Result<Option<InvoiceSettings>, PortError>;
}

/// Extension trait for InvoicePort with convenience methods
#[async_trait]
pub trait InvoicePortExt: InvoicePort {
    /// Loads an invoice with its contact, time records and tickets
    async fn get_invoice_detail(&self, id: InvoiceId) -> Result<InvoiceDetail, PortError> {
        let invoice = self.get_invoice(id).await?;
        let contact = self.get_contact(invoice.contact_id).await?;

        let mut records: HashMap<_, _> = self
            .find_time_records_for_invoice(id)
            .await?
            .into_iter()
            .filter_map(|r| r.invoice_line_id.map(|line_id| (line_id, r)))
            .collect();

        let mut tickets: HashMap<TicketId, Ticket> = HashMap::new();
        let mut lines = Vec::with_capacity(invoice.lines.len());
        for line in &invoice.lines {
            let time_record = records.remove(&line.id);
            let ticket = match &time_record {
                Some(record) => {
                    if !tickets.contains_key(&record.ticket_id) {
                        let ticket = self.get_ticket(record.ticket_id).await?;
                        tickets.insert(record.ticket_id, ticket);
                    }
                    tickets.get(&record.ticket_id).cloned()
                }
                None => None,
            };
            lines.push(DetailLine {
                line: line.clone(),
                time_record,
                ticket,
            });
        }

        Ok(InvoiceDetail {
            invoice,
            contact,
            lines,
        })
    }

    /// The settings record, or `PortError::NotFound` when missing
    async fn get_settings_required(&self) -> Result<InvoiceSettings, PortError> {
        self.get_settings()
            .await?
            .ok_or_else(|| PortError::not_found("InvoiceSettings", "singleton"))
    }
}

// Blanket implementation for all InvoicePort implementors
impl<T: InvoicePort + ?Sized> InvoicePortExt for T {}

/// Port for queueing outgoing mail
#[async_trait]
pub trait MailPort: DomainPort {
    /// Queues a message for delivery
    async fn queue_mail_message(
        &self,
        message: NewMailMessage,
        metadata: Option<OperationMetadata>,
    ) -> Result<MailMessageId, PortError>;
}

/// Mock implementations for testing
///
/// The mock keeps every record in memory and is useful for unit testing
/// without a database.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;
    use chrono::Utc;

    use core_kernel::{HealthCheckResult, InvoiceLineId};

    #[derive(Debug, Default)]
    struct MockState {
        contacts: BTreeMap<ContactId, Contact>,
        tickets: BTreeMap<TicketId, Ticket>,
        users: BTreeMap<UserId, User>,
        time_records: BTreeMap<TimeRecordId, TimeRecord>,
        invoices: BTreeMap<InvoiceId, Invoice>,
        settings: Option<InvoiceSettings>,
        next_id: i64,
    }

    impl MockState {
        fn next_id(&mut self) -> i64 {
            self.next_id += 1;
            self.next_id
        }
    }

    /// In-memory mock implementation of InvoicePort
    #[derive(Debug, Default, Clone)]
    pub struct MockInvoicePort {
        state: Arc<RwLock<MockState>>,
    }

    impl MockInvoicePort {
        /// Creates a new, empty mock port
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn insert_contact(&self, contact: Contact) {
            self.state.write().await.contacts.insert(contact.id, contact);
        }

        pub async fn insert_ticket(&self, ticket: Ticket) {
            self.state.write().await.tickets.insert(ticket.id, ticket);
        }

        pub async fn insert_user(&self, user: User) {
            self.state.write().await.users.insert(user.id, user);
        }

        pub async fn insert_time_record(&self, record: TimeRecord) {
            self.state.write().await.time_records.insert(record.id, record);
        }

        pub async fn set_settings(&self, settings: Option<InvoiceSettings>) {
            self.state.write().await.settings = settings;
        }

        /// Every stored time record
        pub async fn time_records(&self) -> Vec<TimeRecord> {
            self.state.read().await.time_records.values().cloned().collect()
        }

        /// Invoices for a contact
        pub async fn invoices_for(&self, contact_id: ContactId) -> Vec<Invoice> {
            self.state
                .read()
                .await
                .invoices
                .values()
                .filter(|i| i.contact_id == contact_id)
                .cloned()
                .collect()
        }

        /// Total number of invoices
        pub async fn invoice_count(&self) -> usize {
            self.state.read().await.invoices.len()
        }

        /// Hands out an id from the shared sequence, for seeding records
        pub async fn allocate_id(&self) -> i64 {
            self.state.write().await.next_id()
        }
    }

    impl DomainPort for MockInvoicePort {}

    #[async_trait]
    impl HealthCheckable for MockInvoicePort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: "mock-invoice-port".to_string(),
                status: core_kernel::AdapterHealth::Healthy,
                latency_ms: 0,
                message: Some("Mock adapter always healthy".to_string()),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl InvoicePort for MockInvoicePort {
        async fn list_contacts(&self) -> Result<Vec<Contact>, PortError> {
            Ok(self.state.read().await.contacts.values().cloned().collect())
        }

        async fn get_contact(&self, id: ContactId) -> Result<Contact, PortError> {
            self.state
                .read()
                .await
                .contacts
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Contact", id))
        }

        async fn get_ticket(&self, id: TicketId) -> Result<Ticket, PortError> {
            self.state
                .read()
                .await
                .tickets
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Ticket", id))
        }

        async fn get_user(&self, id: UserId) -> Result<User, PortError> {
            self.state
                .read()
                .await
                .users
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("User", id))
        }

        async fn list_users(&self) -> Result<Vec<User>, PortError> {
            Ok(self.state.read().await.users.values().cloned().collect())
        }

        async fn find_unbilled_time_records(
            &self,
            contact_id: ContactId,
            until: NaiveDate,
        ) -> Result<Vec<TimeRecord>, PortError> {
            let state = self.state.read().await;
            let mut records: Vec<_> = state
                .time_records
                .values()
                .filter(|r| {
                    state
                        .tickets
                        .get(&r.ticket_id)
                        .is_some_and(|t| t.contact_id == contact_id)
                })
                .filter(|r| r.billable && !r.is_billed() && r.date_started() <= until)
                .cloned()
                .collect();
            records.sort_by_key(|r| (r.ticket_id, r.interval.date_started, r.interval.start_time));
            Ok(records)
        }

        async fn find_billable_time_records(
            &self,
            query: TimeRecordQuery,
        ) -> Result<Vec<TimeRecord>, PortError> {
            let state = self.state.read().await;
            let mut records: Vec<_> = state
                .time_records
                .values()
                .filter(|r| query.matches(r))
                .cloned()
                .collect();
            records.sort_by_key(|r| (r.interval.date_started, r.interval.start_time));
            Ok(records)
        }

        async fn find_time_records_for_invoice(
            &self,
            invoice_id: InvoiceId,
        ) -> Result<Vec<TimeRecord>, PortError> {
            let state = self.state.read().await;
            let invoice = state
                .invoices
                .get(&invoice_id)
                .ok_or_else(|| PortError::not_found("Invoice", invoice_id))?;
            let line_ids: Vec<InvoiceLineId> = invoice.lines.iter().map(|l| l.id).collect();
            Ok(state
                .time_records
                .values()
                .filter(|r| r.invoice_line_id.is_some_and(|id| line_ids.contains(&id)))
                .cloned()
                .collect())
        }

        async fn create_time_record(
            &self,
            record: NewTimeRecord,
            _metadata: Option<OperationMetadata>,
        ) -> Result<TimeRecord, PortError> {
            let mut state = self.state.write().await;
            if !state.tickets.contains_key(&record.ticket_id) {
                return Err(PortError::not_found("Ticket", record.ticket_id));
            }
            let interval = core_kernel::WorkInterval::new(
                record.date_started,
                record.start_time,
                record.end_time,
            )
            .map_err(|e| PortError::validation_field(e.to_string(), "end_time"))?;

            let id = TimeRecordId::new(state.next_id());
            let stored = TimeRecord {
                id,
                ticket_id: record.ticket_id,
                user_id: record.user_id,
                title: record.title,
                description: record.description,
                interval,
                billable: record.billable,
                invoice_line_id: None,
                created_at: Utc::now(),
            };
            state.time_records.insert(id, stored.clone());
            Ok(stored)
        }

        async fn create_invoice(
            &self,
            invoice: NewInvoice,
            _metadata: Option<OperationMetadata>,
        ) -> Result<Invoice, PortError> {
            let mut state = self.state.write().await;
            if !state.contacts.contains_key(&invoice.contact_id) {
                return Err(PortError::not_found("Contact", invoice.contact_id));
            }
            let id = InvoiceId::new(state.next_id());
            let stored = Invoice {
                id,
                contact_id: invoice.contact_id,
                user_id: invoice.user_id,
                invoice_date: invoice.invoice_date,
                currency: invoice.currency,
                lines: Vec::new(),
                created_at: Utc::now(),
            };
            state.invoices.insert(id, stored.clone());
            Ok(stored)
        }

        async fn get_invoice(&self, id: InvoiceId) -> Result<Invoice, PortError> {
            self.state
                .read()
                .await
                .invoices
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Invoice", id))
        }

        async fn add_line(
            &self,
            invoice_id: InvoiceId,
            line: NewInvoiceLine,
            time_record_id: Option<TimeRecordId>,
            _metadata: Option<OperationMetadata>,
        ) -> Result<InvoiceLine, PortError> {
            let mut state = self.state.write().await;
            let invoice = state
                .invoices
                .get(&invoice_id)
                .ok_or_else(|| PortError::not_found("Invoice", invoice_id))?;
            if invoice.lines.iter().any(|l| l.line_number == line.line_number) {
                return Err(PortError::conflict(format!(
                    "Line {} already exists on invoice {}",
                    line.line_number, invoice_id
                )));
            }
            if let Some(record_id) = time_record_id {
                let record = state
                    .time_records
                    .get(&record_id)
                    .ok_or_else(|| PortError::not_found("TimeRecord", record_id))?;
                if record.is_billed() {
                    return Err(PortError::conflict(format!(
                        "Time record {} has already been billed",
                        record_id
                    )));
                }
            }

            let line = InvoiceLine::new(InvoiceLineId::new(state.next_id()), invoice_id, line)
                .map_err(|e| PortError::validation(e.to_string()))?;
            if let Some(record_id) = time_record_id {
                if let Some(record) = state.time_records.get_mut(&record_id) {
                    record.invoice_line_id = Some(line.id);
                }
            }
            if let Some(invoice) = state.invoices.get_mut(&invoice_id) {
                invoice.push_line(line.clone());
            }
            Ok(line)
        }

        async fn get_settings(&self) -> Result<Option<InvoiceSettings>, PortError> {
            Ok(self.state.read().await.settings.clone())
        }
    }

    /// In-memory mail queue
    #[derive(Debug, Default, Clone)]
    pub struct MockMailPort {
        queued: Arc<RwLock<Vec<NewMailMessage>>>,
    }

    impl MockMailPort {
        pub fn new() -> Self {
            Self::default()
        }

        /// Messages queued so far
        pub async fn queued(&self) -> Vec<NewMailMessage> {
            self.queued.read().await.clone()
        }
    }

    impl DomainPort for MockMailPort {}

    #[async_trait]
    impl MailPort for MockMailPort {
        async fn queue_mail_message(
            &self,
            message: NewMailMessage,
            _metadata: Option<OperationMetadata>,
        ) -> Result<MailMessageId, PortError> {
            if message.recipients.is_empty() {
                return Err(PortError::validation_field("No recipients", "recipients"));
            }
            let mut queued = self.queued.write().await;
            queued.push(message);
            Ok(MailMessageId::new(queued.len() as i64))
        }
    }
}
