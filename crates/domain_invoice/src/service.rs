//! Invoicing services
//!
//! These services orchestrate the ports: creating invoices from outstanding
//! time, drafting invoices by hand and recording time.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, instrument, warn};

use core_kernel::{ContactId, Currency, InvoiceId, OperationMetadata, UserId, VatRate};

use crate::contact::Contact;
use crate::error::InvoiceError;
use crate::invoice::{Invoice, InvoiceLine, NewInvoice, NewInvoiceLine};
use crate::ports::InvoicePort;
use crate::settings::InvoiceSettings;
use crate::time_record::{NewTimeRecord, TimeRecord};

/// Creates invoices for a contact's outstanding time
///
/// Every billable, unbilled time record dated on or before `until` becomes
/// one line billed at the contact's hourly rate. The invoice itself is only
/// created once the first such record is found.
#[derive(Clone)]
pub struct InvoiceCreate {
    port: Arc<dyn InvoicePort>,
    vat_rate: VatRate,
    until: NaiveDate,
    invoice_date: NaiveDate,
    currency: Currency,
}

impl InvoiceCreate {
    /// Creates the service; invoices are dated today (UTC)
    pub fn new(port: Arc<dyn InvoicePort>, vat_rate: VatRate, until: NaiveDate) -> Self {
        Self {
            port,
            vat_rate,
            until,
            invoice_date: Utc::now().date_naive(),
            currency: Currency::default(),
        }
    }

    /// Creates the service using the configured VAT rate and currency
    pub fn from_settings(
        port: Arc<dyn InvoicePort>,
        settings: &InvoiceSettings,
        until: NaiveDate,
    ) -> Self {
        Self::new(port, settings.vat_rate, until).with_currency(settings.currency)
    }

    pub fn with_invoice_date(mut self, invoice_date: NaiveDate) -> Self {
        self.invoice_date = invoice_date;
        self
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    /// Last day whose time is included
    pub fn until(&self) -> NaiveDate {
        self.until
    }

    /// Bills the contact's outstanding time
    ///
    /// # Returns
    ///
    /// The new invoice, or None when there was nothing to bill
    ///
    /// # Errors
    ///
    /// `InvoiceError::MissingHourlyRate` when the contact has no rate, or a
    /// port error. Lines stored before a port error stay on the invoice and
    /// their records stay billed.
    #[instrument(skip(self, contact), fields(contact_id = %contact.id, until = %self.until))]
    pub async fn create(
        &self,
        user_id: UserId,
        contact: &Contact,
    ) -> Result<Option<Invoice>, InvoiceError> {
        let hourly_rate = contact
            .hourly_rate
            .ok_or_else(|| InvoiceError::MissingHourlyRate(contact.name.clone()))?;

        let records = self
            .port
            .find_unbilled_time_records(contact.id, self.until)
            .await?;

        let metadata = OperationMetadata::default()
            .initiated_by(user_id.to_string())
            .with_context("until", self.until.to_string());

        let mut invoice: Option<Invoice> = None;
        let mut line_number = 0;
        for record in records {
            if !record.is_invoiceable(self.until) {
                debug!(time_record_id = %record.id, "Skipping time record that cannot be billed yet");
                continue;
            }
            let quantity = record.invoice_quantity()?;

            let mut current = match invoice.take() {
                Some(current) => current,
                None => {
                    let created = self
                        .port
                        .create_invoice(
                            NewInvoice {
                                contact_id: contact.id,
                                user_id,
                                invoice_date: self.invoice_date,
                                currency: self.currency,
                            },
                            Some(metadata.clone()),
                        )
                        .await?;
                    info!(invoice_id = %created.id, "Created invoice");
                    created
                }
            };

            line_number += 1;
            let line = NewInvoiceLine::hours(line_number, quantity, hourly_rate, self.vat_rate);
            let stored = self
                .port
                .add_line(current.id, line, Some(record.id), Some(metadata.clone()))
                .await?;
            debug!(line_number, time_record_id = %record.id, "Billed time record");
            current.push_line(stored);
            invoice = Some(current);
        }

        if let Some(created) = &invoice {
            info!(
                invoice_id = %created.id,
                lines = created.lines.len(),
                net = %created.net(),
                "Invoice complete"
            );
        }
        Ok(invoice)
    }
}

/// A contact the batch could not invoice
#[derive(Debug)]
pub struct BatchFailure {
    pub contact_id: ContactId,
    pub contact_name: String,
    pub error: InvoiceError,
}

/// Result of a batch run
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub invoices: Vec<Invoice>,
    pub failures: Vec<BatchFailure>,
}

impl BatchOutcome {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Creates invoices for every contact
///
/// Contacts are independent: a failure for one is logged and recorded in the
/// outcome, and the rest are still invoiced.
pub struct InvoiceCreateBatch {
    create: InvoiceCreate,
}

impl InvoiceCreateBatch {
    pub fn new(create: InvoiceCreate) -> Self {
        Self { create }
    }

    /// Runs [`InvoiceCreate`] for each contact
    ///
    /// # Errors
    ///
    /// Only when the contacts cannot be listed
    #[instrument(skip(self), fields(until = %self.create.until()))]
    pub async fn create(&self, user_id: UserId) -> Result<BatchOutcome, InvoiceError> {
        let contacts = self.create.port.list_contacts().await?;
        let mut outcome = BatchOutcome::default();

        for contact in contacts {
            match self.create.create(user_id, &contact).await {
                Ok(Some(invoice)) => outcome.invoices.push(invoice),
                Ok(None) => {}
                Err(error) => {
                    warn!(contact_id = %contact.id, error = %error, "Cannot invoice contact");
                    outcome.failures.push(BatchFailure {
                        contact_id: contact.id,
                        contact_name: contact.name,
                        error,
                    });
                }
            }
        }

        info!(
            invoices = outcome.invoices.len(),
            failures = outcome.failures.len(),
            "Batch invoice run complete"
        );
        Ok(outcome)
    }
}

/// Draft invoices with lines entered by hand
pub struct InvoiceEditor {
    port: Arc<dyn InvoicePort>,
}

impl InvoiceEditor {
    pub fn new(port: Arc<dyn InvoicePort>) -> Self {
        Self { port }
    }

    /// Creates an empty invoice for a contact
    #[instrument(skip(self))]
    pub async fn create_draft(
        &self,
        user_id: UserId,
        contact_id: ContactId,
        invoice_date: NaiveDate,
    ) -> Result<Invoice, InvoiceError> {
        let contact = self.port.get_contact(contact_id).await?;
        let currency = self
            .port
            .get_settings()
            .await?
            .map(|s| s.currency)
            .unwrap_or_default();
        let invoice = self
            .port
            .create_invoice(
                NewInvoice {
                    contact_id: contact.id,
                    user_id,
                    invoice_date,
                    currency,
                },
                Some(OperationMetadata::default().initiated_by(user_id.to_string())),
            )
            .await?;
        info!(invoice_id = %invoice.id, "Created draft invoice");
        Ok(invoice)
    }

    /// Number the next line on an invoice should take
    pub async fn next_line_number(&self, invoice_id: InvoiceId) -> Result<i32, InvoiceError> {
        Ok(self.port.get_invoice(invoice_id).await?.next_line_number())
    }

    /// Adds a line that is not billed from a time record
    #[instrument(skip(self, line), fields(line_number = line.line_number))]
    pub async fn add_line(
        &self,
        invoice_id: InvoiceId,
        line: NewInvoiceLine,
    ) -> Result<InvoiceLine, InvoiceError> {
        let invoice = self.port.get_invoice(invoice_id).await?;
        invoice.check_new_line(&line)?;
        Ok(self.port.add_line(invoice_id, line, None, None).await?)
    }
}

/// Records time against tickets
pub struct TimeRecordService {
    port: Arc<dyn InvoicePort>,
}

impl TimeRecordService {
    pub fn new(port: Arc<dyn InvoicePort>) -> Self {
        Self { port }
    }

    /// Validates and stores a time record
    ///
    /// # Errors
    ///
    /// `InvoiceError::InvalidTimeRange` when the end time is not after the
    /// start time
    #[instrument(skip(self, record), fields(ticket_id = %record.ticket_id))]
    pub async fn record_time(&self, record: NewTimeRecord) -> Result<TimeRecord, InvoiceError> {
        record.validate()?;
        self.port.get_ticket(record.ticket_id).await?;
        let metadata = OperationMetadata::default().initiated_by(record.user_id.to_string());
        Ok(self.port.create_time_record(record, Some(metadata)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::{Ticket, User};
    use crate::ports::mock::MockInvoicePort;
    use chrono::NaiveTime;
    use core_kernel::{TicketId, TimeRecordId, WorkInterval};
    use rust_decimal_macros::dec;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2012, 9, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn vat() -> VatRate {
        VatRate::new(dec!(0.20)).unwrap()
    }

    fn staff() -> UserId {
        UserId::new(1)
    }

    async fn seed_contact(port: &MockInvoicePort, rate: Option<rust_decimal::Decimal>) -> Contact {
        let contact = Contact {
            id: ContactId::new(port.allocate_id().await),
            name: "Farm".to_string(),
            address: "High Street".to_string(),
            hourly_rate: rate,
        };
        port.insert_contact(contact.clone()).await;
        contact
    }

    async fn seed_ticket(port: &MockInvoicePort, contact: &Contact) -> TicketId {
        let id = TicketId::new(port.allocate_id().await);
        port.insert_ticket(Ticket {
            id,
            contact_id: contact.id,
            name: "Fence".to_string(),
            description: None,
        })
        .await;
        id
    }

    async fn seed_record(
        port: &MockInvoicePort,
        ticket_id: TicketId,
        day: u32,
        start: NaiveTime,
        end: Option<NaiveTime>,
        billable: bool,
    ) -> TimeRecordId {
        let id = TimeRecordId::new(port.allocate_id().await);
        port.insert_time_record(TimeRecord {
            id,
            ticket_id,
            user_id: staff(),
            title: "Work".to_string(),
            description: None,
            interval: WorkInterval {
                date_started: date(day),
                start_time: start,
                end_time: end,
            },
            billable,
            invoice_line_id: None,
            created_at: Utc::now(),
        })
        .await;
        id
    }

    #[tokio::test]
    async fn test_create_bills_each_record_once() {
        let port = MockInvoicePort::new();
        let contact = seed_contact(&port, Some(dec!(20.00))).await;
        let ticket = seed_ticket(&port, &contact).await;
        seed_record(&port, ticket, 3, time(9, 0), Some(time(10, 30)), true).await;
        seed_record(&port, ticket, 4, time(9, 0), Some(time(9, 30)), true).await;

        let create = InvoiceCreate::new(Arc::new(port.clone()), vat(), date(30));
        let invoice = create.create(staff(), &contact).await.unwrap().unwrap();

        assert_eq!(invoice.lines.len(), 2);
        assert_eq!(invoice.lines[0].line_number, 1);
        assert_eq!(invoice.lines[0].quantity, dec!(1.50));
        assert_eq!(invoice.net().amount(), dec!(40.00));
        assert_eq!(invoice.gross().amount(), dec!(48.00));

        let again = create.create(staff(), &contact).await.unwrap();
        assert!(again.is_none());
        assert_eq!(port.invoice_count().await, 1);
    }

    #[tokio::test]
    async fn test_create_without_hourly_rate_fails() {
        let port = MockInvoicePort::new();
        let contact = seed_contact(&port, None).await;

        let create = InvoiceCreate::new(Arc::new(port), vat(), date(30));
        let result = create.create(staff(), &contact).await;
        assert!(matches!(result, Err(InvoiceError::MissingHourlyRate(_))));
    }

    #[tokio::test]
    async fn test_running_record_is_skipped() {
        let port = MockInvoicePort::new();
        let contact = seed_contact(&port, Some(dec!(20.00))).await;
        let ticket = seed_ticket(&port, &contact).await;
        seed_record(&port, ticket, 3, time(9, 0), None, true).await;

        let create = InvoiceCreate::new(Arc::new(port.clone()), vat(), date(30));
        assert!(create.create(staff(), &contact).await.unwrap().is_none());
        assert_eq!(port.invoice_count().await, 0);
    }

    #[tokio::test]
    async fn test_editor_rejects_duplicate_line_number() {
        let port = MockInvoicePort::new();
        let contact = seed_contact(&port, Some(dec!(20.00))).await;
        let editor = InvoiceEditor::new(Arc::new(port));

        let invoice = editor.create_draft(staff(), contact.id, date(30)).await.unwrap();
        let line = NewInvoiceLine::new(1, dec!(1), "each", dec!(5.00), vat());
        editor.add_line(invoice.id, line.clone()).await.unwrap();

        let result = editor.add_line(invoice.id, line).await;
        assert!(matches!(result, Err(InvoiceError::DuplicateLineNumber { line_number: 1, .. })));
        assert_eq!(editor.next_line_number(invoice.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_record_time_rejects_end_before_start() {
        let port = MockInvoicePort::new();
        let contact = seed_contact(&port, Some(dec!(20.00))).await;
        let ticket_id = seed_ticket(&port, &contact).await;
        port.insert_user(User {
            id: staff(),
            username: "staff".to_string(),
            email: None,
            mail_time_summary: false,
        })
        .await;

        let service = TimeRecordService::new(Arc::new(port));
        let result = service
            .record_time(NewTimeRecord {
                ticket_id,
                user_id: staff(),
                title: "Fence".to_string(),
                description: None,
                date_started: date(3),
                start_time: time(11, 0),
                end_time: Some(time(10, 0)),
                billable: true,
            })
            .await;
        assert!(matches!(result, Err(InvoiceError::InvalidTimeRange(_))));
    }
}
