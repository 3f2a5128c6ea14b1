//! PostgreSQL Invoice Adapter
//!
//! Implements `InvoicePort` on top of the repositories, translating between
//! database rows and domain types.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresInvoiceAdapter;
//! use domain_invoice::{InvoicePort, InvoicePortExt};
//! use std::sync::Arc;
//!
//! let port: Arc<dyn InvoicePort> = Arc::new(PostgresInvoiceAdapter::new(pool));
//! let detail = port.get_invoice_detail(invoice_id).await?;
//! ```

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use tracing::{debug, info, instrument};

use core_kernel::{
    AdapterHealth, ContactId, Currency, DomainPort, HealthCheckResult, HealthCheckable,
    InvoiceId, InvoiceLineId, OperationMetadata, PortError, TicketId, TimeRecordId, UserId,
    VatRate, WorkInterval,
};
use domain_invoice::{
    Contact, Invoice, InvoiceLine, InvoicePort, InvoiceSettings, NewInvoice, NewInvoiceLine,
    NewTimeRecord, Ticket, TimeRecord, TimeRecordQuery, User,
};

use crate::repositories::crm::{ContactRow, TicketRow, UserRow};
use crate::repositories::invoice::{InvoiceLineRow, InvoiceRow, NewInvoiceLineRow, NewInvoiceRow};
use crate::repositories::settings::SettingsRow;
use crate::repositories::time_record::{NewTimeRecordRow, TimeRecordRow};
use crate::repositories::{CrmRepository, InvoiceRepository, SettingsRepository, TimeRecordRepository};

/// PostgreSQL-backed implementation of the InvoicePort trait
///
/// Database errors become port errors through `From<DatabaseError>`:
/// missing rows are `NotFound`, an already billed time record or a taken
/// line number is `Conflict`.
#[derive(Debug, Clone)]
pub struct PostgresInvoiceAdapter {
    crm: CrmRepository,
    time_records: TimeRecordRepository,
    invoices: InvoiceRepository,
    settings: SettingsRepository,
    pool: PgPool,
}

impl PostgresInvoiceAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            crm: CrmRepository::new(pool.clone()),
            time_records: TimeRecordRepository::new(pool.clone()),
            invoices: InvoiceRepository::new(pool.clone()),
            settings: SettingsRepository::new(pool.clone()),
            pool,
        }
    }

    /// Direct access to the CRM tables, for seeding
    pub fn crm(&self) -> &CrmRepository {
        &self.crm
    }

    /// Creates or replaces the settings record
    #[instrument(skip(self, settings))]
    pub async fn save_settings(&self, settings: &InvoiceSettings) -> Result<(), PortError> {
        settings
            .validate()
            .map_err(|e| PortError::validation(e.to_string()))?;
        self.settings.save(&settings_to_row(settings)).await?;
        info!("Invoice settings saved");
        Ok(())
    }
}

impl DomainPort for PostgresInvoiceAdapter {}

#[async_trait]
impl HealthCheckable for PostgresInvoiceAdapter {
    /// Runs `SELECT 1` against the pool
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();

        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await;

        let latency_ms = start.elapsed().as_millis() as u64;
        let (status, message) = match result {
            Ok(_) => (AdapterHealth::Healthy, None),
            Err(e) => (AdapterHealth::Unhealthy, Some(format!("Database error: {}", e))),
        };
        HealthCheckResult {
            adapter_id: "postgres-invoice-adapter".to_string(),
            status,
            latency_ms,
            message,
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl InvoicePort for PostgresInvoiceAdapter {
    async fn list_contacts(&self) -> Result<Vec<Contact>, PortError> {
        let rows = self.crm.list_contacts().await?;
        Ok(rows.into_iter().map(row_to_contact).collect())
    }

    #[instrument(skip(self), fields(contact_id = %id))]
    async fn get_contact(&self, id: ContactId) -> Result<Contact, PortError> {
        Ok(row_to_contact(self.crm.get_contact(id.value()).await?))
    }

    async fn get_ticket(&self, id: TicketId) -> Result<Ticket, PortError> {
        Ok(row_to_ticket(self.crm.get_ticket(id.value()).await?))
    }

    async fn get_user(&self, id: UserId) -> Result<User, PortError> {
        Ok(row_to_user(self.crm.get_user(id.value()).await?))
    }

    async fn list_users(&self) -> Result<Vec<User>, PortError> {
        let rows = self.crm.list_users().await?;
        Ok(rows.into_iter().map(row_to_user).collect())
    }

    #[instrument(skip(self), fields(contact_id = %contact_id, until = %until))]
    async fn find_unbilled_time_records(
        &self,
        contact_id: ContactId,
        until: NaiveDate,
    ) -> Result<Vec<TimeRecord>, PortError> {
        let rows = self.time_records.find_unbilled(contact_id.value(), until).await?;
        debug!(count = rows.len(), "Unbilled time records loaded");
        Ok(rows.into_iter().map(row_to_time_record).collect())
    }

    #[instrument(skip(self))]
    async fn find_billable_time_records(
        &self,
        query: TimeRecordQuery,
    ) -> Result<Vec<TimeRecord>, PortError> {
        let rows = self
            .time_records
            .find_billable(query.user_id.map(|u| u.value()), query.from, query.to)
            .await?;
        Ok(rows.into_iter().map(row_to_time_record).collect())
    }

    async fn find_time_records_for_invoice(
        &self,
        invoice_id: InvoiceId,
    ) -> Result<Vec<TimeRecord>, PortError> {
        let rows = self.time_records.find_for_invoice(invoice_id.value()).await?;
        Ok(rows.into_iter().map(row_to_time_record).collect())
    }

    #[instrument(skip(self, record, _metadata), fields(ticket_id = %record.ticket_id))]
    async fn create_time_record(
        &self,
        record: NewTimeRecord,
        _metadata: Option<OperationMetadata>,
    ) -> Result<TimeRecord, PortError> {
        // Ticket must exist; the foreign key would only say "violation"
        self.crm.get_ticket(record.ticket_id.value()).await?;
        let row = self
            .time_records
            .insert(NewTimeRecordRow {
                ticket_id: record.ticket_id.value(),
                user_id: record.user_id.value(),
                title: record.title,
                description: record.description,
                date_started: record.date_started,
                start_time: record.start_time,
                end_time: record.end_time,
                billable: record.billable,
            })
            .await?;
        Ok(row_to_time_record(row))
    }

    #[instrument(skip(self, invoice, metadata), fields(contact_id = %invoice.contact_id))]
    async fn create_invoice(
        &self,
        invoice: NewInvoice,
        metadata: Option<OperationMetadata>,
    ) -> Result<Invoice, PortError> {
        let row = self
            .invoices
            .insert(NewInvoiceRow {
                contact_id: invoice.contact_id.value(),
                user_id: invoice.user_id.value(),
                invoice_date: invoice.invoice_date,
                currency: invoice.currency.code().to_string(),
            })
            .await?;
        info!(
            invoice_id = row.id,
            correlation_id = ?metadata.and_then(|m| m.correlation_id),
            "Invoice created"
        );
        row_to_invoice(row, Vec::new())
    }

    #[instrument(skip(self), fields(invoice_id = %id))]
    async fn get_invoice(&self, id: InvoiceId) -> Result<Invoice, PortError> {
        let row = self.invoices.get(id.value()).await?;
        let lines = self.invoices.lines(id.value()).await?;
        row_to_invoice(row, lines)
    }

    #[instrument(skip(self, line, _metadata), fields(invoice_id = %invoice_id, line_number = line.line_number))]
    async fn add_line(
        &self,
        invoice_id: InvoiceId,
        line: NewInvoiceLine,
        time_record_id: Option<TimeRecordId>,
        _metadata: Option<OperationMetadata>,
    ) -> Result<InvoiceLine, PortError> {
        let (net, vat) = line
            .amounts()
            .map_err(|e| PortError::validation(e.to_string()))?;
        let quantity = line.stored_quantity();
        let row = self
            .invoices
            .insert_line(
                NewInvoiceLineRow {
                    invoice_id: invoice_id.value(),
                    line_number: line.line_number,
                    description: line.description,
                    quantity,
                    units: line.units,
                    price: line.price,
                    vat_rate: line.vat_rate.as_decimal(),
                    net,
                    vat,
                },
                time_record_id.map(|id| id.value()),
            )
            .await?;
        row_to_line(row)
    }

    async fn get_settings(&self) -> Result<Option<InvoiceSettings>, PortError> {
        self.settings.get().await?.map(row_to_settings).transpose()
    }
}

// =============================================================================
// Conversion Functions
// =============================================================================

fn row_to_contact(row: ContactRow) -> Contact {
    Contact {
        id: ContactId::new(row.id),
        name: row.name,
        address: row.address,
        hourly_rate: row.hourly_rate,
    }
}

fn row_to_ticket(row: TicketRow) -> Ticket {
    Ticket {
        id: TicketId::new(row.id),
        contact_id: ContactId::new(row.contact_id),
        name: row.name,
        description: row.description,
    }
}

fn row_to_user(row: UserRow) -> User {
    User {
        id: UserId::new(row.id),
        username: row.username,
        email: row.email,
        mail_time_summary: row.mail_time_summary,
    }
}

fn row_to_time_record(row: TimeRecordRow) -> TimeRecord {
    TimeRecord {
        id: TimeRecordId::new(row.id),
        ticket_id: TicketId::new(row.ticket_id),
        user_id: UserId::new(row.user_id),
        title: row.title,
        description: row.description,
        interval: WorkInterval {
            date_started: row.date_started,
            start_time: row.start_time,
            end_time: row.end_time,
        },
        billable: row.billable,
        invoice_line_id: row.invoice_line_id.map(InvoiceLineId::new),
        created_at: row.created_at,
    }
}

fn parse_currency(code: &str) -> Result<Currency, PortError> {
    code.trim()
        .parse()
        .map_err(|e| PortError::internal(format!("Stored currency '{}': {}", code, e)))
}

fn parse_vat_rate(value: rust_decimal::Decimal) -> Result<VatRate, PortError> {
    VatRate::new(value).map_err(|e| PortError::internal(format!("Stored VAT rate: {}", e)))
}

fn row_to_line(row: InvoiceLineRow) -> Result<InvoiceLine, PortError> {
    Ok(InvoiceLine {
        id: InvoiceLineId::new(row.id),
        invoice_id: InvoiceId::new(row.invoice_id),
        line_number: row.line_number,
        description: row.description,
        quantity: row.quantity,
        units: row.units,
        price: row.price,
        vat_rate: parse_vat_rate(row.vat_rate)?,
        net: row.net,
        vat: row.vat,
    })
}

fn row_to_invoice(row: InvoiceRow, lines: Vec<InvoiceLineRow>) -> Result<Invoice, PortError> {
    Ok(Invoice {
        id: InvoiceId::new(row.id),
        contact_id: ContactId::new(row.contact_id),
        user_id: UserId::new(row.user_id),
        invoice_date: row.invoice_date,
        currency: parse_currency(&row.currency)?,
        lines: lines.into_iter().map(row_to_line).collect::<Result<_, _>>()?,
        created_at: row.created_at,
    })
}

fn row_to_settings(row: SettingsRow) -> Result<InvoiceSettings, PortError> {
    let vat_number = row.vat_number.trim();
    Ok(InvoiceSettings {
        vat_rate: parse_vat_rate(row.vat_rate)?,
        vat_number: (!vat_number.is_empty()).then(|| vat_number.to_string()),
        name_and_address: InvoiceSettings::split_lines(&row.name_and_address),
        phone_number: row.phone_number,
        footer: InvoiceSettings::split_lines(&row.footer),
        file_name_prefix: row.file_name_prefix,
        currency: parse_currency(&row.currency)?,
    })
}

fn settings_to_row(settings: &InvoiceSettings) -> SettingsRow {
    SettingsRow {
        vat_rate: settings.vat_rate.as_decimal(),
        vat_number: settings.vat_number().unwrap_or_default().to_string(),
        name_and_address: settings.name_and_address.join("\n"),
        phone_number: settings.phone_number.clone(),
        footer: settings.footer.join("\n"),
        file_name_prefix: settings.file_name_prefix.clone(),
        currency: settings.currency.code().to_string(),
    }
}
