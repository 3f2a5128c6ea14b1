//! Invoice repository
//!
//! Invoices and their lines. Adding a line that bills a time record also
//! links the record in the same transaction, and the link only succeeds
//! while the record is still unbilled.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::debug;

use crate::error::DatabaseError;

const LINE_COLUMNS: &str =
    "id, invoice_id, line_number, description, quantity, units, price, vat_rate, net, vat";

/// Repository for invoices and invoice lines
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: PgPool,
}

impl InvoiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates an empty invoice, numbered by the id sequence
    pub async fn insert(&self, invoice: NewInvoiceRow) -> Result<InvoiceRow, DatabaseError> {
        let row = sqlx::query_as::<_, InvoiceRow>(
            r#"
            INSERT INTO invoice (contact_id, user_id, invoice_date, currency)
            VALUES ($1, $2, $3, $4)
            RETURNING id, contact_id, user_id, invoice_date, currency, created_at
            "#,
        )
        .bind(invoice.contact_id)
        .bind(invoice.user_id)
        .bind(invoice.invoice_date)
        .bind(&invoice.currency)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get(&self, id: i64) -> Result<InvoiceRow, DatabaseError> {
        sqlx::query_as::<_, InvoiceRow>(
            r#"
            SELECT id, contact_id, user_id, invoice_date, currency, created_at
            FROM invoice
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Invoice", id))
    }

    /// Lines of an invoice in line number order
    pub async fn lines(&self, invoice_id: i64) -> Result<Vec<InvoiceLineRow>, DatabaseError> {
        let sql = format!(
            "SELECT {LINE_COLUMNS} FROM invoice_line WHERE invoice_id = $1 ORDER BY line_number"
        );
        let rows = sqlx::query_as::<_, InvoiceLineRow>(&sql)
            .bind(invoice_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Inserts a line and links the time record to it in one transaction
    ///
    /// # Errors
    ///
    /// - `NotFound` when the invoice or time record does not exist
    /// - `DuplicateEntry` when the line number is taken
    /// - `Conflict` when the time record is already billed
    pub async fn insert_line(
        &self,
        line: NewInvoiceLineRow,
        time_record_id: Option<i64>,
    ) -> Result<InvoiceLineRow, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        // Lock the invoice so concurrent line inserts serialise
        sqlx::query_scalar::<_, i64>("SELECT id FROM invoice WHERE id = $1 FOR UPDATE")
            .bind(line.invoice_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Invoice", line.invoice_id))?;

        let sql = format!(
            r#"
            INSERT INTO invoice_line (
                invoice_id, line_number, description, quantity, units,
                price, vat_rate, net, vat
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {LINE_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, InvoiceLineRow>(&sql)
            .bind(line.invoice_id)
            .bind(line.line_number)
            .bind(&line.description)
            .bind(line.quantity)
            .bind(&line.units)
            .bind(line.price)
            .bind(line.vat_rate)
            .bind(line.net)
            .bind(line.vat)
            .fetch_one(&mut *tx)
            .await?;

        if let Some(record_id) = time_record_id {
            let linked = sqlx::query(
                r#"
                UPDATE time_record
                SET invoice_line_id = $1
                WHERE id = $2 AND invoice_line_id IS NULL
                "#,
            )
            .bind(row.id)
            .bind(record_id)
            .execute(&mut *tx)
            .await?;

            if linked.rows_affected() != 1 {
                let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM time_record WHERE id = $1")
                    .bind(record_id)
                    .fetch_optional(&mut *tx)
                    .await?;
                tx.rollback().await?;
                return Err(match exists {
                    Some(_) => DatabaseError::Conflict(format!(
                        "Time record {} has already been billed",
                        record_id
                    )),
                    None => DatabaseError::not_found("TimeRecord", record_id),
                });
            }
        }

        tx.commit().await?;
        debug!(invoice_id = row.invoice_id, line_number = row.line_number, "Invoice line stored");
        Ok(row)
    }
}

/// Database row for an invoice
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InvoiceRow {
    pub id: i64,
    pub contact_id: i64,
    pub user_id: i64,
    pub invoice_date: NaiveDate,
    /// ISO 4217 code
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

/// Data for inserting an invoice
#[derive(Debug, Clone)]
pub struct NewInvoiceRow {
    pub contact_id: i64,
    pub user_id: i64,
    pub invoice_date: NaiveDate,
    pub currency: String,
}

/// Database row for an invoice line
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InvoiceLineRow {
    pub id: i64,
    pub invoice_id: i64,
    pub line_number: i32,
    pub description: Option<String>,
    pub quantity: Decimal,
    pub units: String,
    pub price: Decimal,
    pub vat_rate: Decimal,
    pub net: Decimal,
    pub vat: Decimal,
}

/// Data for inserting an invoice line, amounts already derived
#[derive(Debug, Clone)]
pub struct NewInvoiceLineRow {
    pub invoice_id: i64,
    pub line_number: i32,
    pub description: Option<String>,
    pub quantity: Decimal,
    pub units: String,
    pub price: Decimal,
    pub vat_rate: Decimal,
    pub net: Decimal,
    pub vat: Decimal,
}
