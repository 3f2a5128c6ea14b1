//! Time record repository

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::PgPool;

use crate::error::DatabaseError;

const COLUMNS: &str = "tr.id, tr.ticket_id, tr.user_id, tr.title, tr.description, \
     tr.date_started, tr.start_time, tr.end_time, tr.billable, tr.invoice_line_id, tr.created_at";

/// Repository for logged time
#[derive(Debug, Clone)]
pub struct TimeRecordRepository {
    pool: PgPool,
}

impl TimeRecordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Billable, unbilled records on the contact's tickets up to `until`
    ///
    /// Ordered by ticket, then start date and time, so lines for one ticket
    /// end up together on the invoice.
    pub async fn find_unbilled(
        &self,
        contact_id: i64,
        until: NaiveDate,
    ) -> Result<Vec<TimeRecordRow>, DatabaseError> {
        let sql = format!(
            r#"
            SELECT {COLUMNS}
            FROM time_record tr
            JOIN ticket t ON t.id = tr.ticket_id
            WHERE t.contact_id = $1
              AND tr.billable
              AND tr.invoice_line_id IS NULL
              AND tr.date_started <= $2
            ORDER BY tr.ticket_id, tr.date_started, tr.start_time
            "#
        );
        let rows = sqlx::query_as::<_, TimeRecordRow>(&sql)
            .bind(contact_id)
            .bind(until)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Billable records, optionally for one user and between two days
    pub async fn find_billable(
        &self,
        user_id: Option<i64>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<TimeRecordRow>, DatabaseError> {
        let sql = format!(
            r#"
            SELECT {COLUMNS}
            FROM time_record tr
            WHERE tr.billable
              AND ($1::BIGINT IS NULL OR tr.user_id = $1)
              AND ($2::DATE IS NULL OR tr.date_started >= $2)
              AND ($3::DATE IS NULL OR tr.date_started <= $3)
            ORDER BY tr.date_started, tr.start_time
            "#
        );
        let rows = sqlx::query_as::<_, TimeRecordRow>(&sql)
            .bind(user_id)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Records linked to lines of the invoice
    pub async fn find_for_invoice(&self, invoice_id: i64) -> Result<Vec<TimeRecordRow>, DatabaseError> {
        let sql = format!(
            r#"
            SELECT {COLUMNS}
            FROM time_record tr
            JOIN invoice_line il ON il.id = tr.invoice_line_id
            WHERE il.invoice_id = $1
            ORDER BY il.line_number
            "#
        );
        let rows = sqlx::query_as::<_, TimeRecordRow>(&sql)
            .bind(invoice_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn insert(&self, record: NewTimeRecordRow) -> Result<TimeRecordRow, DatabaseError> {
        let sql = format!(
            r#"
            WITH tr AS (
                INSERT INTO time_record (
                    ticket_id, user_id, title, description,
                    date_started, start_time, end_time, billable
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING *
            )
            SELECT {COLUMNS} FROM tr
            "#
        );
        let row = sqlx::query_as::<_, TimeRecordRow>(&sql)
            .bind(record.ticket_id)
            .bind(record.user_id)
            .bind(&record.title)
            .bind(&record.description)
            .bind(record.date_started)
            .bind(record.start_time)
            .bind(record.end_time)
            .bind(record.billable)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }
}

/// Database row for a time record
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TimeRecordRow {
    pub id: i64,
    pub ticket_id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub date_started: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: Option<NaiveTime>,
    pub billable: bool,
    pub invoice_line_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Data for inserting a time record
#[derive(Debug, Clone)]
pub struct NewTimeRecordRow {
    pub ticket_id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub date_started: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: Option<NaiveTime>,
    pub billable: bool,
}
