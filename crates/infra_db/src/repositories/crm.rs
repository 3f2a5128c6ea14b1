//! CRM repository
//!
//! Contacts, tickets and users. Invoicing only reads these; the insert
//! methods exist for seeding and tests.

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::error::DatabaseError;

/// Repository for contacts, tickets and users
#[derive(Debug, Clone)]
pub struct CrmRepository {
    pool: PgPool,
}

impl CrmRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All contacts in id order
    pub async fn list_contacts(&self) -> Result<Vec<ContactRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, ContactRow>(
            "SELECT id, name, address, hourly_rate FROM contact ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_contact(&self, id: i64) -> Result<ContactRow, DatabaseError> {
        sqlx::query_as::<_, ContactRow>(
            "SELECT id, name, address, hourly_rate FROM contact WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Contact", id))
    }

    pub async fn get_ticket(&self, id: i64) -> Result<TicketRow, DatabaseError> {
        sqlx::query_as::<_, TicketRow>(
            "SELECT id, contact_id, name, description FROM ticket WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Ticket", id))
    }

    pub async fn get_user(&self, id: i64) -> Result<UserRow, DatabaseError> {
        sqlx::query_as::<_, UserRow>(
            "SELECT id, username, email, mail_time_summary FROM app_user WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("User", id))
    }

    /// All users in id order
    pub async fn list_users(&self) -> Result<Vec<UserRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, email, mail_time_summary FROM app_user ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn insert_contact(
        &self,
        name: &str,
        address: &str,
        hourly_rate: Option<Decimal>,
    ) -> Result<ContactRow, DatabaseError> {
        let row = sqlx::query_as::<_, ContactRow>(
            r#"
            INSERT INTO contact (name, address, hourly_rate)
            VALUES ($1, $2, $3)
            RETURNING id, name, address, hourly_rate
            "#,
        )
        .bind(name)
        .bind(address)
        .bind(hourly_rate)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn insert_ticket(
        &self,
        contact_id: i64,
        name: &str,
        description: Option<&str>,
    ) -> Result<TicketRow, DatabaseError> {
        let row = sqlx::query_as::<_, TicketRow>(
            r#"
            INSERT INTO ticket (contact_id, name, description)
            VALUES ($1, $2, $3)
            RETURNING id, contact_id, name, description
            "#,
        )
        .bind(contact_id)
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn insert_user(
        &self,
        username: &str,
        email: Option<&str>,
        mail_time_summary: bool,
    ) -> Result<UserRow, DatabaseError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO app_user (username, email, mail_time_summary)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, mail_time_summary
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(mail_time_summary)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}

/// Database row for a contact
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ContactRow {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub hourly_rate: Option<Decimal>,
}

/// Database row for a ticket
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TicketRow {
    pub id: i64,
    pub contact_id: i64,
    pub name: String,
    pub description: Option<String>,
}

/// Database row for a user
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub mail_time_summary: bool,
}
