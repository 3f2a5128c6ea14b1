//! Mail queue repository
//!
//! Messages are only queued here; a separate sender delivers them and sets
//! `sent_at`.

use sqlx::PgPool;

use crate::error::DatabaseError;

#[derive(Debug, Clone)]
pub struct MailRepository {
    pool: PgPool,
}

impl MailRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Queues a message, returning its id
    pub async fn insert(
        &self,
        user_id: i64,
        recipients: &[String],
        subject: &str,
        body: &str,
    ) -> Result<i64, DatabaseError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO mail_message (user_id, recipients, subject, body)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(recipients)
        .bind(subject)
        .bind(body)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    /// Number of messages not yet sent
    pub async fn count_unsent(&self) -> Result<i64, DatabaseError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM mail_message WHERE sent_at IS NULL",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
