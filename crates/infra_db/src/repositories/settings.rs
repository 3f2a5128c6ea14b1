//! Invoice settings repository
//!
//! The settings table holds at most one row, keyed by `id = 1`.

use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::error::DatabaseError;

/// Repository for the settings singleton
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The settings row, None until it has been saved
    pub async fn get(&self) -> Result<Option<SettingsRow>, DatabaseError> {
        let row = sqlx::query_as::<_, SettingsRow>(
            r#"
            SELECT vat_rate, vat_number, name_and_address, phone_number,
                   footer, file_name_prefix, currency
            FROM invoice_settings
            WHERE id = 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Creates or replaces the settings row
    pub async fn save(&self, settings: &SettingsRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO invoice_settings (
                id, vat_rate, vat_number, name_and_address, phone_number,
                footer, file_name_prefix, currency
            ) VALUES (1, $1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                vat_rate = EXCLUDED.vat_rate,
                vat_number = EXCLUDED.vat_number,
                name_and_address = EXCLUDED.name_and_address,
                phone_number = EXCLUDED.phone_number,
                footer = EXCLUDED.footer,
                file_name_prefix = EXCLUDED.file_name_prefix,
                currency = EXCLUDED.currency
            "#,
        )
        .bind(settings.vat_rate)
        .bind(&settings.vat_number)
        .bind(&settings.name_and_address)
        .bind(&settings.phone_number)
        .bind(&settings.footer)
        .bind(&settings.file_name_prefix)
        .bind(&settings.currency)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// Database row for the settings; multi-line fields are newline separated
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SettingsRow {
    pub vat_rate: Decimal,
    pub vat_number: String,
    pub name_and_address: String,
    pub phone_number: String,
    pub footer: String,
    pub file_name_prefix: String,
    pub currency: String,
}
