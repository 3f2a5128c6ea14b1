//! Time record DTOs

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{InvoiceLineId, TicketId, TimeRecordId, UserId};
use domain_invoice::{NewTimeRecord, TimeRecord};

fn default_billable() -> bool {
    true
}

#[derive(Debug, Deserialize, Validate)]
pub struct RecordTimeRequest {
    #[validate(range(min = 1))]
    pub user_id: i64,
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    pub description: Option<String>,
    pub date_started: NaiveDate,
    pub start_time: NaiveTime,
    /// Omitted while the work is still running
    pub end_time: Option<NaiveTime>,
    #[serde(default = "default_billable")]
    pub billable: bool,
}

impl RecordTimeRequest {
    pub fn into_new_record(self, ticket_id: TicketId) -> NewTimeRecord {
        NewTimeRecord {
            ticket_id,
            user_id: UserId::new(self.user_id),
            title: self.title,
            description: self.description,
            date_started: self.date_started,
            start_time: self.start_time,
            end_time: self.end_time,
            billable: self.billable,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TimeRecordResponse {
    pub id: TimeRecordId,
    pub ticket_id: TicketId,
    pub user_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub date_started: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: Option<NaiveTime>,
    pub billable: bool,
    /// None while running
    pub minutes: Option<i64>,
    pub invoice_line_id: Option<InvoiceLineId>,
}

impl From<&TimeRecord> for TimeRecordResponse {
    fn from(record: &TimeRecord) -> Self {
        Self {
            id: record.id,
            ticket_id: record.ticket_id,
            user_id: record.user_id,
            title: record.title.clone(),
            description: record.description.clone(),
            date_started: record.interval.date_started,
            start_time: record.interval.start_time,
            end_time: record.interval.end_time,
            billable: record.billable,
            minutes: record.minutes().ok(),
            invoice_line_id: record.invoice_line_id,
        }
    }
}
