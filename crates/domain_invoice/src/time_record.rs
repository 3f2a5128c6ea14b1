//! Time records
//!
//! A time record is one user's work on a ticket. Once linked to an invoice
//! line it counts as billed and is never billed again.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{InvoiceLineId, TemporalError, TicketId, TimeRecordId, UserId, WorkInterval};

use crate::error::InvoiceError;

/// Logged work against a ticket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRecord {
    pub id: TimeRecordId,
    pub ticket_id: TicketId,
    pub user_id: UserId,
    pub title: String,
    pub description: Option<String>,
    #[serde(flatten)]
    pub interval: WorkInterval,
    pub billable: bool,
    /// Line this record was billed on
    pub invoice_line_id: Option<InvoiceLineId>,
    pub created_at: DateTime<Utc>,
}

impl TimeRecord {
    /// Day the work started
    pub fn date_started(&self) -> NaiveDate {
        self.interval.date_started
    }

    /// True once linked to an invoice line
    pub fn is_billed(&self) -> bool {
        self.invoice_line_id.is_some()
    }

    /// True while no end time has been recorded
    pub fn is_running(&self) -> bool {
        self.interval.is_open()
    }

    /// Whole minutes worked
    pub fn minutes(&self) -> Result<i64, TemporalError> {
        self.interval.minutes()
    }

    /// Hours as an invoice quantity, e.g. 1 hour 30 minutes is `1.50`
    pub fn invoice_quantity(&self) -> Result<Decimal, TemporalError> {
        self.interval.hours_quantity()
    }

    /// Could this record go on an invoice covering work up to `until`
    pub fn is_invoiceable(&self, until: NaiveDate) -> bool {
        self.billable && !self.is_billed() && !self.is_running() && self.date_started() <= until
    }

    /// `"Mon 03 Sep 2012 from 09:00 to 10:30"`
    pub fn period_label(&self) -> String {
        let mut label = format!(
            "{} from {}",
            self.interval.date_started.format("%a %d %b %Y"),
            self.interval.start_time.format("%H:%M"),
        );
        if let Some(end) = self.interval.end_time {
            label.push_str(&format!(" to {}", end.format("%H:%M")));
        }
        label
    }
}

/// Request to log time against a ticket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTimeRecord {
    pub ticket_id: TicketId,
    pub user_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub date_started: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: Option<NaiveTime>,
    pub billable: bool,
}

impl NewTimeRecord {
    /// Checks the request and returns its interval
    pub fn validate(&self) -> Result<WorkInterval, InvoiceError> {
        if self.title.trim().is_empty() {
            return Err(InvoiceError::Validation("Title is required".to_string()));
        }
        if self.title.chars().count() > 100 {
            return Err(InvoiceError::Validation(
                "Title cannot be longer than 100 characters".to_string(),
            ));
        }
        Ok(WorkInterval::new(self.date_started, self.start_time, self.end_time)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record(end: Option<NaiveTime>) -> TimeRecord {
        TimeRecord {
            id: TimeRecordId::new(1),
            ticket_id: TicketId::new(1),
            user_id: UserId::new(1),
            title: "Fence".to_string(),
            description: None,
            interval: WorkInterval {
                date_started: NaiveDate::from_ymd_opt(2012, 9, 3).unwrap(),
                start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                end_time: end,
            },
            billable: true,
            invoice_line_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_period_label() {
        let r = record(NaiveTime::from_hms_opt(10, 30, 0));
        assert_eq!(r.period_label(), "Mon 03 Sep 2012 from 09:00 to 10:30");
        assert_eq!(r.invoice_quantity().unwrap(), dec!(1.50));
    }

    #[test]
    fn test_running_record_is_not_invoiceable() {
        let until = NaiveDate::from_ymd_opt(2012, 9, 30).unwrap();
        assert!(!record(None).is_invoiceable(until));
        assert!(record(NaiveTime::from_hms_opt(10, 0, 0)).is_invoiceable(until));
    }

    #[test]
    fn test_record_after_cutoff_is_not_invoiceable() {
        let r = record(NaiveTime::from_hms_opt(10, 0, 0));
        assert!(!r.is_invoiceable(NaiveDate::from_ymd_opt(2012, 9, 2).unwrap()));
        assert!(r.is_invoiceable(NaiveDate::from_ymd_opt(2012, 9, 3).unwrap()));
    }
}
