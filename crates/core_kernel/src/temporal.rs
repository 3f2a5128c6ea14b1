//! Work interval handling
//!
//! Time is logged as a start date plus wall-clock start and end times. This
//! module validates such intervals, converts them to billable quantities and
//! provides the calendar helpers used by the time reports.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("End time must be after the start time ({start} - {end})")]
    InvalidPeriod {
        start: String,
        end: String,
    },

    #[error("Interval is still open: no end time recorded")]
    OpenInterval,
}

/// A span of work on a single day
///
/// The end time is optional while the work is still in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkInterval {
    /// Day the work started
    pub date_started: NaiveDate,
    /// Wall-clock start
    pub start_time: NaiveTime,
    /// Wall-clock end, None while running
    pub end_time: Option<NaiveTime>,
}

impl WorkInterval {
    /// Creates an interval, rejecting an end time that is not after the start
    pub fn new(
        date_started: NaiveDate,
        start_time: NaiveTime,
        end_time: Option<NaiveTime>,
    ) -> Result<Self, TemporalError> {
        let interval = Self {
            date_started,
            start_time,
            end_time,
        };
        interval.validate()?;
        Ok(interval)
    }

    /// Creates an interval that has not been stopped yet
    pub fn open(date_started: NaiveDate, start_time: NaiveTime) -> Self {
        Self {
            date_started,
            start_time,
            end_time: None,
        }
    }

    /// Checks the end time is strictly after the start time
    pub fn validate(&self) -> Result<(), TemporalError> {
        match self.end_time {
            Some(end) if self.start_time >= end => Err(TemporalError::InvalidPeriod {
                start: self.start_time.format("%H:%M").to_string(),
                end: end.format("%H:%M").to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Returns true when no end time has been recorded
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    /// Start as a full timestamp
    pub fn started_at(&self) -> NaiveDateTime {
        self.date_started.and_time(self.start_time)
    }

    /// End as a full timestamp, if the interval is closed
    pub fn ended_at(&self) -> Option<NaiveDateTime> {
        self.end_time.map(|end| self.date_started.and_time(end))
    }

    /// Elapsed time of a closed interval
    pub fn duration(&self) -> Result<Duration, TemporalError> {
        let end = self.ended_at().ok_or(TemporalError::OpenInterval)?;
        Ok(end - self.started_at())
    }

    /// Elapsed whole minutes (seconds are truncated)
    pub fn minutes(&self) -> Result<i64, TemporalError> {
        Ok(self.duration()?.num_minutes())
    }

    /// Elapsed minutes including the seconds, e.g. `10.5` for 10m 30s
    pub fn exact_minutes(&self) -> Result<Decimal, TemporalError> {
        Ok(Decimal::from(self.duration()?.num_seconds()) / dec!(60))
    }

    /// Elapsed time as decimal hours, e.g. 90 minutes is `1.5`
    ///
    /// Not rounded: line amounts are priced from the exact figure and only
    /// the stored quantity is cut to two places.
    pub fn hours_quantity(&self) -> Result<Decimal, TemporalError> {
        Ok(minutes_to_hours(self.exact_minutes()?))
    }
}

/// Converts minutes to decimal hours
pub fn minutes_to_hours(minutes: Decimal) -> Decimal {
    minutes / dec!(60)
}

/// Monday of the ISO week containing `date`
pub fn week_commencing(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Human readable duration, e.g. `"1 hour, 30 minutes"`
pub fn format_minutes(minutes: i64) -> String {
    fn plural(n: i64, unit: &str) -> String {
        if n == 1 {
            format!("{} {}", n, unit)
        } else {
            format!("{} {}s", n, unit)
        }
    }

    let minutes = minutes.max(0);
    let hours = minutes / 60;
    let rest = minutes % 60;
    match (hours, rest) {
        (0, m) => plural(m, "minute"),
        (h, 0) => plural(h, "hour"),
        (h, m) => format!("{}, {}", plural(h, "hour"), plural(m, "minute")),
    }
}
