//! Test Fixtures
//!
//! Pre-built test data for the records invoicing works with. All dates fall
//! in September 2012 so tests can bill "up to the end of the month".

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{ContactId, Currency, TicketId, UserId, VatRate};
use domain_invoice::{Contact, InvoiceSettings, Ticket, User};

/// Fixture for rates and prices
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// Hourly rate of the farm contact
    pub fn farm_rate() -> Decimal {
        dec!(20.00)
    }

    /// Hourly rate of the smallholding contact
    pub fn smallholding_rate() -> Decimal {
        dec!(30.00)
    }

    /// Standard UK VAT rate (20%)
    pub fn standard_vat() -> VatRate {
        VatRate::new(dec!(0.20)).unwrap()
    }

    /// The previous UK rate (17.5%)
    pub fn old_vat() -> VatRate {
        VatRate::new(dec!(0.175)).unwrap()
    }

    pub fn zero_vat() -> VatRate {
        VatRate::new(Decimal::ZERO).unwrap()
    }
}

/// Fixture for dates and times
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Monday 3 September 2012
    pub fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2012, 9, 3).unwrap()
    }

    /// Day `day` of September 2012
    pub fn september(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2012, 9, day).unwrap()
    }

    /// Last day of September 2012, the default invoice cut-off
    pub fn month_end() -> NaiveDate {
        Self::september(30)
    }

    pub fn time(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    /// Early on the morning after the fixture week, when the summary mail runs
    pub fn summary_run() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2012, 9, 8, 6, 0, 0).unwrap()
    }
}

/// Fixture for CRM records
pub struct EntityFixtures;

impl EntityFixtures {
    pub fn farm() -> Contact {
        Contact {
            id: ContactId::new(1),
            name: "Farm".to_string(),
            address: "High Street\nHatherleigh\nEX20 3JB".to_string(),
            hourly_rate: Some(MoneyFixtures::farm_rate()),
        }
    }

    pub fn smallholding() -> Contact {
        Contact {
            id: ContactId::new(2),
            name: "Smallholding".to_string(),
            address: "Sheepwash".to_string(),
            hourly_rate: Some(MoneyFixtures::smallholding_rate()),
        }
    }

    /// A contact with no hourly rate, which cannot be invoiced
    pub fn unrated() -> Contact {
        Contact {
            id: ContactId::new(3),
            name: "Village Hall".to_string(),
            address: "Iddesleigh".to_string(),
            hourly_rate: None,
        }
    }

    pub fn ticket(id: i64, contact: &Contact, name: &str) -> Ticket {
        Ticket {
            id: TicketId::new(id),
            contact_id: contact.id,
            name: name.to_string(),
            description: None,
        }
    }

    /// Staff member who logs time and wants the summary mail
    pub fn staff() -> User {
        User {
            id: UserId::new(1),
            username: "patrick".to_string(),
            email: Some("patrick@example.com".to_string()),
            mail_time_summary: true,
        }
    }

    /// Staff member without a mail address
    pub fn quiet_staff() -> User {
        User {
            id: UserId::new(2),
            username: "malcolm".to_string(),
            email: None,
            mail_time_summary: true,
        }
    }

    pub fn settings() -> InvoiceSettings {
        InvoiceSettings {
            vat_rate: MoneyFixtures::standard_vat(),
            vat_number: Some("GB123456789".to_string()),
            name_and_address: vec![
                "Moorland Software".to_string(),
                "Market Street".to_string(),
                "Okehampton".to_string(),
            ],
            phone_number: "01837 123456".to_string(),
            footer: vec!["Payment within 30 days".to_string()],
            file_name_prefix: "invoice".to_string(),
            currency: Currency::GBP,
        }
    }
}
