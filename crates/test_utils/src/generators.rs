//! Property-Based Test Generators
//!
//! Proptest strategies for invoice quantities, prices, VAT rates and work
//! intervals.

use chrono::{Duration, NaiveDate, NaiveTime};
use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::{VatRate, WorkInterval};
use domain_invoice::{NewInvoiceLine, DEFAULT_UNITS};

/// Quantities at stored precision, negative for credits
pub fn quantity_strategy() -> impl Strategy<Value = Decimal> {
    (-9_999i64..99_999i64).prop_map(|hundredths| Decimal::new(hundredths, 2))
}

/// Non-negative prices at stored precision
pub fn price_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000i64).prop_map(|pence| Decimal::new(pence, 2))
}

/// VAT rates from 0% to 25% in steps of 0.1%
pub fn vat_rate_strategy() -> impl Strategy<Value = VatRate> {
    (0i64..=250i64).prop_map(|thousandths| {
        VatRate::new(Decimal::new(thousandths, 3)).unwrap_or(VatRate::ZERO)
    })
}

/// Valid lines billed in hours
pub fn new_invoice_line_strategy() -> impl Strategy<Value = NewInvoiceLine> {
    (1i32..500, quantity_strategy(), price_strategy(), vat_rate_strategy()).prop_map(
        |(line_number, quantity, price, vat_rate)| {
            NewInvoiceLine::new(line_number, quantity, DEFAULT_UNITS, price, vat_rate)
        },
    )
}

/// Whole minutes of a working day
pub fn minutes_strategy() -> impl Strategy<Value = i64> {
    1i64..=16 * 60
}

/// Closed intervals within a single day of 2012
pub fn work_interval_strategy() -> impl Strategy<Value = WorkInterval> {
    (0i64..366, 0u32..8 * 60, minutes_strategy()).prop_map(|(day, start, minutes)| {
        let date = NaiveDate::from_ymd_opt(2012, 1, 1).unwrap() + Duration::days(day);
        let start = NaiveTime::from_hms_opt(start / 60, start % 60, 0).unwrap();
        WorkInterval {
            date_started: date,
            start_time: start,
            end_time: Some(start + Duration::minutes(minutes)),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn test_generated_lines_are_valid(line in new_invoice_line_strategy()) {
            prop_assert!(line.validate().is_ok());
        }

        #[test]
        fn test_generated_intervals_are_closed(interval in work_interval_strategy()) {
            prop_assert!(interval.validate().is_ok());
            prop_assert!(interval.minutes().unwrap() > 0);
        }

        #[test]
        fn test_vat_rates_in_range(rate in vat_rate_strategy()) {
            prop_assert!(rate.as_percentage() <= Decimal::new(25, 0));
        }
    }
}
