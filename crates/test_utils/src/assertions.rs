//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for invoices and time records that
//! give more meaningful error messages than standard assertions.

use std::collections::HashSet;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::money::{round_stored, AMOUNT_DECIMAL_PLACES};
use core_kernel::Money;
use domain_invoice::{Invoice, TimeRecord};

/// Asserts a money value has the expected amount
pub fn assert_money_eq(actual: &Money, expected: Decimal) {
    assert_eq!(
        actual.amount(),
        expected,
        "Money amount mismatch: actual={}, expected={}",
        actual,
        expected
    );
}

/// Asserts the net, VAT and gross totals of an invoice
pub fn assert_invoice_totals(invoice: &Invoice, net: Decimal, vat: Decimal, gross: Decimal) {
    assert_money_eq(&invoice.net(), net);
    assert_money_eq(&invoice.vat(), vat);
    assert_money_eq(&invoice.gross(), gross);
}

/// Asserts every line's amounts follow from its quantity, price and rate
///
/// Amounts are priced from the unrounded quantity, so the net may differ
/// from `price × quantity` by up to half a hundredth of the price.
///
/// # Panics
///
/// Panics naming the first line whose net or VAT disagrees, or when line
/// numbers repeat.
pub fn assert_lines_consistent(invoice: &Invoice) {
    let mut numbers = HashSet::new();
    for line in &invoice.lines {
        assert!(
            numbers.insert(line.line_number),
            "Line number {} appears twice on invoice {}",
            line.line_number,
            invoice.id
        );

        let cent = dec!(0.01);
        let net_slack = line.price * dec!(0.005) + cent / dec!(2);
        assert!(
            (line.net - line.price * line.quantity).abs() <= net_slack,
            "Line {} net {}: {} x {}",
            line.line_number,
            line.net,
            line.quantity,
            line.price
        );
        let vat = round_stored(line.net * line.vat_rate.as_decimal(), AMOUNT_DECIMAL_PLACES);
        assert!(
            (line.vat - vat).abs() <= cent,
            "Line {} VAT {} at {}",
            line.line_number,
            line.vat,
            line.vat_rate.percentage_label()
        );
    }
}

/// Asserts line numbers run 1, 2, 3... in order
pub fn assert_lines_numbered_from_one(invoice: &Invoice) {
    let numbers: Vec<i32> = invoice.lines.iter().map(|l| l.line_number).collect();
    let expected: Vec<i32> = (1..=numbers.len() as i32).collect();
    assert_eq!(numbers, expected, "Invoice {} line numbers", invoice.id);
}

/// Asserts no two records share an invoice line and every billed record
/// points at a line on one of `invoices`
pub fn assert_billed_once(records: &[TimeRecord], invoices: &[Invoice]) {
    let lines: HashSet<_> = invoices.iter().flat_map(|i| i.lines.iter().map(|l| l.id)).collect();
    let mut seen = HashSet::new();
    for record in records {
        if let Some(line_id) = record.invoice_line_id {
            assert!(
                seen.insert(line_id),
                "Line {} carries more than one time record (second: {})",
                line_id,
                record.id
            );
            assert!(
                lines.contains(&line_id),
                "Time record {} is linked to unknown line {}",
                record.id,
                line_id
            );
        }
    }
}

/// Asserts the bytes look like a complete PDF file
pub fn assert_pdf(bytes: &[u8]) {
    assert!(bytes.starts_with(b"%PDF-"), "Missing PDF header");
    let tail = &bytes[bytes.len().saturating_sub(16)..];
    assert!(
        tail.windows(5).any(|w| w == b"%%EOF"),
        "Missing end-of-file marker"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use core_kernel::{ContactId, Currency, InvoiceId, InvoiceLineId, UserId};
    use domain_invoice::{InvoiceLine, NewInvoiceLine};
    use rust_decimal_macros::dec;

    use crate::fixtures::MoneyFixtures;

    fn invoice(lines: &[Decimal]) -> Invoice {
        let mut invoice = Invoice {
            id: InvoiceId::new(1),
            contact_id: ContactId::new(1),
            user_id: UserId::new(1),
            invoice_date: NaiveDate::from_ymd_opt(2012, 9, 30).unwrap(),
            currency: Currency::GBP,
            lines: Vec::new(),
            created_at: Utc::now(),
        };
        for (i, quantity) in lines.iter().enumerate() {
            let n = i as i32 + 1;
            let line = NewInvoiceLine::hours(n, *quantity, dec!(20), MoneyFixtures::standard_vat());
            invoice.push_line(InvoiceLine::new(InvoiceLineId::new(i64::from(n)), invoice.id, line).unwrap());
        }
        invoice
    }

    #[test]
    fn test_totals_and_consistency() {
        let invoice = invoice(&[dec!(1.50), dec!(0.75)]);
        assert_invoice_totals(&invoice, dec!(45.00), dec!(9.00), dec!(54.00));
        assert_lines_consistent(&invoice);
        assert_lines_numbered_from_one(&invoice);
    }

    #[test]
    fn test_exactly_priced_third_is_consistent() {
        let invoice = invoice(&[dec!(20) / dec!(60)]);
        assert_invoice_totals(&invoice, dec!(6.67), dec!(1.33), dec!(8.00));
        assert_lines_consistent(&invoice);
    }

    #[test]
    #[should_panic(expected = "net")]
    fn test_inconsistent_line_panics() {
        let mut invoice = invoice(&[dec!(1)]);
        invoice.lines[0].net = dec!(99);
        assert_lines_consistent(&invoice);
    }

    #[test]
    fn test_pdf_markers() {
        assert_pdf(b"%PDF-1.4\n...\n%%EOF\n");
    }
}
