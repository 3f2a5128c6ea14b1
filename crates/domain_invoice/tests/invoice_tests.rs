//! Tests for invoices, lines and time records

use chrono::{NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{
    ContactId, Currency, InvoiceId, InvoiceLineId, TicketId, UserId, VatRate,
};
use domain_invoice::{
    Invoice, InvoiceError, InvoiceLine, NewInvoiceLine, NewTimeRecord,
};

fn vat() -> VatRate {
    VatRate::new(dec!(0.20)).unwrap()
}

fn empty_invoice() -> Invoice {
    Invoice {
        id: InvoiceId::new(1),
        contact_id: ContactId::new(1),
        user_id: UserId::new(1),
        invoice_date: NaiveDate::from_ymd_opt(2012, 9, 30).unwrap(),
        currency: Currency::GBP,
        lines: Vec::new(),
        created_at: Utc::now(),
    }
}

fn add(invoice: &mut Invoice, line: NewInvoiceLine) {
    line.validate().unwrap();
    let id = InvoiceLineId::new(invoice.lines.len() as i64 + 1);
    invoice.push_line(InvoiceLine::new(id, invoice.id, line).unwrap());
}

mod totals {
    use super::*;

    #[test]
    fn test_create_with_lines() {
        let mut invoice = empty_invoice();
        add(&mut invoice, NewInvoiceLine::hours(1, dec!(1.3), dec!(300.00), vat()));
        add(&mut invoice, NewInvoiceLine::hours(2, dec!(2.4), dec!(200.23), vat()));

        assert_eq!(invoice.net().amount(), dec!(870.55));
        assert_eq!(invoice.gross().amount(), dec!(1044.66));
        assert_eq!(invoice.vat().amount(), dec!(174.11));
    }

    #[test]
    fn test_empty_invoice_totals_are_zero() {
        let invoice = empty_invoice();
        assert!(invoice.net().is_zero());
        assert!(invoice.gross().is_zero());
        assert!(!invoice.has_lines());
    }

    #[test]
    fn test_line_gross_is_net_plus_vat() {
        let line = InvoiceLine::new(
            InvoiceLineId::new(1),
            InvoiceId::new(1),
            NewInvoiceLine::hours(1, dec!(1.3), dec!(300.00), vat()),
        )
        .unwrap();
        assert_eq!(line.net, dec!(390.00));
        assert_eq!(line.vat, dec!(78.00));
        assert_eq!(line.gross(), dec!(468.00));
    }

    #[test]
    fn test_invoice_number() {
        let mut invoice = empty_invoice();
        invoice.id = InvoiceId::new(42);
        assert_eq!(invoice.invoice_number(), "000042");
    }
}

mod line_numbers {
    use super::*;

    #[test]
    fn test_get_first_line_number() {
        assert_eq!(empty_invoice().next_line_number(), 1);
    }

    #[test]
    fn test_get_next_line_number() {
        let mut invoice = empty_invoice();
        add(&mut invoice, NewInvoiceLine::hours(2, dec!(1.3), dec!(300.00), vat()));
        assert_eq!(invoice.next_line_number(), 3);
        assert!(invoice.has_lines());
    }

    #[test]
    fn test_duplicate_line_number_is_rejected() {
        let mut invoice = empty_invoice();
        add(&mut invoice, NewInvoiceLine::hours(1, dec!(1), dec!(10), vat()));

        let result = invoice.check_new_line(&NewInvoiceLine::hours(1, dec!(1), dec!(10), vat()));
        assert!(matches!(result, Err(InvoiceError::DuplicateLineNumber { line_number: 1, .. })));
    }
}

mod credit_notes {
    use super::*;

    fn credit_note() -> Invoice {
        let mut invoice = empty_invoice();
        add(&mut invoice, NewInvoiceLine::new(1, dec!(-1), "each", dec!(1.01), vat()));
        invoice
    }

    #[test]
    fn test_positive_lines_sum() {
        let mut invoice = empty_invoice();
        add(&mut invoice, NewInvoiceLine::new(1, dec!(1), "each", dec!(10.01), vat()));
        add(&mut invoice, NewInvoiceLine::new(2, dec!(1), "each", dec!(0.99), vat()));
        assert_eq!(invoice.net().amount(), dec!(11.00));
        assert_eq!(invoice.description(), "Invoice");
    }

    #[test]
    fn test_allow_negative_quantity() {
        assert_eq!(credit_note().net().amount(), dec!(-1.01));
    }

    #[test]
    fn test_description() {
        assert_eq!(credit_note().description(), "Credit note");
        assert!(credit_note().is_credit_note());
    }

    #[test]
    fn test_no_negative_price() {
        let line = NewInvoiceLine::new(1, dec!(1), "each", dec!(-10.01), vat());
        assert!(matches!(line.validate(), Err(InvoiceError::NegativePrice(_))));
    }

    #[test]
    fn test_units_are_limited_to_five_characters() {
        let line = NewInvoiceLine::new(1, dec!(1), "months", dec!(1), vat());
        assert!(matches!(line.validate(), Err(InvoiceError::UnitsTooLong(_))));
    }
}

mod time_records {
    use super::*;

    fn request(start: (u32, u32), end: Option<(u32, u32)>) -> NewTimeRecord {
        NewTimeRecord {
            ticket_id: TicketId::new(1),
            user_id: UserId::new(1),
            title: "Fence".to_string(),
            description: None,
            date_started: NaiveDate::from_ymd_opt(2012, 9, 3).unwrap(),
            start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            end_time: end.map(|(h, m)| NaiveTime::from_hms_opt(h, m, 0).unwrap()),
            billable: true,
        }
    }

    #[test]
    fn test_end_before_start_is_a_validation_error() {
        let result = request((11, 0), Some((10, 0))).validate();
        assert!(matches!(result, Err(InvoiceError::InvalidTimeRange(_))));
    }

    #[test]
    fn test_running_record_is_valid() {
        let interval = request((11, 0), None).validate().unwrap();
        assert!(interval.is_open());
    }

    #[test]
    fn test_blank_title_is_rejected() {
        let mut r = request((9, 0), Some((10, 0)));
        r.title = "  ".to_string();
        assert!(matches!(r.validate(), Err(InvoiceError::Validation(_))));
    }
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn net_is_sum_of_line_nets(
            quantities in proptest::collection::vec(-1_000i64..10_000i64, 1..20),
            price_pence in 0i64..100_000i64,
        ) {
            let mut invoice = empty_invoice();
            for (i, q) in quantities.iter().enumerate() {
                add(
                    &mut invoice,
                    NewInvoiceLine::hours(
                        i as i32 + 1,
                        Decimal::new(*q, 2),
                        Decimal::new(price_pence, 2),
                        vat(),
                    ),
                );
            }
            let expected: Decimal = invoice.lines.iter().map(|l| l.net).sum();
            prop_assert_eq!(invoice.net().amount(), expected);
            prop_assert_eq!(invoice.gross().amount(), invoice.net().amount() + invoice.vat().amount());
        }
    }
}

mod creation {
    use super::*;
    use std::sync::Arc;

    use domain_invoice::InvoiceCreate;
    use test_utils::{
        MoneyFixtures, Scenario, ScenarioBuilder, TemporalFixtures, TestTimeRecordBuilder,
    };

    fn create_until(scenario: &Scenario, until: NaiveDate) -> InvoiceCreate {
        InvoiceCreate::new(Arc::new(scenario.port.clone()), MoneyFixtures::standard_vat(), until)
    }

    #[tokio::test]
    async fn test_record_dated_on_until_is_billed() {
        let scenario = ScenarioBuilder::new().build().await;
        let until = TemporalFixtures::september(10);
        let on_until = scenario
            .record(TestTimeRecordBuilder::new(&scenario.fence).on(until))
            .await;

        let invoice = create_until(&scenario, until)
            .create(scenario.staff.id, &scenario.farm)
            .await
            .unwrap()
            .unwrap();

        let records = scenario.port.time_records().await;
        let stored = records.iter().find(|r| r.id == on_until.id).unwrap();
        assert_eq!(stored.invoice_line_id, Some(invoice.lines[0].id));
    }

    #[tokio::test]
    async fn test_record_after_until_stays_unbilled() {
        let scenario = ScenarioBuilder::new().build().await;
        let until = TemporalFixtures::september(10);
        let day_after = scenario
            .record(TestTimeRecordBuilder::new(&scenario.fence).on(TemporalFixtures::september(11)))
            .await;

        let created = create_until(&scenario, until)
            .create(scenario.staff.id, &scenario.farm)
            .await
            .unwrap();

        assert!(created.is_none());
        let records = scenario.port.time_records().await;
        let stored = records.iter().find(|r| r.id == day_after.id).unwrap();
        assert_eq!(stored.invoice_line_id, None);
        assert_eq!(scenario.port.invoice_count().await, 0);
    }

    #[tokio::test]
    async fn test_unbillable_record_stays_unlinked() {
        let scenario = ScenarioBuilder::new().build().await;
        let unbillable = scenario
            .record(TestTimeRecordBuilder::new(&scenario.fence).unbillable())
            .await;
        scenario.record(TestTimeRecordBuilder::new(&scenario.gate)).await;

        let invoice = scenario
            .invoice_create()
            .create(scenario.staff.id, &scenario.farm)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(invoice.lines.len(), 1);
        let records = scenario.port.time_records().await;
        let stored = records.iter().find(|r| r.id == unbillable.id).unwrap();
        assert_eq!(stored.invoice_line_id, None);
    }

    #[tokio::test]
    async fn test_twenty_minutes_is_priced_from_the_exact_hours() {
        let scenario = ScenarioBuilder::new().build().await;
        scenario
            .record(TestTimeRecordBuilder::new(&scenario.fence).between((9, 0), (9, 20)))
            .await;

        let invoice = scenario
            .invoice_create()
            .create(scenario.staff.id, &scenario.farm)
            .await
            .unwrap()
            .unwrap();

        let line = &invoice.lines[0];
        assert_eq!(line.price, dec!(20.00));
        assert_eq!(line.quantity, dec!(0.33));
        assert_eq!(line.net, dec!(6.67));
        assert_eq!(line.vat, dec!(1.33));
    }

    #[tokio::test]
    async fn test_second_run_bills_nothing_twice() {
        let scenario = ScenarioBuilder::new().with_standard_week().build().await;
        let create = scenario.invoice_create();

        let first = create.create(scenario.staff.id, &scenario.farm).await.unwrap();
        let second = create.create(scenario.staff.id, &scenario.farm).await.unwrap();

        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(scenario.port.invoices_for(scenario.farm.id).await.len(), 1);
    }
}

mod batch {
    use super::*;
    use std::collections::HashMap;

    use domain_invoice::InvoiceCreateBatch;
    use test_utils::{assert_billed_once, ScenarioBuilder, TemporalFixtures};

    #[tokio::test]
    async fn test_every_billed_record_points_at_exactly_one_line() {
        let scenario = ScenarioBuilder::new().with_standard_week().build().await;

        let outcome = InvoiceCreateBatch::new(scenario.invoice_create())
            .create(scenario.staff.id)
            .await
            .unwrap();

        let records = scenario.port.time_records().await;
        assert_billed_once(&records, &outcome.invoices);

        let mut records_per_line: HashMap<InvoiceLineId, usize> = HashMap::new();
        for line_id in records.iter().filter_map(|r| r.invoice_line_id) {
            *records_per_line.entry(line_id).or_default() += 1;
        }
        let lines: Vec<&InvoiceLine> = outcome.invoices.iter().flat_map(|i| &i.lines).collect();
        assert_eq!(lines.len(), records_per_line.len());
        for line in lines {
            assert_eq!(records_per_line.get(&line.id), Some(&1), "line {}", line.id);
        }
    }

    #[tokio::test]
    async fn test_unrated_contact_fails_without_stopping_the_batch() {
        let scenario = ScenarioBuilder::new().with_standard_week().build().await;

        let outcome = InvoiceCreateBatch::new(scenario.invoice_create())
            .create(scenario.staff.id)
            .await
            .unwrap();

        assert!(!outcome.is_clean());
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].contact_name, scenario.unrated.name);
        let contacts: Vec<ContactId> = outcome.invoices.iter().map(|i| i.contact_id).collect();
        assert!(contacts.contains(&scenario.farm.id));
        assert!(contacts.contains(&scenario.smallholding.id));
    }

    #[tokio::test]
    async fn test_excluded_records_stay_unlinked() {
        let scenario = ScenarioBuilder::new().with_standard_week().build().await;

        InvoiceCreateBatch::new(scenario.invoice_create())
            .create(scenario.staff.id)
            .await
            .unwrap();

        // Unbillable, running, October and unrated time is left alone
        for record in scenario.port.time_records().await {
            let eligible = record.billable
                && !record.is_running()
                && record.date_started() <= TemporalFixtures::month_end()
                && record.ticket_id != scenario.boiler.id;
            assert_eq!(record.invoice_line_id.is_some(), eligible, "record {}", record.id);
        }
    }
}
