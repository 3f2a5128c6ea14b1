//! PostgreSQL adapter tests
//!
//! Each test starts its own container, so they are ignored by default:
//! `cargo test -p infra_db -- --ignored`

use std::sync::Arc;

use rust_decimal_macros::dec;
use sqlx::PgPool;

use core_kernel::{ContactId, Currency, TicketId, UserId};
use domain_invoice::{
    InvoiceCreate, InvoicePort, InvoicePortExt, MailPort, NewInvoice, NewInvoiceLine,
    NewMailMessage, NewTimeRecord, TimeRecordQuery,
};
use infra_db::{PostgresInvoiceAdapter, PostgresMailAdapter};
use test_utils::{db_test, EntityFixtures, MoneyFixtures, TemporalFixtures};

struct Seeded {
    adapter: PostgresInvoiceAdapter,
    contact_id: ContactId,
    ticket_id: TicketId,
    user_id: UserId,
}

async fn seed(pool: PgPool) -> Seeded {
    let adapter = PostgresInvoiceAdapter::new(pool);
    let farm = EntityFixtures::farm();
    let contact = adapter
        .crm()
        .insert_contact(&farm.name, &farm.address, farm.hourly_rate)
        .await
        .unwrap();
    let ticket = adapter.crm().insert_ticket(contact.id, "Fence", None).await.unwrap();
    let staff = EntityFixtures::staff();
    let user = adapter
        .crm()
        .insert_user(&staff.username, staff.email.as_deref(), true)
        .await
        .unwrap();
    adapter.save_settings(&EntityFixtures::settings()).await.unwrap();

    Seeded {
        adapter,
        contact_id: ContactId::new(contact.id),
        ticket_id: TicketId::new(ticket.id),
        user_id: UserId::new(user.id),
    }
}

fn work(seeded: &Seeded, day: u32, start: u32, end: u32) -> NewTimeRecord {
    NewTimeRecord {
        ticket_id: seeded.ticket_id,
        user_id: seeded.user_id,
        title: "Fencing".to_string(),
        description: None,
        date_started: TemporalFixtures::september(day),
        start_time: TemporalFixtures::time(start, 0),
        end_time: Some(TemporalFixtures::time(end, 0)),
        billable: true,
    }
}

async fn empty_invoice(seeded: &Seeded) -> domain_invoice::Invoice {
    seeded
        .adapter
        .create_invoice(
            NewInvoice {
                contact_id: seeded.contact_id,
                user_id: seeded.user_id,
                invoice_date: TemporalFixtures::month_end(),
                currency: Currency::GBP,
            },
            None,
        )
        .await
        .unwrap()
}

db_test!(test_settings_round_trip, |pool| {
    let seeded = seed(pool).await;
    let settings = seeded.adapter.get_settings().await.unwrap().unwrap();
    assert_eq!(settings, EntityFixtures::settings());
});

db_test!(test_blank_vat_number_reads_back_as_none, |pool| {
    let adapter = PostgresInvoiceAdapter::new(pool);
    let mut settings = EntityFixtures::settings();
    settings.vat_number = None;
    adapter.save_settings(&settings).await.unwrap();
    assert_eq!(adapter.get_settings().await.unwrap().unwrap().vat_number, None);
});

db_test!(test_unbilled_records_in_ticket_and_date_order, |pool| {
    let seeded = seed(pool).await;
    let late = seeded.adapter.create_time_record(work(&seeded, 5, 9, 10), None).await.unwrap();
    let early = seeded.adapter.create_time_record(work(&seeded, 3, 9, 10), None).await.unwrap();
    seeded.adapter.create_time_record(work(&seeded, 12, 9, 10), None).await.unwrap();

    let records = seeded
        .adapter
        .find_unbilled_time_records(seeded.contact_id, TemporalFixtures::september(10))
        .await
        .unwrap();

    let ids: Vec<_> = records.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![early.id, late.id]);
});

db_test!(test_end_before_start_is_rejected, |pool| {
    let seeded = seed(pool).await;
    let result = seeded.adapter.create_time_record(work(&seeded, 3, 10, 9), None).await;
    assert!(result.is_err());
});

db_test!(test_record_cannot_be_billed_twice, |pool| {
    let seeded = seed(pool).await;
    let record = seeded.adapter.create_time_record(work(&seeded, 3, 9, 11), None).await.unwrap();
    let invoice = empty_invoice(&seeded).await;
    let line = |n| NewInvoiceLine::hours(n, dec!(2), dec!(20), MoneyFixtures::standard_vat());

    seeded.adapter.add_line(invoice.id, line(1), Some(record.id), None).await.unwrap();
    let second = seeded.adapter.add_line(invoice.id, line(2), Some(record.id), None).await;

    assert!(second.unwrap_err().is_conflict());
    // The failed line was rolled back with the link
    let stored = seeded.adapter.get_invoice(invoice.id).await.unwrap();
    assert_eq!(stored.lines.len(), 1);
});

db_test!(test_duplicate_line_number_is_conflict, |pool| {
    let seeded = seed(pool).await;
    let invoice = empty_invoice(&seeded).await;
    let line = NewInvoiceLine::new(1, dec!(1), "each", dec!(5), MoneyFixtures::standard_vat());

    seeded.adapter.add_line(invoice.id, line.clone(), None, None).await.unwrap();
    let result = seeded.adapter.add_line(invoice.id, line, None, None).await;
    assert!(result.unwrap_err().is_conflict());
});

db_test!(test_create_invoice_end_to_end, |pool| {
    let seeded = seed(pool).await;
    seeded.adapter.create_time_record(work(&seeded, 3, 9, 11), None).await.unwrap();
    seeded.adapter.create_time_record(work(&seeded, 4, 14, 15), None).await.unwrap();
    let contact = seeded.adapter.get_contact(seeded.contact_id).await.unwrap();

    let port: Arc<dyn InvoicePort> = Arc::new(seeded.adapter.clone());
    let create = InvoiceCreate::new(port, MoneyFixtures::standard_vat(), TemporalFixtures::month_end());
    let invoice = create.create(seeded.user_id, &contact).await.unwrap().unwrap();

    let detail = seeded.adapter.get_invoice_detail(invoice.id).await.unwrap();
    assert_eq!(detail.lines.len(), 2);
    assert!(detail.lines.iter().all(|l| l.time_record.is_some()));
    test_utils::assert_invoice_totals(&detail.invoice, dec!(60.00), dec!(12.00), dec!(72.00));

    // Nothing left to bill
    let again = create.create(seeded.user_id, &contact).await.unwrap();
    assert!(again.is_none());
    let billed = seeded
        .adapter
        .find_billable_time_records(TimeRecordQuery::all())
        .await
        .unwrap();
    test_utils::assert_billed_once(&billed, &[detail.invoice]);
});

db_test!(test_mail_is_queued, |pool| {
    let seeded = seed(pool.clone()).await;
    let mail = PostgresMailAdapter::new(pool);
    mail.queue_mail_message(
        NewMailMessage {
            user_id: seeded.user_id,
            recipients: vec!["patrick@example.com".to_string()],
            subject: "Time summary".to_string(),
            body: "Mon 03/09/2012".to_string(),
        },
        None,
    )
    .await
    .unwrap();

    assert_eq!(mail.repository().count_unsent().await.unwrap(), 1);
});

db_test!(test_health_check_against_live_database, |pool| {
    use core_kernel::HealthCheckable;
    let adapter = PostgresInvoiceAdapter::new(pool);
    assert!(adapter.health_check().await.is_healthy());
});
