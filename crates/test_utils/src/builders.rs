//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible defaults.
//! [`TestTimeRecordBuilder`] describes one record; [`ScenarioBuilder`] seeds a
//! mock port with the fixture contacts, tickets and users plus any records.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, Utc};

use core_kernel::{InvoiceLineId, TimeRecordId, UserId, WorkInterval};
use domain_invoice::ports::mock::{MockInvoicePort, MockMailPort};
use domain_invoice::{
    Contact, InvoiceCreate, InvoicePort, InvoiceSettings, MailPort, Ticket, TimeRecord, User,
};

use crate::fixtures::{EntityFixtures, TemporalFixtures};

/// Builder for a time record
#[derive(Debug, Clone)]
pub struct TestTimeRecordBuilder {
    ticket: Ticket,
    user_id: UserId,
    title: String,
    description: Option<String>,
    date_started: NaiveDate,
    start_time: NaiveTime,
    end_time: Option<NaiveTime>,
    billable: bool,
    invoice_line_id: Option<InvoiceLineId>,
}

impl TestTimeRecordBuilder {
    /// Ninety minutes of billable work on the fixture Monday
    pub fn new(ticket: &Ticket) -> Self {
        Self {
            ticket: ticket.clone(),
            user_id: EntityFixtures::staff().id,
            title: "Work".to_string(),
            description: None,
            date_started: TemporalFixtures::monday(),
            start_time: TemporalFixtures::time(9, 0),
            end_time: Some(TemporalFixtures::time(10, 30)),
            billable: true,
            invoice_line_id: None,
        }
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date_started = date;
        self
    }

    /// Sets start and end as `(hour, minute)` pairs
    pub fn between(mut self, start: (u32, u32), end: (u32, u32)) -> Self {
        self.start_time = TemporalFixtures::time(start.0, start.1);
        self.end_time = Some(TemporalFixtures::time(end.0, end.1));
        self
    }

    /// Work that has not been stopped
    pub fn running(mut self) -> Self {
        self.end_time = None;
        self
    }

    pub fn unbillable(mut self) -> Self {
        self.billable = false;
        self
    }

    pub fn by(mut self, user: &User) -> Self {
        self.user_id = user.id;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks the record as already billed on `line_id`
    pub fn billed_on(mut self, line_id: InvoiceLineId) -> Self {
        self.invoice_line_id = Some(line_id);
        self
    }

    pub fn build(self, id: TimeRecordId) -> TimeRecord {
        TimeRecord {
            id,
            ticket_id: self.ticket.id,
            user_id: self.user_id,
            title: self.title,
            description: self.description,
            interval: WorkInterval {
                date_started: self.date_started,
                start_time: self.start_time,
                end_time: self.end_time,
            },
            billable: self.billable,
            invoice_line_id: self.invoice_line_id,
            created_at: Utc::now(),
        }
    }
}

/// Seeded in-memory ports
pub struct Scenario {
    pub port: MockInvoicePort,
    pub mail: MockMailPort,
    pub farm: Contact,
    pub smallholding: Contact,
    pub unrated: Contact,
    pub staff: User,
    pub quiet_staff: User,
    /// Farm tickets
    pub fence: Ticket,
    pub gate: Ticket,
    /// Smallholding ticket
    pub hedge: Ticket,
    /// Village hall ticket, billed at no rate
    pub boiler: Ticket,
}

impl Scenario {
    pub fn invoice_port(&self) -> Arc<dyn InvoicePort> {
        Arc::new(self.port.clone())
    }

    pub fn mail_port(&self) -> Arc<dyn MailPort> {
        Arc::new(self.mail.clone())
    }

    /// Invoice creation up to the fixture month end at the standard rate
    pub fn invoice_create(&self) -> InvoiceCreate {
        InvoiceCreate::new(
            self.invoice_port(),
            crate::fixtures::MoneyFixtures::standard_vat(),
            TemporalFixtures::month_end(),
        )
    }

    /// Stores a record with an id from the port's sequence
    pub async fn record(&self, builder: TestTimeRecordBuilder) -> TimeRecord {
        let id = TimeRecordId::new(self.port.allocate_id().await);
        let record = builder.build(id);
        self.port.insert_time_record(record.clone()).await;
        record
    }
}

/// Builder for a [`Scenario`]
pub struct ScenarioBuilder {
    settings: Option<InvoiceSettings>,
    standard_week: bool,
}

impl Default for ScenarioBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ScenarioBuilder {
    /// CRM records and settings, no time logged
    pub fn new() -> Self {
        Self {
            settings: Some(EntityFixtures::settings()),
            standard_week: false,
        }
    }

    pub fn without_settings(mut self) -> Self {
        self.settings = None;
        self
    }

    pub fn with_settings(mut self, settings: InvoiceSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Adds the first week of September 2012
    ///
    /// Billable up to the month end: farm 1.50h + 0.75h at 20.00 (net
    /// 45.00) and smallholding 2.00h at 30.00 (net 60.00). Also logged: a
    /// running record, an unbillable one and one in October.
    pub fn with_standard_week(mut self) -> Self {
        self.standard_week = true;
        self
    }

    pub async fn build(self) -> Scenario {
        let farm = EntityFixtures::farm();
        let smallholding = EntityFixtures::smallholding();
        let unrated = EntityFixtures::unrated();
        let scenario = Scenario {
            port: MockInvoicePort::new(),
            mail: MockMailPort::new(),
            fence: EntityFixtures::ticket(10, &farm, "Fence"),
            gate: EntityFixtures::ticket(11, &farm, "Gate"),
            hedge: EntityFixtures::ticket(12, &smallholding, "Hedge"),
            boiler: EntityFixtures::ticket(13, &unrated, "Boiler"),
            farm,
            smallholding,
            unrated,
            staff: EntityFixtures::staff(),
            quiet_staff: EntityFixtures::quiet_staff(),
        };

        let port = &scenario.port;
        for contact in [&scenario.farm, &scenario.smallholding, &scenario.unrated] {
            port.insert_contact(contact.clone()).await;
        }
        for ticket in [&scenario.fence, &scenario.gate, &scenario.hedge, &scenario.boiler] {
            port.insert_ticket(ticket.clone()).await;
        }
        port.insert_user(scenario.staff.clone()).await;
        port.insert_user(scenario.quiet_staff.clone()).await;
        port.set_settings(self.settings).await;

        if self.standard_week {
            let fence = &scenario.fence;
            scenario
                .record(TestTimeRecordBuilder::new(fence).with_description("Mending"))
                .await;
            scenario
                .record(
                    TestTimeRecordBuilder::new(&scenario.gate)
                        .on(TemporalFixtures::september(4))
                        .between((14, 0), (14, 45)),
                )
                .await;
            scenario
                .record(
                    TestTimeRecordBuilder::new(&scenario.hedge)
                        .on(TemporalFixtures::september(5))
                        .between((10, 0), (12, 0)),
                )
                .await;
            scenario
                .record(
                    TestTimeRecordBuilder::new(fence)
                        .on(TemporalFixtures::september(6))
                        .between((8, 0), (9, 0))
                        .unbillable(),
                )
                .await;
            scenario
                .record(
                    TestTimeRecordBuilder::new(fence)
                        .on(TemporalFixtures::september(7))
                        .running(),
                )
                .await;
            scenario
                .record(
                    TestTimeRecordBuilder::new(fence)
                        .on(NaiveDate::from_ymd_opt(2012, 10, 2).unwrap()),
                )
                .await;
        }

        scenario
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_time_record_builder_defaults() {
        let ticket = EntityFixtures::ticket(10, &EntityFixtures::farm(), "Fence");
        let record = TestTimeRecordBuilder::new(&ticket).build(TimeRecordId::new(5));

        assert_eq!(record.ticket_id, ticket.id);
        assert!(record.billable);
        assert!(!record.is_billed());
        assert_eq!(record.invoice_quantity().unwrap(), dec!(1.50));
    }

    #[test]
    fn test_running_record_has_no_end() {
        let ticket = EntityFixtures::ticket(10, &EntityFixtures::farm(), "Fence");
        let record = TestTimeRecordBuilder::new(&ticket).running().build(TimeRecordId::new(5));
        assert!(record.is_running());
    }

    #[tokio::test]
    async fn test_standard_week_seeds_records() {
        let scenario = ScenarioBuilder::new().with_standard_week().build().await;
        let records = scenario.port.time_records().await;

        assert_eq!(records.len(), 6);
        let invoiceable = records
            .iter()
            .filter(|r| r.is_invoiceable(TemporalFixtures::month_end()))
            .count();
        assert_eq!(invoiceable, 3);
    }

    #[tokio::test]
    async fn test_scenario_without_settings() {
        let scenario = ScenarioBuilder::new().without_settings().build().await;
        assert!(scenario.port.get_settings().await.unwrap().is_none());
    }
}
