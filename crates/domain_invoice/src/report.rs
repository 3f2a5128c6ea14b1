//! Time reports
//!
//! Two reports are built from billable time:
//!
//! - the daily time summary mailed to staff who opt in, grouped by day and
//!   then by ticket
//! - chargeable minutes per user per week, written as tab-separated text

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::{self, Write};
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, instrument};

use core_kernel::temporal::{format_minutes, week_commencing};
use core_kernel::{OperationMetadata, TicketId, UserId};

use crate::contact::{Contact, Ticket, User};
use crate::error::InvoiceError;
use crate::ports::{InvoicePort, MailPort, NewMailMessage, TimeRecordQuery};
use crate::time_record::TimeRecord;

/// Time one user spent on one ticket during a day
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketTime {
    pub ticket_id: TicketId,
    pub contact: String,
    pub description: String,
    pub minutes: i64,
}

/// One day of a user's time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub total_minutes: i64,
    /// Tickets in id order
    pub tickets: Vec<TicketTime>,
}

/// Billable time per day for a user over the `days` days ending `today`
///
/// Running records have no duration yet and are left out.
#[instrument(skip(port))]
pub async fn time_summary(
    port: &dyn InvoicePort,
    user_id: UserId,
    today: NaiveDate,
    days: u32,
) -> Result<BTreeMap<NaiveDate, DaySummary>, InvoiceError> {
    let from = today - Duration::days(i64::from(days.max(1)) - 1);
    let records = port
        .find_billable_time_records(TimeRecordQuery::for_user(user_id, from, today))
        .await?;

    let mut tickets: HashMap<TicketId, Ticket> = HashMap::new();
    let mut contacts: HashMap<core_kernel::ContactId, Contact> = HashMap::new();
    for record in &records {
        if !tickets.contains_key(&record.ticket_id) {
            let ticket = port.get_ticket(record.ticket_id).await?;
            if !contacts.contains_key(&ticket.contact_id) {
                let contact = port.get_contact(ticket.contact_id).await?;
                contacts.insert(contact.id, contact);
            }
            tickets.insert(ticket.id, ticket);
        }
    }

    Ok(summarise(&records, &tickets, &contacts))
}

fn summarise(
    records: &[TimeRecord],
    tickets: &HashMap<TicketId, Ticket>,
    contacts: &HashMap<core_kernel::ContactId, Contact>,
) -> BTreeMap<NaiveDate, DaySummary> {
    let mut minutes: BTreeMap<NaiveDate, BTreeMap<TicketId, i64>> = BTreeMap::new();
    for record in records {
        let Ok(worked) = record.minutes() else {
            continue;
        };
        *minutes
            .entry(record.date_started())
            .or_default()
            .entry(record.ticket_id)
            .or_default() += worked;
    }

    minutes
        .into_iter()
        .map(|(date, by_ticket)| {
            let tickets: Vec<TicketTime> = by_ticket
                .into_iter()
                .map(|(ticket_id, minutes)| {
                    let ticket = tickets.get(&ticket_id);
                    TicketTime {
                        ticket_id,
                        contact: ticket
                            .and_then(|t| contacts.get(&t.contact_id))
                            .map(|c| c.name.clone())
                            .unwrap_or_default(),
                        description: ticket.map(|t| t.summary().to_string()).unwrap_or_default(),
                        minutes,
                    }
                })
                .collect();
            let summary = DaySummary {
                date,
                total_minutes: tickets.iter().map(|t| t.minutes).sum(),
                tickets,
            };
            (date, summary)
        })
        .collect()
}

/// Plain text body of the time summary mail
pub fn time_summary_message(summary: &BTreeMap<NaiveDate, DaySummary>) -> String {
    let mut message = String::new();
    for (date, day) in summary {
        message.push_str(&format!(
            "\n\n{}, total time {}",
            date.format("%d/%m/%Y %A"),
            format_minutes(day.total_minutes),
        ));
        for ticket in &day.tickets {
            message.push_str(&format!(
                "\n{}: {}, {} ({})",
                ticket.ticket_id.value(),
                ticket.contact,
                ticket.description,
                format_minutes(ticket.minutes),
            ));
        }
    }
    message
}

/// Queues the daily time summary for each user who asked for it
pub struct TimeSummaryMailer {
    port: Arc<dyn InvoicePort>,
    mail: Arc<dyn MailPort>,
    days: u32,
}

impl TimeSummaryMailer {
    pub fn new(port: Arc<dyn InvoicePort>, mail: Arc<dyn MailPort>) -> Self {
        Self { port, mail, days: 1 }
    }

    /// Number of days covered, ending today
    pub fn with_days(mut self, days: u32) -> Self {
        self.days = days;
        self
    }

    /// Builds and queues one message per opted-in user
    ///
    /// # Returns
    ///
    /// The users that were mailed
    #[instrument(skip(self), fields(days = self.days))]
    pub async fn run(&self, now: DateTime<Utc>) -> Result<Vec<User>, InvoiceError> {
        let users: Vec<User> = self
            .port
            .list_users()
            .await?
            .into_iter()
            .filter(User::wants_time_summary)
            .collect();

        let today = now.date_naive();
        for user in &users {
            info!(username = %user.username, "mail_time_summary");
            let summary = time_summary(self.port.as_ref(), user.id, today, self.days).await?;
            let message = NewMailMessage {
                user_id: user.id,
                recipients: user.email.iter().cloned().collect(),
                subject: format!("Time Summary for {}", now.format("%d/%m/%Y")),
                body: time_summary_message(&summary),
            };
            self.mail
                .queue_mail_message(
                    message,
                    Some(OperationMetadata::default().initiated_by("mail_time_summary")),
                )
                .await?;
        }
        Ok(users)
    }
}

/// Chargeable minutes per user, per week commencing Monday
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChargeableTimeReport {
    /// Column order
    pub usernames: Vec<String>,
    /// Minutes by Monday, then username
    pub weeks: BTreeMap<NaiveDate, BTreeMap<String, i64>>,
}

impl ChargeableTimeReport {
    /// Loads every billable record and buckets it by week
    #[instrument(skip(port))]
    pub async fn load(port: &dyn InvoicePort) -> Result<Self, InvoiceError> {
        let records = port.find_billable_time_records(TimeRecordQuery::all()).await?;
        let mut users: HashMap<UserId, String> = HashMap::new();
        for record in &records {
            if !users.contains_key(&record.user_id) {
                let user = port.get_user(record.user_id).await?;
                users.insert(user.id, user.username);
            }
        }
        let report = Self::from_records(&records, &users);
        info!(records = records.len(), weeks = report.weeks.len(), "Chargeable time report built");
        Ok(report)
    }

    /// Buckets billable records by the Monday of their week
    pub fn from_records(records: &[TimeRecord], usernames: &HashMap<UserId, String>) -> Self {
        let mut names = BTreeSet::new();
        let mut weeks: BTreeMap<NaiveDate, BTreeMap<String, i64>> = BTreeMap::new();

        for record in records.iter().filter(|r| r.billable) {
            let Ok(minutes) = record.minutes() else {
                continue;
            };
            let name = usernames
                .get(&record.user_id)
                .cloned()
                .unwrap_or_else(|| record.user_id.to_string());
            names.insert(name.clone());
            *weeks
                .entry(week_commencing(record.date_started()))
                .or_default()
                .entry(name)
                .or_default() += minutes;
        }

        Self {
            usernames: names.into_iter().collect(),
            weeks,
        }
    }

    /// `chargeable_time_2012-09-30_17-05-00.csv`
    pub fn file_name(now: DateTime<Utc>) -> String {
        format!("chargeable_time_{}.csv", now.format("%Y-%m-%d_%H-%M-%S"))
    }

    /// Writes the report as tab-separated rows: `Date` then one column per user
    pub fn write_tsv<W: Write>(&self, mut out: W) -> io::Result<()> {
        let mut heading = vec!["Date".to_string()];
        heading.extend(self.usernames.iter().cloned());
        writeln!(out, "{}", heading.join("\t"))?;

        for (monday, minutes) in &self.weeks {
            let mut row = vec![monday.format("%d/%m/%Y").to_string()];
            row.extend(
                self.usernames
                    .iter()
                    .map(|name| minutes.get(name).copied().unwrap_or(0).to_string()),
            );
            writeln!(out, "{}", row.join("\t"))?;
        }
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use core_kernel::{ContactId, TimeRecordId, WorkInterval};

    fn record(id: i64, user: i64, ticket: i64, day: NaiveDate, minutes: u32, billable: bool) -> TimeRecord {
        let start = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        TimeRecord {
            id: TimeRecordId::new(id),
            ticket_id: TicketId::new(ticket),
            user_id: UserId::new(user),
            title: "Work".to_string(),
            description: None,
            interval: WorkInterval {
                date_started: day,
                start_time: start,
                end_time: Some(start + Duration::minutes(i64::from(minutes))),
            },
            billable,
            invoice_line_id: None,
            created_at: Utc::now(),
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2012, 9, d).unwrap()
    }

    #[test]
    fn test_weeks_are_keyed_by_monday() {
        let records = vec![
            record(1, 1, 1, day(24), 30, true),
            record(2, 1, 1, day(30), 15, true),
            record(3, 2, 1, day(26), 60, true),
            record(4, 2, 1, day(26), 60, false),
            record(5, 1, 1, day(3), 10, true),
        ];
        let users = HashMap::from([
            (UserId::new(1), "web".to_string()),
            (UserId::new(2), "staff".to_string()),
        ]);

        let report = ChargeableTimeReport::from_records(&records, &users);
        assert_eq!(report.usernames, vec!["staff", "web"]);
        assert_eq!(report.weeks[&day(24)]["web"], 45);
        assert_eq!(report.weeks[&day(24)]["staff"], 60);
        assert_eq!(report.weeks[&day(3)]["web"], 10);

        let mut out = Vec::new();
        report.write_tsv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "Date\tstaff\tweb\n03/09/2012\t0\t10\n24/09/2012\t60\t45\n"
        );
    }

    #[test]
    fn test_summary_message_format() {
        let records = vec![
            record(1, 1, 7, day(3), 90, true),
            record(2, 1, 7, day(3), 30, true),
            record(3, 1, 8, day(3), 5, true),
        ];
        let tickets = HashMap::from([
            (
                TicketId::new(7),
                Ticket {
                    id: TicketId::new(7),
                    contact_id: ContactId::new(1),
                    name: "Fence".to_string(),
                    description: Some("Mend the fence".to_string()),
                },
            ),
            (
                TicketId::new(8),
                Ticket {
                    id: TicketId::new(8),
                    contact_id: ContactId::new(1),
                    name: "Gate".to_string(),
                    description: None,
                },
            ),
        ]);
        let contacts = HashMap::from([(
            ContactId::new(1),
            Contact {
                id: ContactId::new(1),
                name: "Farm".to_string(),
                address: String::new(),
                hourly_rate: None,
            },
        )]);

        let summary = summarise(&records, &tickets, &contacts);
        assert_eq!(
            time_summary_message(&summary),
            "\n\n03/09/2012 Monday, total time 2 hours, 5 minutes\
             \n7: Farm, Mend the fence (2 hours)\
             \n8: Farm, Gate (5 minutes)"
        );
    }

    #[test]
    fn test_file_name() {
        let now = DateTime::parse_from_rfc3339("2012-09-30T17:05:00Z").unwrap().with_timezone(&Utc);
        assert_eq!(ChargeableTimeReport::file_name(now), "chargeable_time_2012-09-30_17-05-00.csv");
    }
}
