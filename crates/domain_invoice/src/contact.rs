//! Contacts, tickets and users
//!
//! These records belong to the CRM and are only read here. The hourly rate
//! on a contact is what its time is billed at.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{ContactId, TicketId, UserId};

/// A customer that time is billed to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    /// Postal address, one line per row
    pub address: String,
    /// Rate per hour, None when the contact is not set up for invoicing
    pub hourly_rate: Option<Decimal>,
}

impl Contact {
    /// Address lines with blank rows removed
    pub fn address_lines(&self) -> Vec<&str> {
        self.address
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect()
    }
}

/// A unit of work for a contact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: TicketId,
    pub contact_id: ContactId,
    pub name: String,
    pub description: Option<String>,
}

impl Ticket {
    /// Description for reports, falling back to the ticket name
    pub fn summary(&self) -> &str {
        self.description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(&self.name)
    }
}

/// A member of staff who logs time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: Option<String>,
    /// Opted in to the daily time summary mail
    pub mail_time_summary: bool,
}

impl User {
    /// True when the user opted in and has somewhere to send the mail
    pub fn wants_time_summary(&self) -> bool {
        self.mail_time_summary && self.email.as_deref().is_some_and(|e| !e.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_summary_falls_back_to_name() {
        let mut ticket = Ticket {
            id: TicketId::new(1),
            contact_id: ContactId::new(1),
            name: "Fence".to_string(),
            description: None,
        };
        assert_eq!(ticket.summary(), "Fence");

        ticket.description = Some("Repair the north fence".to_string());
        assert_eq!(ticket.summary(), "Repair the north fence");
    }

    #[test]
    fn test_wants_time_summary_needs_email() {
        let user = User {
            id: UserId::new(1),
            username: "staff".to_string(),
            email: None,
            mail_time_summary: true,
        };
        assert!(!user.wants_time_summary());
    }
}
