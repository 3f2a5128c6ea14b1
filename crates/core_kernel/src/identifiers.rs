//! Strongly-typed identifiers for domain entities
//!
//! Records are keyed by the sequential integer the store assigns. Newtype
//! wrappers keep an invoice id from being passed where a contact id is
//! expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a persisted primary key
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the underlying key
            pub const fn value(&self) -> i64 {
                self.0
            }

            /// Returns the identifier prefix for display
            pub fn prefix() -> &'static str {
                $prefix
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                // Strip prefix if present
                let raw = s.strip_prefix(concat!($prefix, "-")).unwrap_or(s);
                Ok(Self(raw.parse()?))
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> i64 {
                id.0
            }
        }
    };
}

// CRM identifiers (read-only here)
define_id!(ContactId, "CNT");
define_id!(TicketId, "TKT");
define_id!(UserId, "USR");

// Invoicing identifiers
define_id!(TimeRecordId, "TIME");
define_id!(InvoiceId, "INV");
define_id!(InvoiceLineId, "LINE");
define_id!(MailMessageId, "MAIL");

impl InvoiceId {
    /// The sequential number printed on the invoice, e.g. `000042`
    pub fn invoice_number(&self) -> String {
        format!("{:06}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_id_display() {
        let id = ContactId::new(7);
        assert_eq!(id.to_string(), "CNT-7");
    }

    #[test]
    fn test_id_parsing() {
        let original = TicketId::new(42);
        let parsed: TicketId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);

        let bare: TicketId = "42".parse().unwrap();
        assert_eq!(bare, original);
    }

    #[test]
    fn test_invoice_number_is_zero_padded() {
        assert_eq!(InvoiceId::new(1).invoice_number(), "000001");
        assert_eq!(InvoiceId::new(1234567).invoice_number(), "1234567");
    }
}
