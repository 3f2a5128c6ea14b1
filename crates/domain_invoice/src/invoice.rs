//! Invoices and invoice lines
//!
//! An invoice owns numbered lines. Each line derives its net and VAT amounts
//! from quantity, price and rate when it is built, and the invoice totals are
//! always summed from the lines.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::money::{round_stored, AMOUNT_DECIMAL_PLACES};
use core_kernel::{ContactId, Currency, InvoiceId, InvoiceLineId, Money, UserId, VatRate};

use crate::error::InvoiceError;

/// Units used for lines billed from time records
pub const DEFAULT_UNITS: &str = "hours";

/// Longest units label that fits the stored column
pub const MAX_UNITS_LEN: usize = 5;

/// Quantities must stay below this magnitude (four integer digits)
pub const QUANTITY_LIMIT: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// Prices must stay below this (six integer digits)
pub const PRICE_LIMIT: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// A billing document for one contact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub contact_id: ContactId,
    /// Member of staff who created the invoice
    pub user_id: UserId,
    pub invoice_date: NaiveDate,
    pub currency: Currency,
    /// Lines in line number order
    pub lines: Vec<InvoiceLine>,
    pub created_at: DateTime<Utc>,
}

impl Invoice {
    /// Sequential number printed on the document, e.g. `000042`
    pub fn invoice_number(&self) -> String {
        self.id.invoice_number()
    }

    /// Sum of the line net amounts
    pub fn net(&self) -> Money {
        Money::new(self.lines.iter().map(|l| l.net).sum(), self.currency)
    }

    /// Sum of the line VAT amounts
    pub fn vat(&self) -> Money {
        Money::new(self.lines.iter().map(|l| l.vat).sum(), self.currency)
    }

    /// Net plus VAT
    pub fn gross(&self) -> Money {
        self.net() + self.vat()
    }

    /// True when the net total is below zero
    pub fn is_credit_note(&self) -> bool {
        self.net().is_negative()
    }

    /// Document heading: "Credit note" or "Invoice"
    pub fn description(&self) -> &'static str {
        if self.is_credit_note() {
            "Credit note"
        } else {
            "Invoice"
        }
    }

    pub fn has_lines(&self) -> bool {
        !self.lines.is_empty()
    }

    /// One more than the highest line number, or 1 for an empty invoice
    pub fn next_line_number(&self) -> i32 {
        self.lines
            .iter()
            .map(|l| l.line_number)
            .max()
            .map_or(1, |n| n + 1)
    }

    /// Checks a new line can be added
    pub fn check_new_line(&self, line: &NewInvoiceLine) -> Result<(), InvoiceError> {
        line.validate()?;
        if self.lines.iter().any(|l| l.line_number == line.line_number) {
            return Err(InvoiceError::DuplicateLineNumber {
                invoice_id: self.id,
                line_number: line.line_number,
            });
        }
        Ok(())
    }

    /// Appends a stored line, keeping line number order
    pub fn push_line(&mut self, line: InvoiceLine) {
        self.lines.push(line);
        self.lines.sort_by_key(|l| l.line_number);
    }
}

/// Request to create an empty invoice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInvoice {
    pub contact_id: ContactId,
    pub user_id: UserId,
    pub invoice_date: NaiveDate,
    pub currency: Currency,
}

/// One billable item on an invoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub id: InvoiceLineId,
    pub invoice_id: InvoiceId,
    pub line_number: i32,
    pub description: Option<String>,
    pub quantity: Decimal,
    pub units: String,
    pub price: Decimal,
    pub vat_rate: VatRate,
    /// `price × quantity`
    pub net: Decimal,
    /// `price × quantity × vat_rate`
    pub vat: Decimal,
}

impl InvoiceLine {
    /// Builds a stored line, deriving the amounts
    pub fn new(
        id: InvoiceLineId,
        invoice_id: InvoiceId,
        line: NewInvoiceLine,
    ) -> Result<Self, InvoiceError> {
        let (net, vat) = line.amounts()?;
        Ok(Self {
            id,
            invoice_id,
            line_number: line.line_number,
            quantity: line.stored_quantity(),
            description: line.description,
            units: line.units,
            price: line.price,
            vat_rate: line.vat_rate,
            net,
            vat,
        })
    }

    pub fn gross(&self) -> Decimal {
        self.net + self.vat
    }
}

/// A line waiting to be stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInvoiceLine {
    pub line_number: i32,
    pub description: Option<String>,
    pub quantity: Decimal,
    pub units: String,
    pub price: Decimal,
    pub vat_rate: VatRate,
}

impl NewInvoiceLine {
    /// Creates a line with the price at stored precision
    ///
    /// The quantity is kept exact so a third of an hour is priced as a
    /// third; [`stored_quantity`](Self::stored_quantity) is what is saved.
    pub fn new(
        line_number: i32,
        quantity: Decimal,
        units: impl Into<String>,
        price: Decimal,
        vat_rate: VatRate,
    ) -> Self {
        Self {
            line_number,
            description: None,
            quantity,
            units: units.into(),
            price: round_stored(price, AMOUNT_DECIMAL_PLACES),
            vat_rate,
        }
    }

    /// A line for hours worked at the contact's rate
    pub fn hours(line_number: i32, quantity: Decimal, hourly_rate: Decimal, vat_rate: VatRate) -> Self {
        Self::new(line_number, quantity, DEFAULT_UNITS, hourly_rate, vat_rate)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Quantity at the two places it is stored with
    pub fn stored_quantity(&self) -> Decimal {
        round_stored(self.quantity, AMOUNT_DECIMAL_PLACES)
    }

    /// Rejects a negative price, bad line number, out of range figures or
    /// over-long units
    ///
    /// A negative quantity is allowed: it turns the line into a credit.
    pub fn validate(&self) -> Result<(), InvoiceError> {
        if self.line_number < 1 {
            return Err(InvoiceError::InvalidLineNumber(self.line_number));
        }
        if self.price.is_sign_negative() && !self.price.is_zero() {
            return Err(InvoiceError::NegativePrice(self.price));
        }
        if self.stored_quantity().abs() >= QUANTITY_LIMIT {
            return Err(InvoiceError::Validation(format!(
                "Quantity {} is out of range",
                self.quantity
            )));
        }
        if self.price >= PRICE_LIMIT {
            return Err(InvoiceError::Validation(format!("Price {} is out of range", self.price)));
        }
        if self.units.chars().count() > MAX_UNITS_LEN {
            return Err(InvoiceError::UnitsTooLong(self.units.clone()));
        }
        Ok(())
    }

    /// Net and VAT at stored precision, priced from the exact quantity
    pub fn amounts(&self) -> Result<(Decimal, Decimal), InvoiceError> {
        let overflow = || {
            InvoiceError::Validation(format!(
                "Line amount overflows: {} x {}",
                self.quantity, self.price
            ))
        };
        let extended = self.price.checked_mul(self.quantity).ok_or_else(overflow)?;
        let vat = extended
            .checked_mul(self.vat_rate.as_decimal())
            .ok_or_else(overflow)?;
        Ok((
            round_stored(extended, AMOUNT_DECIMAL_PLACES),
            round_stored(vat, AMOUNT_DECIMAL_PLACES),
        ))
    }
}
