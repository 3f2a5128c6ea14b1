//! Invoice DTOs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use core_kernel::{ContactId, InvoiceId, InvoiceLineId, TicketId, TimeRecordId, UserId};
use domain_invoice::{
    BatchOutcome, Invoice, InvoiceDetail, InvoiceLine, DEFAULT_UNITS, PRICE_LIMIT, QUANTITY_LIMIT,
};

fn price_in_range(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new("negative"));
    }
    if *value >= PRICE_LIMIT {
        return Err(ValidationError::new("too_large"));
    }
    Ok(())
}

fn quantity_in_range(value: &Decimal) -> Result<(), ValidationError> {
    if value.abs() >= QUANTITY_LIMIT {
        return Err(ValidationError::new("too_large"));
    }
    Ok(())
}

fn default_units() -> String {
    DEFAULT_UNITS.to_string()
}

/// Body of the create-from-time requests, single contact and batch
#[derive(Debug, Deserialize, Validate)]
pub struct CreateInvoicesRequest {
    /// Staff member creating the invoices
    #[validate(range(min = 1))]
    pub user_id: i64,
    /// Last day whose time is billed
    pub until: NaiveDate,
    /// Defaults to today
    pub invoice_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateDraftRequest {
    #[validate(range(min = 1))]
    pub user_id: i64,
    pub invoice_date: Option<NaiveDate>,
}

/// A line entered by hand
#[derive(Debug, Deserialize, Validate)]
pub struct AddLineRequest {
    /// Defaults to the next free number
    #[validate(range(min = 1))]
    pub line_number: Option<i32>,
    #[validate(length(max = 200))]
    pub description: Option<String>,
    /// Negative for a credit
    #[validate(custom(function = "quantity_in_range"))]
    pub quantity: Decimal,
    #[serde(default = "default_units")]
    #[validate(length(min = 1, max = 5))]
    pub units: String,
    #[validate(custom(function = "price_in_range"))]
    pub price: Decimal,
    /// VAT percentage, e.g. `20`; defaults to the configured rate
    pub vat_percentage: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct InvoiceLineResponse {
    pub id: InvoiceLineId,
    pub line_number: i32,
    pub description: Option<String>,
    pub quantity: Decimal,
    pub units: String,
    pub price: Decimal,
    /// Percentage label, e.g. `"17.5"`
    pub vat_rate: String,
    pub net: Decimal,
    pub vat: Decimal,
    pub gross: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_record_id: Option<TimeRecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<TicketId>,
}

impl From<&InvoiceLine> for InvoiceLineResponse {
    fn from(line: &InvoiceLine) -> Self {
        Self {
            id: line.id,
            line_number: line.line_number,
            description: line.description.clone(),
            quantity: line.quantity,
            units: line.units.clone(),
            price: line.price,
            vat_rate: line.vat_rate.percentage_label(),
            net: line.net,
            vat: line.vat,
            gross: line.gross(),
            time_record_id: None,
            ticket_id: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    pub id: InvoiceId,
    pub invoice_number: String,
    /// "Invoice" or "Credit note"
    pub description: String,
    pub contact_id: ContactId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    pub user_id: UserId,
    pub invoice_date: NaiveDate,
    pub currency: String,
    pub net: Decimal,
    pub vat: Decimal,
    pub gross: Decimal,
    pub lines: Vec<InvoiceLineResponse>,
}

impl From<&Invoice> for InvoiceResponse {
    fn from(invoice: &Invoice) -> Self {
        Self {
            id: invoice.id,
            invoice_number: invoice.invoice_number(),
            description: invoice.description().to_string(),
            contact_id: invoice.contact_id,
            contact_name: None,
            user_id: invoice.user_id,
            invoice_date: invoice.invoice_date,
            currency: invoice.currency.code().to_string(),
            net: invoice.net().amount(),
            vat: invoice.vat().amount(),
            gross: invoice.gross().amount(),
            lines: invoice.lines.iter().map(InvoiceLineResponse::from).collect(),
        }
    }
}

impl From<&InvoiceDetail> for InvoiceResponse {
    fn from(detail: &InvoiceDetail) -> Self {
        let mut response = InvoiceResponse::from(&detail.invoice);
        response.contact_name = Some(detail.contact.name.clone());
        response.lines = detail
            .lines
            .iter()
            .map(|l| InvoiceLineResponse {
                time_record_id: l.time_record.as_ref().map(|r| r.id),
                ticket_id: l.ticket.as_ref().map(|t| t.id),
                ..InvoiceLineResponse::from(&l.line)
            })
            .collect();
        response
    }
}

#[derive(Debug, Serialize)]
pub struct BatchFailureResponse {
    pub contact_id: ContactId,
    pub contact_name: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub invoices: Vec<InvoiceResponse>,
    pub failures: Vec<BatchFailureResponse>,
}

impl From<&BatchOutcome> for BatchResponse {
    fn from(outcome: &BatchOutcome) -> Self {
        Self {
            invoices: outcome.invoices.iter().map(InvoiceResponse::from).collect(),
            failures: outcome
                .failures
                .iter()
                .map(|f| BatchFailureResponse {
                    contact_id: f.contact_id,
                    contact_name: f.contact_name.clone(),
                    error: f.error.to_string(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line_request(json: &str) -> AddLineRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_units_default_to_hours() {
        let request = line_request(r#"{"quantity": "1.5", "price": "20"}"#);
        assert_eq!(request.units, "hours");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_negative_price_is_invalid() {
        let request = line_request(r#"{"quantity": "1", "price": "-5"}"#);
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_negative_quantity_is_valid() {
        let request = line_request(r#"{"quantity": "-2", "price": "5"}"#);
        assert!(request.validate().is_ok());
        assert_eq!(request.quantity, dec!(-2));
    }

    #[test]
    fn test_out_of_range_figures_are_invalid() {
        let huge = r#"{"quantity": "100000000000000000000", "price": "100000000000000000000"}"#;
        assert!(line_request(huge).validate().is_err());
        assert!(line_request(r#"{"quantity": "-10000", "price": "5"}"#).validate().is_err());
        assert!(line_request(r#"{"quantity": "1", "price": "1000000"}"#).validate().is_err());
        assert!(line_request(r#"{"quantity": "9999.99", "price": "999999.99"}"#).validate().is_ok());
    }

    #[test]
    fn test_long_units_are_invalid() {
        let request = line_request(r#"{"quantity": "1", "price": "5", "units": "fortnights"}"#);
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_line_number_zero_is_invalid() {
        let request = line_request(r#"{"quantity": "1", "price": "5", "line_number": 0}"#);
        assert!(request.validate().is_err());
    }
}
