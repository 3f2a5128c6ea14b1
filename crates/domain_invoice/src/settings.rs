//! Invoice settings
//!
//! A single settings record holds the VAT rate applied to new lines and the
//! company details printed on every invoice.

use serde::{Deserialize, Serialize};

use core_kernel::{Currency, VatRate};

use crate::error::InvoiceError;

/// Longest VAT registration number accepted
const MAX_VAT_NUMBER_LEN: usize = 12;

/// Global invoicing and print settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceSettings {
    /// Rate applied to lines created from time records
    pub vat_rate: VatRate,
    pub vat_number: Option<String>,
    /// Company name followed by its address lines
    pub name_and_address: Vec<String>,
    pub phone_number: String,
    /// Text printed below the totals
    pub footer: Vec<String>,
    /// Prefix of generated PDF file names
    pub file_name_prefix: String,
    #[serde(default)]
    pub currency: Currency,
}

impl InvoiceSettings {
    /// Splits stored multi-line text into trimmed, non-empty lines
    pub fn split_lines(text: &str) -> Vec<String> {
        text.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect()
    }

    /// The VAT number, ignoring a blank value
    pub fn vat_number(&self) -> Option<&str> {
        self.vat_number.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }

    /// File name for a rendered invoice, e.g. `invoice-000042.pdf`
    pub fn pdf_file_name(&self, invoice_number: &str) -> String {
        format!("{}-{}.pdf", self.file_name_prefix, invoice_number)
    }

    pub fn validate(&self) -> Result<(), InvoiceError> {
        if self.name_and_address.is_empty() {
            return Err(InvoiceError::Validation("Name and address are required".to_string()));
        }
        if self.phone_number.trim().is_empty() {
            return Err(InvoiceError::Validation("Phone number is required".to_string()));
        }
        if self.file_name_prefix.trim().is_empty() {
            return Err(InvoiceError::Validation("File name prefix is required".to_string()));
        }
        if self.vat_number().is_some_and(|v| v.chars().count() > MAX_VAT_NUMBER_LEN) {
            return Err(InvoiceError::Validation(format!(
                "VAT number cannot be longer than {} characters",
                MAX_VAT_NUMBER_LEN
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn settings() -> InvoiceSettings {
        InvoiceSettings {
            vat_rate: VatRate::new(dec!(0.20)).unwrap(),
            vat_number: Some(" ".to_string()),
            name_and_address: InvoiceSettings::split_lines("Acme Ltd\n\n 1 High Street \nOkehampton"),
            phone_number: "01837 123 456".to_string(),
            footer: vec!["Thank you".to_string()],
            file_name_prefix: "invoice".to_string(),
            currency: Currency::GBP,
        }
    }

    #[test]
    fn test_split_lines_drops_blank_rows() {
        assert_eq!(settings().name_and_address, vec!["Acme Ltd", "1 High Street", "Okehampton"]);
    }

    #[test]
    fn test_blank_vat_number_is_ignored() {
        assert_eq!(settings().vat_number(), None);
    }

    #[test]
    fn test_pdf_file_name() {
        assert_eq!(settings().pdf_file_name("000042"), "invoice-000042.pdf");
    }

    #[test]
    fn test_long_vat_number_is_rejected() {
        let mut s = settings();
        s.vat_number = Some("GB1234567890123".to_string());
        assert!(s.validate().is_err());
    }
}
