//! Rendering errors

use thiserror::Error;

use core_kernel::PortError;

/// Errors that can occur while producing an invoice PDF
#[derive(Debug, Error)]
pub enum RenderError {
    /// Company details for the header and footer are missing
    #[error("Invoice print settings have not been set up")]
    MissingPrintSettings,

    /// The logo could not be read as a JPEG
    #[error("Invalid image: {0}")]
    Image(String),

    /// The PDF writer rejected the document
    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Loading the invoice failed
    #[error(transparent)]
    Port(#[from] PortError),
}

impl RenderError {
    /// Returns true when the invoice or its contact does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, RenderError::Port(e) if e.is_not_found())
    }
}
