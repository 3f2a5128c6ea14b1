//! Invoice PDF rendering
//!
//! [`InvoicePrint`] lays an invoice out on A4 pages: a header with the
//! contact and company details, the line table grouped by ticket with its
//! header row repeated on every page, a totals row and the footer text.
//!
//! ```rust,ignore
//! use invoice_pdf::{render_invoice, InvoicePrint};
//!
//! let print = InvoicePrint::new().with_logo(JpegImage::open("logo.jpg")?);
//! let rendered = render_invoice(&print, port.as_ref(), invoice_id).await?;
//! rendered.save(&output_dir)?;
//! ```

pub mod layout;
pub mod invoice;
pub mod error;

pub use invoice::{render_invoice, InvoicePrint, RenderedInvoice};
pub use error::RenderError;
pub use layout::JpegImage;
