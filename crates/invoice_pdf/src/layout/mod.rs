//! Page layout
//!
//! Just enough of a page layout model for business documents: wrapped
//! paragraphs in two weights, fixed-width tables that split across pages,
//! images and a single-frame page template. Pages are laid out as display
//! lists and written out with `printpdf`.

pub mod canvas;
pub mod document;
pub mod flowable;
pub mod logo;
pub mod metrics;
pub mod paragraph;
pub mod pdf;
pub mod table;

pub use canvas::{Canvas, DrawOp, BLACK, GRAY};
pub use document::{DocTemplate, RenderedDocument};
pub use flowable::{Flowable, ImageBox};
pub use logo::JpegImage;
pub use metrics::Font;
pub use paragraph::{Paragraph, ParagraphStyle, Span};
pub use pdf::{DocumentInfo, PageSize};
pub use table::{Cell, HAlign, StyleCommand, Table, TableStyle, VAlign};
