//! PDF output
//!
//! Replays page display lists into a `printpdf` document with both DejaVu
//! weights embedded.

use printpdf::{
    Color, Greyscale, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfLayerReference, Point,
};
use tracing::debug;

use super::canvas::{Canvas, DrawOp};
use super::metrics::Font;
use crate::error::RenderError;

const LAYER_NAME: &str = "Content";

/// Images are placed at one pixel per point before scaling
const IMAGE_DPI: f32 = 72.0;

/// Page dimensions in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub const A4: PageSize = PageSize {
        width: 595.2756,
        height: 841.8898,
    };
}

/// Document properties
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInfo {
    pub title: String,
}

impl DocumentInfo {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into() }
    }
}

fn mm(points: f64) -> Mm {
    Mm((points * 25.4 / 72.0) as f32)
}

fn pdf_error(err: impl std::fmt::Display) -> RenderError {
    RenderError::Pdf(err.to_string())
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Fonts {
    fn get(&self, font: Font) -> &IndirectFontRef {
        match font {
            Font::Regular => &self.regular,
            Font::Bold => &self.bold,
        }
    }
}

/// Writes one PDF page per canvas
pub fn write_pdf(
    page_size: PageSize,
    pages: &[Canvas],
    info: &DocumentInfo,
) -> Result<Vec<u8>, RenderError> {
    let (width, height) = (mm(page_size.width), mm(page_size.height));
    let (doc, first_page, first_layer) =
        PdfDocument::new(info.title.as_str(), width, height, LAYER_NAME);
    let fonts = Fonts {
        regular: doc.add_external_font(Font::Regular.data()).map_err(pdf_error)?,
        bold: doc.add_external_font(Font::Bold.data()).map_err(pdf_error)?,
    };

    let mut layers = vec![doc.get_page(first_page).get_layer(first_layer)];
    for _ in 1..pages.len() {
        let (page, layer) = doc.add_page(width, height, LAYER_NAME);
        layers.push(doc.get_page(page).get_layer(layer));
    }
    for (canvas, layer) in pages.iter().zip(&layers) {
        paint(canvas, layer, &fonts);
    }

    let bytes = doc.save_to_bytes().map_err(pdf_error)?;
    debug!(pages = layers.len(), bytes = bytes.len(), title = %info.title, "PDF written");
    Ok(bytes)
}

fn paint(canvas: &Canvas, layer: &PdfLayerReference, fonts: &Fonts) {
    for op in canvas.ops() {
        match op {
            DrawOp::Text { font, size, x, y, text } => {
                layer.use_text(text.as_str(), *size as f32, mm(*x), mm(*y), fonts.get(*font));
            }
            DrawOp::Line { from, to, width, gray } => {
                layer.set_outline_color(Color::Greyscale(Greyscale::new(*gray as f32, None)));
                layer.set_outline_thickness(*width as f32);
                layer.add_line(Line {
                    points: vec![
                        (Point::new(mm(from.0), mm(from.1)), false),
                        (Point::new(mm(to.0), mm(to.1)), false),
                    ],
                    is_closed: false,
                });
            }
            DrawOp::Image { image, x, y, width, height } => {
                let pixels_wide = f64::from(image.width().max(1));
                let pixels_high = f64::from(image.height().max(1));
                Image::from_dynamic_image(image.decoded()).add_to_layer(
                    layer.clone(),
                    ImageTransform {
                        translate_x: Some(mm(*x)),
                        translate_y: Some(mm(*y)),
                        scale_x: Some((*width / pixels_wide) as f32),
                        scale_y: Some((*height / pixels_high) as f32),
                        dpi: Some(IMAGE_DPI),
                        ..Default::default()
                    },
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_to_millimetres() {
        assert!((mm(72.0).0 - 25.4).abs() < 1e-4);
        assert!((mm(PageSize::A4.width).0 - 210.0).abs() < 1e-3);
    }

    #[test]
    fn test_writes_one_page_per_canvas() {
        let mut first = Canvas::new();
        first.text(Font::Bold, 18.0, 78.0, 750.0, "Invoice");
        first.line(78.0, 740.0, 500.0, 740.0, 0.25, 0.5);
        let mut second = Canvas::new();
        second.text(Font::Regular, 10.0, 78.0, 750.0, "£12.00");

        let bytes = write_pdf(PageSize::A4, &[first, second], &DocumentInfo::new("Invoice 000001")).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        let tail = &bytes[bytes.len().saturating_sub(16)..];
        assert!(tail.windows(5).any(|w| w == b"%%EOF"));
    }
}
