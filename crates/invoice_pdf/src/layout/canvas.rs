//! Page display lists
//!
//! A [`Canvas`] records what is drawn on one page. Coordinates are PDF user
//! space: points, origin at the bottom left. The PDF writer replays it.

use std::sync::Arc;

use super::logo::JpegImage;
use super::metrics::Font;

/// Gray level of `colors.gray` rules
pub const GRAY: f64 = 0.5;
pub const BLACK: f64 = 0.0;

/// One drawing operation
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// A single line of text with its baseline at `y`
    Text {
        font: Font,
        size: f64,
        x: f64,
        y: f64,
        text: String,
    },
    /// A straight rule
    Line {
        from: (f64, f64),
        to: (f64, f64),
        width: f64,
        gray: f64,
    },
    /// An image scaled to `width` x `height` with its lower left at (x, y)
    Image {
        image: Arc<JpegImage>,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
}

/// Drawing operations for a single page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Canvas {
    ops: Vec<DrawOp>,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&mut self, font: Font, size: f64, x: f64, y: f64, text: &str) {
        if text.is_empty() {
            return;
        }
        self.ops.push(DrawOp::Text {
            font,
            size,
            x,
            y,
            text: text.to_string(),
        });
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, width: f64, gray: f64) {
        self.ops.push(DrawOp::Line {
            from: (x1, y1),
            to: (x2, y2),
            width,
            gray,
        });
    }

    pub fn image(&mut self, image: &Arc<JpegImage>, x: f64, y: f64, width: f64, height: f64) {
        self.ops.push(DrawOp::Image {
            image: Arc::clone(image),
            x,
            y,
            width,
            height,
        });
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Text runs in drawing order
    pub fn texts(&self) -> impl Iterator<Item = &str> + '_ {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    /// True until something is drawn
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_is_skipped() {
        let mut canvas = Canvas::new();
        canvas.text(Font::Regular, 10.0, 72.0, 700.0, "");
        assert!(canvas.is_empty());
    }

    #[test]
    fn test_records_in_order() {
        let mut canvas = Canvas::new();
        canvas.text(Font::Bold, 10.0, 72.0, 700.5, "Totals");
        canvas.line(72.0, 698.0, 300.0, 698.0, 0.25, GRAY);
        canvas.text(Font::Regular, 10.0, 250.0, 700.5, "48.00");

        assert_eq!(canvas.ops().len(), 3);
        assert_eq!(canvas.texts().collect::<Vec<_>>(), vec!["Totals", "48.00"]);
        assert!(matches!(canvas.ops()[1], DrawOp::Line { width, .. } if width == 0.25));
    }
}
