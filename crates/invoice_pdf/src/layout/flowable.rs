//! Flowables
//!
//! Anything that can be placed in a frame: it reports its height for a
//! given width, draws itself from a top edge downwards and, for tables,
//! splits across pages.

use std::sync::Arc;

use super::canvas::Canvas;
use super::logo::JpegImage;
use super::paragraph::Paragraph;
use super::table::Table;

/// An image drawn at a fixed size, scaled down to fit narrower space
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBox {
    pub image: Arc<JpegImage>,
    pub width: f64,
    pub height: f64,
}

impl ImageBox {
    /// One point per pixel, the size a 72 dpi image prints at
    pub fn new(image: Arc<JpegImage>) -> Self {
        let width = f64::from(image.width());
        let height = f64::from(image.height());
        Self { image, width, height }
    }

    fn scaled(&self, avail_width: f64) -> (f64, f64) {
        if self.width <= avail_width || self.width <= 0.0 {
            (self.width, self.height)
        } else {
            (avail_width, self.height * avail_width / self.width)
        }
    }
}

/// A block of content placed in a frame or table cell
#[derive(Debug, Clone, PartialEq)]
pub enum Flowable {
    Paragraph(Paragraph),
    /// Vertical gap in points
    Spacer(f64),
    Table(Table),
    Image(ImageBox),
}

impl Flowable {
    /// Height when laid out in `avail_width`
    pub fn height(&self, avail_width: f64) -> f64 {
        match self {
            Flowable::Paragraph(p) => p.height(avail_width),
            Flowable::Spacer(h) => *h,
            Flowable::Table(t) => t.height(avail_width),
            Flowable::Image(i) => i.scaled(avail_width).1,
        }
    }

    /// Gap wanted above, ignored at the top of a frame or cell
    pub fn space_before(&self) -> f64 {
        match self {
            Flowable::Paragraph(p) => p.style().space_before,
            _ => 0.0,
        }
    }

    /// Gap wanted below
    pub fn space_after(&self) -> f64 {
        match self {
            Flowable::Paragraph(p) => p.style().space_after,
            _ => 0.0,
        }
    }

    /// Draws with the top edge at `top`
    pub fn draw(&self, canvas: &mut Canvas, x: f64, top: f64, avail_width: f64) {
        match self {
            Flowable::Paragraph(p) => p.draw(canvas, x, top, avail_width),
            Flowable::Spacer(_) => {}
            Flowable::Table(t) => t.draw(canvas, x, top, avail_width),
            Flowable::Image(i) => {
                let (width, height) = i.scaled(avail_width);
                let left = x + (avail_width - width).max(0.0) / 2.0;
                canvas.image(&i.image, left, top - height, width, height);
            }
        }
    }

    /// Splits into a part fitting `avail_height` and the remainder
    ///
    /// Only tables split, and only between rows.
    pub fn split(&self, avail_width: f64, avail_height: f64) -> Option<(Flowable, Flowable)> {
        match self {
            Flowable::Table(t) => t
                .split(avail_width, avail_height)
                .map(|(head, tail)| (Flowable::Table(head), Flowable::Table(tail))),
            _ => None,
        }
    }
}

impl From<Paragraph> for Flowable {
    fn from(p: Paragraph) -> Self {
        Flowable::Paragraph(p)
    }
}

impl From<Table> for Flowable {
    fn from(t: Table) -> Self {
        Flowable::Table(t)
    }
}

impl From<ImageBox> for Flowable {
    fn from(i: ImageBox) -> Self {
        Flowable::Image(i)
    }
}

/// Total height of flowables stacked in a cell
pub(crate) fn stack_height(items: &[Flowable], avail_width: f64) -> f64 {
    let mut height = 0.0;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            height += item.space_before();
        }
        height += item.height(avail_width);
        if i + 1 < items.len() {
            height += item.space_after();
        }
    }
    height
}

/// Draws flowables stacked downwards from `top`
pub(crate) fn draw_stack(
    items: &[Flowable],
    canvas: &mut Canvas,
    x: f64,
    top: f64,
    avail_width: f64,
) {
    let mut y = top;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            y -= item.space_before();
        }
        item.draw(canvas, x, y, avail_width);
        y -= item.height(avail_width) + item.space_after();
    }
}
