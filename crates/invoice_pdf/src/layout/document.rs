//! Page templates
//!
//! A [`DocTemplate`] flows content through a single frame per page, splitting
//! tables where they cross the bottom of the frame.

use std::collections::VecDeque;

use tracing::{debug, warn};

use super::canvas::Canvas;
use super::flowable::Flowable;
use super::pdf::{write_pdf, DocumentInfo, PageSize};
use crate::error::RenderError;

/// Content that fits within this much of the frame bottom still fits
const FIT_TOLERANCE: f64 = 1e-6;

/// A finished file and the pages it was written from
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub pages: Vec<Canvas>,
}

impl RenderedDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Page layout: size, margins and the padded frame inside them
#[derive(Debug, Clone)]
pub struct DocTemplate {
    page_size: PageSize,
    margin: f64,
    frame_padding: f64,
    info: DocumentInfo,
}

impl DocTemplate {
    /// A4 with one inch margins
    pub fn a4(title: impl Into<String>) -> Self {
        Self {
            page_size: PageSize::A4,
            margin: 72.0,
            frame_padding: 6.0,
            info: DocumentInfo::new(title),
        }
    }

    /// Left edge of the frame content
    pub fn frame_x(&self) -> f64 {
        self.margin + self.frame_padding
    }

    /// Width available to flowables
    pub fn frame_width(&self) -> f64 {
        self.page_size.width - 2.0 * (self.margin + self.frame_padding)
    }

    fn frame_top(&self) -> f64 {
        self.page_size.height - self.margin - self.frame_padding
    }

    fn frame_bottom(&self) -> f64 {
        self.margin + self.frame_padding
    }

    /// Lays the flowables out and writes the PDF
    pub fn build(&self, flowables: Vec<Flowable>) -> Result<RenderedDocument, RenderError> {
        let pages = self.layout(flowables);
        let bytes = write_pdf(self.page_size, &pages, &self.info)?;
        Ok(RenderedDocument { bytes, pages })
    }

    /// Lays the flowables out on as many pages as they need
    pub fn layout(&self, flowables: Vec<Flowable>) -> Vec<Canvas> {
        let x = self.frame_x();
        let width = self.frame_width();
        let bottom = self.frame_bottom();

        let mut queue: VecDeque<Flowable> = flowables.into();
        let mut pages = Vec::new();
        let mut canvas = Canvas::new();
        let mut y = self.frame_top();
        let mut at_top = true;

        while let Some(item) = queue.pop_front() {
            let before = if at_top { 0.0 } else { item.space_before() };
            let height = item.height(width);
            let remaining = y - before - bottom;

            if height <= remaining + FIT_TOLERANCE {
                item.draw(&mut canvas, x, y - before, width);
                y -= before + height + item.space_after();
                at_top = false;
                continue;
            }

            if let Some((head, tail)) = item.split(width, remaining) {
                head.draw(&mut canvas, x, y - before, width);
                queue.push_front(tail);
            } else if at_top {
                // Nothing smaller is possible, so let it run off the page
                warn!(height, available = remaining, "Content taller than a page");
                item.draw(&mut canvas, x, y, width);
            } else {
                queue.push_front(item);
            }

            pages.push(std::mem::take(&mut canvas));
            y = self.frame_top();
            at_top = true;
        }

        if !canvas.is_empty() || pages.is_empty() {
            pages.push(canvas);
        }
        debug!(pages = pages.len(), title = %self.info.title, "Document laid out");
        pages
    }
}
