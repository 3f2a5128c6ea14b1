//! Wrapped text
//!
//! A paragraph is a list of hard lines, each made of plain or bold spans.
//! Hard lines are word-wrapped to the available width.

use super::canvas::Canvas;
use super::metrics::Font;

/// Font settings for a paragraph
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParagraphStyle {
    pub font: Font,
    pub bold_font: Font,
    pub font_size: f64,
    pub leading: f64,
    pub space_before: f64,
    pub space_after: f64,
}

impl ParagraphStyle {
    /// Body text: 10pt on 12pt leading
    pub fn body() -> Self {
        Self {
            font: Font::Regular,
            bold_font: Font::Bold,
            font_size: 10.0,
            leading: 12.0,
            space_before: 6.0,
            space_after: 0.0,
        }
    }

    /// Document title: 18pt bold
    pub fn heading1() -> Self {
        Self {
            font: Font::Bold,
            bold_font: Font::Bold,
            font_size: 18.0,
            leading: 22.0,
            space_before: 0.0,
            space_after: 6.0,
        }
    }
}

/// A run of text in one weight
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub bold: bool,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self { text: text.into(), bold: false }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self { text: text.into(), bold: true }
    }
}

/// One word after wrapping
#[derive(Debug, Clone, PartialEq)]
struct Word {
    text: String,
    font: Font,
    width: f64,
}

/// Word-wrapped text
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    lines: Vec<Vec<Span>>,
    style: ParagraphStyle,
}

impl Paragraph {
    /// Plain text; `\n` starts a new line
    pub fn new(text: &str, style: ParagraphStyle) -> Self {
        Self {
            lines: text.split('\n').map(|l| vec![Span::plain(l)]).collect(),
            style,
        }
    }

    /// Bold text; `\n` starts a new line
    pub fn bold(text: &str, style: ParagraphStyle) -> Self {
        Self {
            lines: text.split('\n').map(|l| vec![Span::bold(l)]).collect(),
            style,
        }
    }

    /// Text built from spans, one inner list per hard line
    pub fn from_lines(lines: Vec<Vec<Span>>, style: ParagraphStyle) -> Self {
        Self { lines, style }
    }

    pub fn style(&self) -> &ParagraphStyle {
        &self.style
    }

    fn font_for(&self, span: &Span) -> Font {
        if span.bold {
            self.style.bold_font
        } else {
            self.style.font
        }
    }

    /// Breaks the text into lines no wider than `width` where possible
    fn wrap_lines(&self, width: f64) -> Vec<Vec<Word>> {
        let size = self.style.font_size;
        let mut wrapped = Vec::new();
        for hard_line in &self.lines {
            let words: Vec<Word> = hard_line
                .iter()
                .flat_map(|span| {
                    let font = self.font_for(span);
                    span.text
                        .split_whitespace()
                        .map(move |w| Word {
                            text: w.to_string(),
                            font,
                            width: font.text_width(w, size),
                        })
                        .collect::<Vec<_>>()
                })
                .collect();

            let mut line: Vec<Word> = Vec::new();
            let mut line_width = 0.0;
            for word in words {
                let space = word.font.text_width(" ", size);
                if !line.is_empty() && line_width + space + word.width > width {
                    wrapped.push(std::mem::take(&mut line));
                    line_width = 0.0;
                }
                if !line.is_empty() {
                    line_width += space;
                }
                line_width += word.width;
                line.push(word);
            }
            // Blank hard lines still take up a line
            wrapped.push(line);
        }
        wrapped
    }

    /// Height of the wrapped text
    pub fn height(&self, width: f64) -> f64 {
        self.wrap_lines(width).len() as f64 * self.style.leading
    }

    /// Draws the text with the top of the first line at `top`
    pub fn draw(&self, canvas: &mut Canvas, x: f64, top: f64, width: f64) {
        let size = self.style.font_size;
        // Baseline sits a font size below the top of each line
        let mut baseline = top - size;
        for line in self.wrap_lines(width) {
            let mut cursor = x;
            for word in &line {
                canvas.text(word.font, size, cursor, baseline, &word.text);
                cursor += word.width + word.font.text_width(" ", size);
            }
            baseline -= self.style.leading;
        }
    }
}
