//! Tables
//!
//! Fixed column widths, rows sized to their tallest cell, and style commands
//! addressed by `(column, row)` ranges where negative indices count from the
//! end. A table split across pages repeats its first `repeat_rows` rows at
//! the top of each continuation.

use super::canvas::Canvas;
use super::flowable::{draw_stack, stack_height, Flowable};
use super::metrics::Font;

/// Font of plain text cells
const CELL_FONT_SIZE: f64 = 10.0;
const CELL_LEADING: f64 = 12.0;

const DEFAULT_LEFT_PADDING: f64 = 6.0;
const DEFAULT_RIGHT_PADDING: f64 = 6.0;
const DEFAULT_TOP_PADDING: f64 = 3.0;
const DEFAULT_BOTTOM_PADDING: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VAlign {
    Top,
    Middle,
    #[default]
    Bottom,
}

/// Content of one cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    /// Plain 10pt text; `\n` starts a new line
    Text(String),
    /// Stacked flowables wrapped to the cell width
    Flowables(Vec<Flowable>),
}

impl Cell {
    pub fn text(text: impl Into<String>) -> Self {
        Cell::Text(text.into())
    }

    pub fn flowable(item: impl Into<Flowable>) -> Self {
        Cell::Flowables(vec![item.into()])
    }
}

/// A style command
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StyleCommand {
    /// Rule along the top of each row in range
    LineAbove { width: f64, gray: f64 },
    /// Rule along the bottom of each row in range
    LineBelow { width: f64, gray: f64 },
    /// Rule down the right side of each column in range
    LineAfter { width: f64, gray: f64 },
    Align(HAlign),
    VAlign(VAlign),
    LeftPadding(f64),
}

/// A command applied to the cells from `start` to `end` inclusive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableStyle {
    pub command: StyleCommand,
    /// `(column, row)`
    pub start: (i32, i32),
    /// `(column, row)`
    pub end: (i32, i32),
}

impl TableStyle {
    pub fn new(command: StyleCommand, start: (i32, i32), end: (i32, i32)) -> Self {
        Self { command, start, end }
    }

    /// The whole table
    pub fn all(command: StyleCommand) -> Self {
        Self::new(command, (0, 0), (-1, -1))
    }
}

/// Absolute, inclusive range
#[derive(Debug, Clone, Copy)]
struct Span {
    c0: usize,
    r0: usize,
    c1: usize,
    r1: usize,
}

impl Span {
    fn contains(&self, col: usize, row: usize) -> bool {
        (self.c0..=self.c1).contains(&col) && (self.r0..=self.r1).contains(&row)
    }
}

#[derive(Debug, Clone, Copy)]
struct CellFormat {
    align: HAlign,
    valign: VAlign,
    left_padding: f64,
}

/// A grid of cells
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    col_widths: Vec<f64>,
    rows: Vec<Vec<Cell>>,
    repeat_rows: usize,
    styles: Vec<TableStyle>,
    h_align: HAlign,
}

impl Table {
    /// Creates a table; short rows are padded with empty cells
    pub fn new(col_widths: Vec<f64>, rows: Vec<Vec<Cell>>) -> Self {
        let columns = col_widths.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(columns, Cell::Empty);
                row
            })
            .collect();
        Self {
            col_widths,
            rows,
            repeat_rows: 0,
            styles: Vec::new(),
            h_align: HAlign::Center,
        }
    }

    /// Rows repeated at the top of every page the table continues on
    pub fn with_repeat_rows(mut self, repeat_rows: usize) -> Self {
        self.repeat_rows = repeat_rows;
        self
    }

    pub fn with_styles(mut self, styles: impl IntoIterator<Item = TableStyle>) -> Self {
        self.styles.extend(styles);
        self
    }

    /// Position within the available width
    pub fn with_h_align(mut self, h_align: HAlign) -> Self {
        self.h_align = h_align;
        self
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> f64 {
        self.col_widths.iter().sum()
    }

    fn resolve_index(index: i32, len: usize) -> usize {
        let len = len as i32;
        let resolved = if index < 0 { len + index } else { index };
        resolved.clamp(0, (len - 1).max(0)) as usize
    }

    fn resolve(&self, style: &TableStyle) -> Span {
        let cols = self.col_widths.len();
        let rows = self.rows.len();
        Span {
            c0: Self::resolve_index(style.start.0, cols),
            r0: Self::resolve_index(style.start.1, rows),
            c1: Self::resolve_index(style.end.0, cols),
            r1: Self::resolve_index(style.end.1, rows),
        }
    }

    fn cell_format(&self, col: usize, row: usize) -> CellFormat {
        let mut format = CellFormat {
            align: HAlign::default(),
            valign: VAlign::default(),
            left_padding: DEFAULT_LEFT_PADDING,
        };
        for style in &self.styles {
            if !self.resolve(style).contains(col, row) {
                continue;
            }
            match style.command {
                StyleCommand::Align(a) => format.align = a,
                StyleCommand::VAlign(v) => format.valign = v,
                StyleCommand::LeftPadding(p) => format.left_padding = p,
                _ => {}
            }
        }
        format
    }

    fn inner_width(&self, col: usize, format: &CellFormat) -> f64 {
        (self.col_widths[col] - format.left_padding - DEFAULT_RIGHT_PADDING).max(0.0)
    }

    fn content_height(cell: &Cell, inner_width: f64) -> f64 {
        match cell {
            Cell::Empty => 0.0,
            Cell::Text(text) => text.split('\n').count() as f64 * CELL_LEADING,
            Cell::Flowables(items) => stack_height(items, inner_width),
        }
    }

    fn row_heights(&self) -> Vec<f64> {
        self.rows
            .iter()
            .enumerate()
            .map(|(r, row)| {
                let tallest = row
                    .iter()
                    .enumerate()
                    .map(|(c, cell)| {
                        let format = self.cell_format(c, r);
                        Self::content_height(cell, self.inner_width(c, &format))
                    })
                    .fold(0.0, f64::max);
                tallest + DEFAULT_TOP_PADDING + DEFAULT_BOTTOM_PADDING
            })
            .collect()
    }

    /// Total height; the width is fixed by the columns
    pub fn height(&self, _avail_width: f64) -> f64 {
        self.row_heights().iter().sum()
    }

    fn left_edge(&self, x: f64, avail_width: f64) -> f64 {
        let slack = (avail_width - self.width()).max(0.0);
        match self.h_align {
            HAlign::Left => x,
            HAlign::Center => x + slack / 2.0,
            HAlign::Right => x + slack,
        }
    }

    /// Draws cells, then rules, with the top edge at `top`
    pub fn draw(&self, canvas: &mut Canvas, x: f64, top: f64, avail_width: f64) {
        let heights = self.row_heights();
        let left = self.left_edge(x, avail_width);

        let mut col_x = Vec::with_capacity(self.col_widths.len() + 1);
        col_x.push(left);
        for w in &self.col_widths {
            col_x.push(col_x[col_x.len() - 1] + w);
        }
        let mut row_y = Vec::with_capacity(heights.len() + 1);
        row_y.push(top);
        for h in &heights {
            row_y.push(row_y[row_y.len() - 1] - h);
        }

        for (r, row) in self.rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let format = self.cell_format(c, r);
                let inner = self.inner_width(c, &format);
                let content = Self::content_height(cell, inner);
                let content_top = match format.valign {
                    VAlign::Top => row_y[r] - DEFAULT_TOP_PADDING,
                    VAlign::Bottom => row_y[r + 1] + DEFAULT_BOTTOM_PADDING + content,
                    VAlign::Middle => {
                        let middle = (row_y[r] + row_y[r + 1]) / 2.0;
                        middle + content / 2.0
                    }
                };
                let cell_left = col_x[c] + format.left_padding;
                match cell {
                    Cell::Empty => {}
                    Cell::Text(text) => {
                        draw_text_lines(canvas, text, cell_left, inner, content_top, format.align)
                    }
                    Cell::Flowables(items) => draw_stack(items, canvas, cell_left, content_top, inner),
                }
            }
        }

        for style in &self.styles {
            let span = self.resolve(style);
            match style.command {
                StyleCommand::LineAbove { width, gray } => {
                    for r in span.r0..=span.r1 {
                        canvas.line(col_x[span.c0], row_y[r], col_x[span.c1 + 1], row_y[r], width, gray);
                    }
                }
                StyleCommand::LineBelow { width, gray } => {
                    for r in span.r0..=span.r1 {
                        let y = row_y[r + 1];
                        canvas.line(col_x[span.c0], y, col_x[span.c1 + 1], y, width, gray);
                    }
                }
                StyleCommand::LineAfter { width, gray } => {
                    for c in span.c0..=span.c1 {
                        let x = col_x[c + 1];
                        canvas.line(x, row_y[span.r0], x, row_y[span.r1 + 1], width, gray);
                    }
                }
                _ => {}
            }
        }
    }

    /// Splits between rows so the first part fits `avail_height`
    ///
    /// The first part must hold at least one row beyond the repeated ones.
    pub fn split(&self, _avail_width: f64, avail_height: f64) -> Option<(Table, Table)> {
        let heights = self.row_heights();
        let mut used = 0.0;
        let mut fits = 0;
        for h in &heights {
            if used + h > avail_height {
                break;
            }
            used += h;
            fits += 1;
        }
        if fits <= self.repeat_rows || fits >= self.rows.len() {
            return None;
        }

        let head: Vec<usize> = (0..fits).collect();
        let tail: Vec<usize> = (0..self.repeat_rows).chain(fits..self.rows.len()).collect();
        Some((self.subset(&head), self.subset(&tail)))
    }

    /// A table of the given source rows, with styles remapped onto them
    fn subset(&self, source_rows: &[usize]) -> Table {
        let mut styles = Vec::new();
        for style in &self.styles {
            let span = self.resolve(style);
            let mut run: Option<(usize, usize)> = None;
            for (position, &source) in source_rows.iter().enumerate() {
                let inside = (span.r0..=span.r1).contains(&source);
                let continues = position > 0 && source_rows[position - 1] + 1 == source;
                match run {
                    Some((start, end)) if inside && continues && end + 1 == position => {
                        run = Some((start, position));
                    }
                    _ => {
                        if let Some((start, end)) = run.take() {
                            styles.push(remapped(style, span, start, end));
                        }
                        if inside {
                            run = Some((position, position));
                        }
                    }
                }
            }
            if let Some((start, end)) = run {
                styles.push(remapped(style, span, start, end));
            }
        }

        Table {
            col_widths: self.col_widths.clone(),
            rows: source_rows.iter().map(|&r| self.rows[r].clone()).collect(),
            repeat_rows: self.repeat_rows.min(source_rows.len()),
            styles,
            h_align: self.h_align,
        }
    }
}

fn remapped(style: &TableStyle, span: Span, start: usize, end: usize) -> TableStyle {
    TableStyle::new(
        style.command,
        (span.c0 as i32, start as i32),
        (span.c1 as i32, end as i32),
    )
}

fn draw_text_lines(canvas: &mut Canvas, text: &str, left: f64, width: f64, top: f64, align: HAlign) {
    let font = Font::Regular;
    let mut baseline = top - CELL_FONT_SIZE;
    for line in text.split('\n') {
        let line_width = font.text_width(line, CELL_FONT_SIZE);
        let x = match align {
            HAlign::Left => left,
            HAlign::Center => left + (width - line_width) / 2.0,
            HAlign::Right => left + width - line_width,
        };
        canvas.text(font, CELL_FONT_SIZE, x, baseline, line);
        baseline -= CELL_LEADING;
    }
}
