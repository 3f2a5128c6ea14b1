//! The invoice document
//!
//! Builds the flowables for one invoice and lays them out on A4.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, instrument};

use core_kernel::money::{format_fixed, AMOUNT_DECIMAL_PLACES};
use core_kernel::{Currency, InvoiceId};
use domain_invoice::{DetailLine, InvoiceDetail, InvoicePort, InvoicePortExt, InvoiceSettings};

use crate::error::RenderError;
use crate::layout::{
    Canvas, Cell, DocTemplate, Flowable, HAlign, ImageBox, JpegImage, Paragraph, ParagraphStyle,
    Span, StyleCommand, Table, TableStyle, VAlign, BLACK, GRAY,
};

/// Width of the thin grid rules
const GRID_LINE_WIDTH: f64 = 0.25;

/// Gap between the header, the line table and the footer
const SECTION_GAP: f64 = 12.0;

const HEADER_COLUMNS: [f64; 2] = [300.0, 140.0];
const DETAIL_COLUMNS: [f64; 2] = [70.0, 200.0];
const LINE_COLUMNS: [f64; 6] = [20.0, 230.0, 50.0, 40.0, 50.0, 50.0];
const TOTAL_COLUMNS: [f64; 5] = [250.0, 50.0, 40.0, 50.0, 50.0];

/// A rendered invoice ready to save or send
#[derive(Debug, Clone)]
pub struct RenderedInvoice {
    /// `{prefix}-{invoice_number}.pdf`
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

impl RenderedInvoice {
    /// Writes the file into `dir`, returning its path
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<PathBuf, RenderError> {
        let path = dir.as_ref().join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        info!(path = %path.display(), bytes = self.bytes.len(), "Invoice PDF written");
        Ok(path)
    }
}

/// Invoice layout, optionally with a logo in the header
#[derive(Debug, Clone, Default)]
pub struct InvoicePrint {
    logo: Option<Arc<JpegImage>>,
}

fn body() -> ParagraphStyle {
    ParagraphStyle::body()
}

fn para(text: &str) -> Flowable {
    Paragraph::new(text, body()).into()
}

fn bold(text: &str) -> Flowable {
    Paragraph::bold(text, body()).into()
}

fn money(value: Decimal) -> String {
    format_fixed(value, AMOUNT_DECIMAL_PLACES)
}

fn column_rules(columns: usize) -> impl Iterator<Item = TableStyle> {
    (0..columns.saturating_sub(1)).map(|idx| {
        let idx = idx as i32;
        TableStyle::new(
            StyleCommand::LineAfter { width: GRID_LINE_WIDTH, gray: GRAY },
            (idx, 0),
            (idx, -1),
        )
    })
}

impl InvoicePrint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a logo above the company details
    pub fn with_logo(mut self, logo: JpegImage) -> Self {
        self.logo = Some(Arc::new(logo));
        self
    }

    /// Renders an invoice
    ///
    /// Fails with [`RenderError::MissingPrintSettings`] until the settings
    /// record exists.
    #[instrument(skip_all, fields(invoice_id = %detail.invoice.id))]
    pub fn render(
        &self,
        detail: &InvoiceDetail,
        settings: Option<&InvoiceSettings>,
    ) -> Result<RenderedInvoice, RenderError> {
        let settings = settings.ok_or(RenderError::MissingPrintSettings)?;
        let invoice_number = detail.invoice.invoice_number();
        let document = Self::template(detail).build(self.elements(detail, settings))?;
        info!(
            invoice_number = %invoice_number,
            pages = document.page_count(),
            lines = detail.lines.len(),
            "Invoice rendered"
        );

        Ok(RenderedInvoice {
            file_name: settings.pdf_file_name(&invoice_number),
            page_count: document.page_count(),
            bytes: document.bytes,
        })
    }

    /// Lays the invoice out without writing the PDF
    pub fn layout(
        &self,
        detail: &InvoiceDetail,
        settings: Option<&InvoiceSettings>,
    ) -> Result<Vec<Canvas>, RenderError> {
        let settings = settings.ok_or(RenderError::MissingPrintSettings)?;
        Ok(Self::template(detail).layout(self.elements(detail, settings)))
    }

    fn template(detail: &InvoiceDetail) -> DocTemplate {
        let invoice = &detail.invoice;
        DocTemplate::a4(format!("{} {}", invoice.description(), invoice.invoice_number()))
    }

    fn elements(&self, detail: &InvoiceDetail, settings: &InvoiceSettings) -> Vec<Flowable> {
        let mut elements = vec![
            self.header(detail, settings),
            Flowable::Spacer(SECTION_GAP),
            Self::lines(&detail.lines, detail.invoice.currency).into(),
            Self::totals(detail).into(),
        ];
        elements.extend(Self::footer(detail, settings));
        elements
    }

    /// Contact and company blocks; the heading gets its own row without a logo
    fn header(&self, detail: &InvoiceDetail, settings: &InvoiceSettings) -> Flowable {
        let contact = &detail.contact;
        let mut address = vec![contact.name.as_str()];
        address.extend(contact.address_lines());

        let left = vec![
            para(&address.join("\n")),
            Flowable::Spacer(SECTION_GAP),
            Self::invoice_detail(detail).into(),
        ];

        let mut right = Vec::new();
        if let Some(logo) = &self.logo {
            right.push(ImageBox::new(Arc::clone(logo)).into());
        }
        right.push(para(&settings.name_and_address.join("\n")));
        right.push(bold(&settings.phone_number));
        if let Some(vat_number) = settings.vat_number() {
            right.push(
                Paragraph::from_lines(
                    vec![vec![Span::bold("VAT Number"), Span::plain(vat_number)]],
                    body(),
                )
                .into(),
            );
        }

        let heading: Flowable =
            Paragraph::new(detail.invoice.description(), ParagraphStyle::heading1()).into();

        let rows = if self.logo.is_some() {
            let mut first = vec![heading];
            first.extend(left);
            vec![vec![Cell::Flowables(first), Cell::Flowables(right)]]
        } else {
            vec![
                vec![Cell::Flowables(vec![heading]), Cell::Empty],
                vec![Cell::Flowables(left), Cell::Flowables(right)],
            ]
        };

        Table::new(HEADER_COLUMNS.to_vec(), rows)
            .with_styles([
                TableStyle::all(StyleCommand::VAlign(VAlign::Top)),
                TableStyle::all(StyleCommand::LeftPadding(0.0)),
            ])
            .into()
    }

    /// Date and number, aligned as a small table inside the header
    fn invoice_detail(detail: &InvoiceDetail) -> Table {
        let invoice = &detail.invoice;
        Table::new(
            DETAIL_COLUMNS.to_vec(),
            vec![
                vec![
                    Cell::flowable(Paragraph::bold("Date", body())),
                    Cell::text(invoice.invoice_date.format("%d/%m/%Y").to_string()),
                ],
                vec![
                    Cell::flowable(Paragraph::bold("Invoice", body())),
                    Cell::text(invoice.invoice_number()),
                ],
            ],
        )
        .with_h_align(HAlign::Left)
        .with_styles([
            TableStyle::all(StyleCommand::VAlign(VAlign::Top)),
            TableStyle::all(StyleCommand::LeftPadding(0.0)),
        ])
    }

    /// Text of a line: its own description, the time record's and the rate
    fn line_description(line: &DetailLine, currency: Currency) -> String {
        let mut parts = Vec::new();
        if let Some(description) = &line.line.description {
            parts.push(description.clone());
        }
        if let Some(record) = &line.time_record {
            if let Some(description) = &record.description {
                parts.push(description.clone());
            }
            parts.push(record.period_label());
        }
        parts.push(format!(
            "{} {} @ {} {}",
            money(line.line.quantity),
            line.line.units,
            money(line.line.price),
            currency.unit_name(),
        ));
        parts.join("\n")
    }

    /// The line table, with a bold heading row each time the ticket changes
    fn lines(lines: &[DetailLine], currency: Currency) -> Table {
        let mut rows = vec![vec![
            Cell::Empty,
            Cell::Flowables(vec![para("Description")]),
            Cell::text("Net"),
            Cell::text("%VAT"),
            Cell::text("VAT"),
            Cell::text("Gross"),
        ]];
        let mut styles = vec![
            TableStyle::new(
                StyleCommand::LineAbove { width: GRID_LINE_WIDTH, gray: GRAY },
                (0, 0),
                (-1, 0),
            ),
            TableStyle::new(StyleCommand::VAlign(VAlign::Top), (0, 0), (0, -1)),
            TableStyle::new(StyleCommand::Align(HAlign::Right), (2, 0), (-1, -1)),
        ];

        let mut current_ticket = None;
        for line in lines {
            if let Some(ticket) = &line.ticket {
                if current_ticket != Some(ticket.id) {
                    current_ticket = Some(ticket.id);
                    let row = rows.len() as i32;
                    rows.push(vec![Cell::Empty, Cell::Flowables(vec![bold(&ticket.name)])]);
                    styles.push(TableStyle::new(
                        StyleCommand::LineBelow { width: GRID_LINE_WIDTH, gray: GRAY },
                        (0, row),
                        (-1, row),
                    ));
                }
            }
            let l = &line.line;
            rows.push(vec![
                Cell::text(l.line_number.to_string()),
                Cell::Flowables(vec![para(&Self::line_description(line, currency))]),
                Cell::text(money(l.net)),
                Cell::text(l.vat_rate.percentage_label()),
                Cell::text(money(l.vat)),
                Cell::text(money(l.gross())),
            ]);
        }

        styles.extend(column_rules(LINE_COLUMNS.len()));
        Table::new(LINE_COLUMNS.to_vec(), rows)
            .with_repeat_rows(1)
            .with_styles(styles)
    }

    fn totals(detail: &InvoiceDetail) -> Table {
        let invoice = &detail.invoice;
        let row = vec![
            Cell::Flowables(vec![bold("Totals")]),
            Cell::text(invoice.net().format_amount()),
            Cell::Empty,
            Cell::text(invoice.vat().format_amount()),
            Cell::text(invoice.gross().format_amount()),
        ];
        let mut styles = vec![
            TableStyle::new(StyleCommand::Align(HAlign::Right), (1, 0), (-1, -1)),
            TableStyle::new(
                StyleCommand::LineBelow { width: GRID_LINE_WIDTH, gray: GRAY },
                (0, 0),
                (-1, 0),
            ),
            TableStyle::new(StyleCommand::LineAbove { width: 1.0, gray: BLACK }, (0, 0), (-1, 0)),
        ];
        styles.extend(column_rules(TOTAL_COLUMNS.len()));
        Table::new(TOTAL_COLUMNS.to_vec(), vec![row]).with_styles(styles)
    }

    fn footer(detail: &InvoiceDetail, settings: &InvoiceSettings) -> Vec<Flowable> {
        let mut footer = vec![para(&format!(
            "All prices in {}",
            detail.invoice.currency.long_name()
        ))];
        footer.extend(settings.footer.iter().map(|text| para(text)));
        footer
    }
}

/// Loads an invoice with the settings and renders it
#[instrument(skip(print, port))]
pub async fn render_invoice(
    print: &InvoicePrint,
    port: &dyn InvoicePort,
    invoice_id: InvoiceId,
) -> Result<RenderedInvoice, RenderError> {
    let detail = port.get_invoice_detail(invoice_id).await?;
    let settings = port.get_settings().await?;
    print.render(&detail, settings.as_ref())
}
