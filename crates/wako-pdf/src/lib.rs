//! # wako-pdf: Invoice PDF Renderer
//!
//! Lays out an [`InvoiceDocument`] on A4 pages using the PDF builtin
//! Helvetica fonts.
//!
//! ## Page Layout
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                               WAKO PRINTING  │  header (business profile)
//! │                               address lines  │
//! │                               Phone: ...     │
//! │                                              │
//! │  Customer:                    Invoice:       │
//! │    company                      Number: ...  │
//! │    Contact: ...                 Date: ...    │
//! │    Phone: ...                   PO Number:   │
//! │                                              │
//! │  Item              Qty      Price     Total  │  table header (repeated
//! │  ____________________________________________│  on continuation pages)
//! │  Banner              2  Rp 50.000 Rp 100.000 │
//! │      + Flyer        10  Rp 50.000 Rp 500.000 │  consignment sub-row
//! │  ____________________________________________│
//! │                           Total: Rp 600.000  │
//! │                                              │
//! │  Payment Details:                            │
//! │    Bank / Account / Name                     │
//! │                               Hormat Kami,   │
//! │                                              │
//! │                               WAKO PRINTING  │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use wako_core::InvoiceRenderer;
//! use wako_pdf::{BusinessProfile, PdfInvoiceRenderer};
//!
//! let renderer = PdfInvoiceRenderer::new(BusinessProfile::default());
//! let bytes = renderer.render(&document)?;
//! ```

use chrono::{DateTime, FixedOffset, Offset, Utc};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tracing::debug;

use wako_core::{InvoiceDocument, InvoiceLine, InvoiceRenderer, RenderError};

// =============================================================================
// Page Geometry (millimetres)
// =============================================================================

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN_LEFT: f32 = 20.0;
const MARGIN_RIGHT: f32 = 190.0;
const MARGIN_TOP: f32 = 277.0;
const MARGIN_BOTTOM: f32 = 20.0;

const RIGHT_COLUMN: f32 = 130.0;
const BLOCK_INDENT: f32 = 4.0;
const QTY_RIGHT: f32 = 118.0;
const PRICE_RIGHT: f32 = 152.0;
const TOTAL_RIGHT: f32 = MARGIN_RIGHT;
const CONSIGNMENT_INDENT: f32 = 7.0;

const TITLE_SIZE: f32 = 18.0;
const BODY_SIZE: f32 = 10.0;
const TOTAL_SIZE: f32 = 12.0;
const LINE_HEIGHT: f32 = 5.5;
const ROW_HEIGHT: f32 = 7.0;

/// Space the total, payment and signature blocks need below the table.
const FOOTER_HEIGHT: f32 = 75.0;

/// Longest item description printed before truncation.
const MAX_DESCRIPTION_CHARS: usize = 48;

const PT_TO_MM: f32 = 0.3528;

const LAYER_NAME: &str = "Layer 1";

// =============================================================================
// Business Profile
// =============================================================================

/// Seller details printed in the header, payment and signature blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessProfile {
    pub name: String,
    pub address_lines: Vec<String>,
    pub phone: Option<String>,
    pub bank_name: String,
    pub bank_account: String,
    pub bank_account_holder: String,
}

impl Default for BusinessProfile {
    fn default() -> Self {
        BusinessProfile {
            name: "WAKO PRINTING".to_string(),
            address_lines: vec![
                "Jl. Raya Janti No.3, Banguntapan".to_string(),
                "Bantul, Yogyakarta".to_string(),
            ],
            phone: Some("0857-2900-1405".to_string()),
            bank_name: "BCA".to_string(),
            bank_account: "6290346817".to_string(),
            bank_account_holder: "Eko Prambudi".to_string(),
        }
    }
}

// =============================================================================
// Renderer
// =============================================================================

/// Renders invoices to PDF bytes.
#[derive(Debug, Clone)]
pub struct PdfInvoiceRenderer {
    profile: BusinessProfile,
    local_offset: FixedOffset,
}

impl PdfInvoiceRenderer {
    /// Creates a renderer that prints dates in UTC+07:00.
    pub fn new(profile: BusinessProfile) -> Self {
        let local_offset = FixedOffset::east_opt(7 * 3600).unwrap_or_else(|| Utc.fix());
        PdfInvoiceRenderer {
            profile,
            local_offset,
        }
    }

    /// Sets the offset used to print invoice dates.
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.local_offset = offset;
        self
    }

    /// Returns the business profile printed on invoices.
    pub fn profile(&self) -> &BusinessProfile {
        &self.profile
    }

    fn format_date(&self, date: DateTime<Utc>) -> String {
        date.with_timezone(&self.local_offset)
            .format("%d/%m/%Y")
            .to_string()
    }

    /// Draws every block and returns the unsaved document.
    fn layout(&self, document: &InvoiceDocument) -> Result<PageWriter, RenderError> {
        let fail = |e| render_error(&document.invoice_number, e);

        let title = format!("Invoice {}", document.invoice_number);
        let (doc, page, layer) = PdfDocument::new(
            title.as_str(),
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            LAYER_NAME,
        );
        let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(fail)?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(fail)?;
        let layer = doc.get_page(page).get_layer(layer);

        let mut writer = PageWriter {
            doc,
            layer,
            regular,
            bold,
            y: MARGIN_TOP,
            pages: 1,
        };

        self.draw_header(&mut writer);
        self.draw_parties(&mut writer, document);
        draw_items(&mut writer, &document.lines);
        self.draw_footer(&mut writer, document);

        Ok(writer)
    }

    fn draw_header(&self, w: &mut PageWriter) {
        w.text_right(&self.profile.name, TITLE_SIZE, MARGIN_RIGHT, true);
        w.advance(9.0);

        for line in &self.profile.address_lines {
            w.text(line, BODY_SIZE, RIGHT_COLUMN, false);
            w.advance(LINE_HEIGHT);
        }
        if let Some(phone) = &self.profile.phone {
            w.text(&format!("Phone: {}", phone), BODY_SIZE, RIGHT_COLUMN, false);
            w.advance(LINE_HEIGHT);
        }

        w.advance(8.0);
    }

    fn draw_parties(&self, w: &mut PageWriter, document: &InvoiceDocument) {
        let (company, contact, phone) = match &document.customer {
            Some(c) => (
                c.company_name.clone().unwrap_or_default(),
                c.contact_name.clone(),
                c.phone.clone().unwrap_or_default(),
            ),
            None => (String::new(), String::new(), String::new()),
        };

        let left = [
            company,
            format!("Contact: {}", contact),
            format!("Phone: {}", phone),
        ];
        let right = [
            format!("Number: {}", document.invoice_number),
            format!("Date: {}", self.format_date(document.invoice_date)),
            format!("PO Number: {}", document.po_number),
        ];

        w.text("Customer:", BODY_SIZE, MARGIN_LEFT, true);
        w.text("Invoice:", BODY_SIZE, RIGHT_COLUMN, true);
        w.advance(LINE_HEIGHT);

        for (l, r) in left.iter().zip(right.iter()) {
            w.text(l, BODY_SIZE, MARGIN_LEFT + BLOCK_INDENT, false);
            w.text(r, BODY_SIZE, RIGHT_COLUMN + BLOCK_INDENT, false);
            w.advance(LINE_HEIGHT);
        }

        w.advance(10.0);
    }

    fn draw_footer(&self, w: &mut PageWriter, document: &InvoiceDocument) {
        w.ensure_space(FOOTER_HEIGHT);

        w.rule();
        w.advance(ROW_HEIGHT);
        w.text_right("Total:", TOTAL_SIZE, PRICE_RIGHT, true);
        w.text_right(&document.grand_total.to_string(), TOTAL_SIZE, TOTAL_RIGHT, true);
        w.advance(16.0);

        w.text("Payment Details:", BODY_SIZE, MARGIN_LEFT, true);
        w.advance(LINE_HEIGHT);
        for line in [
            format!("Bank: {}", self.profile.bank_name),
            format!("Account: {}", self.profile.bank_account),
            format!("Name: {}", self.profile.bank_account_holder),
        ] {
            w.text(&line, BODY_SIZE, MARGIN_LEFT + BLOCK_INDENT, false);
            w.advance(LINE_HEIGHT);
        }

        w.advance(8.0);
        w.text("Hormat Kami,", BODY_SIZE, RIGHT_COLUMN, false);
        w.advance(20.0);
        w.text(&self.profile.name, BODY_SIZE, RIGHT_COLUMN, true);
    }
}

impl InvoiceRenderer for PdfInvoiceRenderer {
    fn render(&self, document: &InvoiceDocument) -> Result<Vec<u8>, RenderError> {
        let writer = self.layout(document)?;

        debug!(
            invoice_number = %document.invoice_number,
            pages = writer.pages,
            lines = document.lines.len(),
            "Invoice rendered"
        );

        writer
            .doc
            .save_to_bytes()
            .map_err(|e| render_error(&document.invoice_number, e))
    }
}

fn render_error(invoice_number: &str, err: impl Display) -> RenderError {
    RenderError::new(invoice_number, err.to_string())
}

// =============================================================================
// Item Table
// =============================================================================

fn draw_table_header(w: &mut PageWriter) {
    w.text("Item", BODY_SIZE, MARGIN_LEFT, true);
    w.text_right("Qty", BODY_SIZE, QTY_RIGHT, true);
    w.text_right("Price", BODY_SIZE, PRICE_RIGHT, true);
    w.text_right("Total", BODY_SIZE, TOTAL_RIGHT, true);
    w.advance(1.5);
    w.rule();
    w.advance(ROW_HEIGHT);
}

fn draw_items(w: &mut PageWriter, lines: &[InvoiceLine]) {
    draw_table_header(w);

    for line in lines {
        if w.ensure_space(ROW_HEIGHT) {
            draw_table_header(w);
        }

        let (x, label) = if line.indent {
            (
                MARGIN_LEFT + CONSIGNMENT_INDENT,
                format!("+ {}", truncate(&line.description, MAX_DESCRIPTION_CHARS - 2)),
            )
        } else {
            (MARGIN_LEFT, truncate(&line.description, MAX_DESCRIPTION_CHARS))
        };

        w.text(&label, BODY_SIZE, x, false);
        w.text_right(&line.quantity.to_string(), BODY_SIZE, QTY_RIGHT, false);
        w.text_right(&line.unit_price.to_string(), BODY_SIZE, PRICE_RIGHT, false);
        w.text_right(&line.total.to_string(), BODY_SIZE, TOTAL_RIGHT, false);
        w.advance(ROW_HEIGHT);
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}

// =============================================================================
// Page Writer
// =============================================================================

/// Cursor over the current page; `y` runs top to bottom.
struct PageWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
    pages: usize,
}

impl PageWriter {
    fn text(&self, text: &str, size: f32, x: f32, bold: bool) {
        let font = if bold { &self.bold } else { &self.regular };
        self.layer.use_text(text, size, Mm(x), Mm(self.y), font);
    }

    fn text_right(&self, text: &str, size: f32, right: f32, bold: bool) {
        let x = (right - text_width(text, size)).max(MARGIN_LEFT);
        self.text(text, size, x, bold);
    }

    /// Horizontal rule drawn with underscores at the current baseline.
    fn rule(&self) {
        let underscore = text_width("_", BODY_SIZE);
        let count = ((MARGIN_RIGHT - MARGIN_LEFT) / underscore) as usize;
        self.text(&"_".repeat(count), BODY_SIZE, MARGIN_LEFT, false);
    }

    fn advance(&mut self, dy: f32) {
        self.y -= dy;
    }

    /// Starts a new page when fewer than `needed` mm remain.
    ///
    /// Returns `true` if a page break happened.
    fn ensure_space(&mut self, needed: f32) -> bool {
        if self.y - needed >= MARGIN_BOTTOM {
            return false;
        }

        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER_NAME);
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = MARGIN_TOP;
        self.pages += 1;
        true
    }
}

/// Approximate Helvetica advance width in millimetres.
fn text_width(text: &str, size: f32) -> f32 {
    let ems: f32 = text
        .chars()
        .map(|c| match c {
            '0'..='9' | '_' => 0.556,
            '.' | ',' | ' ' | ':' | 'i' | 'l' | 'I' => 0.278,
            'A'..='Z' => 0.667,
            _ => 0.52,
        })
        .sum();
    ems * size * PT_TO_MM
}

// =============================================================================
// Unit Tests
// =============================================================================
