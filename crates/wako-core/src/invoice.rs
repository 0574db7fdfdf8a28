//! # Invoice Document
//!
//! The structured document handed to an [`InvoiceRenderer`].
//!
//! ```text
//! Transaction (Invoiced) ──from_transaction()──► InvoiceDocument ──render()──► bytes
//!
//!   Banner      2 × Rp 50.000  = Rp 100.000     InvoiceLine { indent: false }
//!     + Flyer  10 × Rp 50.000  = Rp 500.000     InvoiceLine { indent: true  }
//!   ─────────────────────────────────────
//!   Total                        Rp 600.000     grand_total = Σ line totals
//! ```
//!
//! Layout is entirely the renderer's business. The document only guarantees
//! that `grand_total` equals the sum of every line it carries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, RenderError};
use crate::money::Money;
use crate::types::{CustomerSnapshot, Transaction};

// =============================================================================
// Document
// =============================================================================

/// One printed row of the item table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub description: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub total: Money,
    /// Consignment rows print indented under their parent item.
    pub indent: bool,
}

/// Everything a renderer needs to print one invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceDocument {
    pub invoice_number: String,
    pub invoice_date: DateTime<Utc>,
    pub po_number: String,
    pub po_date: DateTime<Utc>,
    pub customer: Option<CustomerSnapshot>,
    pub lines: Vec<InvoiceLine>,
    pub grand_total: Money,
}

impl InvoiceDocument {
    /// Builds the document for an invoiced transaction.
    ///
    /// ## Errors
    /// - [`CoreError::NotInvoiced`] if the order has no invoice number yet
    /// - [`CoreError::AmountOverflow`] if a line or the total leaves i64
    pub fn from_transaction(transaction: &Transaction) -> CoreResult<Self> {
        let (invoice_number, invoice_date) =
            match (&transaction.invoice_number, transaction.invoice_date) {
                (Some(number), Some(date)) => (number.clone(), date),
                _ => {
                    return Err(CoreError::NotInvoiced {
                        po_number: transaction.po_number.clone(),
                    })
                }
            };

        let overflow = |what: &str| CoreError::AmountOverflow {
            what: what.to_string(),
        };

        let mut lines = Vec::with_capacity(transaction.items.len());
        for item in &transaction.items {
            let total = item
                .unit_price
                .checked_multiply(item.quantity)
                .ok_or_else(|| overflow(&item.item_name))?;
            lines.push(InvoiceLine {
                description: item.item_name.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price,
                total,
                indent: false,
            });

            if let Some(consignment) = &item.consignment {
                let total = item
                    .unit_price
                    .checked_multiply(consignment.quantity)
                    .ok_or_else(|| overflow(&consignment.name))?;
                lines.push(InvoiceLine {
                    description: consignment.name.clone(),
                    quantity: consignment.quantity,
                    unit_price: item.unit_price,
                    total,
                    indent: true,
                });
            }
        }

        let grand_total = lines
            .iter()
            .try_fold(Money::zero(), |acc, line| acc.checked_add(line.total))
            .ok_or_else(|| overflow("grand total"))?;

        Ok(InvoiceDocument {
            invoice_number,
            invoice_date,
            po_number: transaction.po_number.clone(),
            po_date: transaction.date,
            customer: transaction.customer.clone(),
            lines,
            grand_total,
        })
    }

    /// Download file name: `invoice-<invoice_number>.pdf`.
    pub fn file_name(&self) -> String {
        format!("invoice-{}.pdf", self.invoice_number)
    }
}

// =============================================================================
// Renderer Seam
// =============================================================================

/// Turns an invoice document into a byte stream (a PDF in production).
///
/// Object safe, so callers can hold an `Arc<dyn InvoiceRenderer>`.
pub trait InvoiceRenderer: Send + Sync {
    fn render(&self, document: &InvoiceDocument) -> Result<Vec<u8>, RenderError>;
}
