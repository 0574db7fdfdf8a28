//! # wako-core: Pure Business Logic for the Wako Back Office
//!
//! This crate holds every rule of the order/invoice pipeline that can be
//! expressed without touching storage or the network.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Wako Back Office Architecture                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 HTTP API (apps/api, axum)                       │   │
//! │  │   login, customers, transactions, invoice issue/download        │   │
//! │  └──────────────┬──────────────────────────────────┬───────────────┘   │
//! │                 │                                  │                    │
//! │  ┌──────────────▼──────────────┐   ┌───────────────▼───────────────┐   │
//! │  │     wako-db (SQLite)        │   │     wako-pdf (printpdf)       │   │
//! │  │  sequences, orders, items   │   │  InvoiceDocument → PDF bytes  │   │
//! │  └──────────────┬──────────────┘   └───────────────┬───────────────┘   │
//! │                 │                                  │                    │
//! │  ┌──────────────▼──────────────────────────────────▼───────────────┐   │
//! │  │               ★ wako-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │  ┌─────────┐ ┌──────────┐ ┌───────────┐ ┌─────────┐ ┌────────┐ │   │
//! │  │  │  money  │ │numbering │ │ aggregate │ │ invoice │ │  types │ │   │
//! │  │  │  Money  │ │ WK-/INV- │ │ rows→txns │ │ totals  │ │ domain │ │   │
//! │  │  └─────────┘ └──────────┘ └───────────┘ └─────────┘ └────────┘ │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Customer, PurchaseOrder, Transaction, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`numbering`] - PO and invoice code formatting
//! - [`aggregate`] - Grouping of joined order/item rows into transactions
//! - [`invoice`] - Invoice document assembly and the renderer seam
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use wako_core::money::Money;
//! use wako_core::numbering::po_code;
//!
//! let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
//! assert_eq!(po_code(date, 7), "WK-240501-0007");
//!
//! let line = Money::from_rupiah(50_000).checked_multiply(2).unwrap();
//! assert_eq!(line.to_string(), "Rp 100.000");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod aggregate;
pub mod error;
pub mod invoice;
pub mod money;
pub mod numbering;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use aggregate::{group_rows, TransactionRow};
pub use error::{CoreError, CoreResult, RenderError, ValidationError};
pub use invoice::{InvoiceDocument, InvoiceLine, InvoiceRenderer};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Prefix of purchase order codes (`WK-YYMMDD-NNNN`).
pub const PO_PREFIX: &str = "WK-";

/// Prefix of invoice codes (`INV-YYMM-NNNN`).
pub const INVOICE_PREFIX: &str = "INV-";

/// Minimum display width of allocated sequence numbers.
///
/// Numbers above 9999 keep all their digits; the width is a floor, not a cap.
pub const SEQUENCE_WIDTH: usize = 4;

/// Maximum quantity of a single line item.
///
/// Large print runs (flyers, stickers) reach tens of thousands; the cap only
/// keeps `unit_price × quantity` comfortably inside i64.
pub const MAX_ITEM_QUANTITY: i64 = 10_000_000;

/// Maximum number of line items on one purchase order.
pub const MAX_ORDER_ITEMS: usize = 200;
