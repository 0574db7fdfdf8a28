//! # Domain Types
//!
//! Core domain types used throughout the back office.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Customer     │◄──│  PurchaseOrder  │◄──│ TransactionItem │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  po_id (FK)     │       │
//! │  │  contact_name   │   │  po_number      │   │  unit_price     │       │
//! │  │  company_name?  │   │  invoice_number?│   │  quantity       │       │
//! │  │  phone?         │   │  invoice_date?  │   │  consignment?   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  Transaction (read model, never persisted)                      │   │
//! │  │  PurchaseOrder + customer snapshot + ordered items              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Orders have:
//! - `id`: integer row id - used for relations and creation-order tie-breaks
//! - `po_number`: human-readable business key (`WK-240501-0007`)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Customer
// =============================================================================

/// A customer of the shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: i64,
    pub company_name: Option<String>,
    pub contact_name: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating or replacing a customer record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub contact_name: String,
    #[serde(default)]
    pub phone: Option<String>,
}

impl NewCustomer {
    /// Returns a copy with surrounding whitespace removed and blank optional
    /// fields turned into `None`.
    pub fn normalized(&self) -> NewCustomer {
        fn clean(value: &Option<String>) -> Option<String> {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        }

        NewCustomer {
            company_name: clean(&self.company_name),
            contact_name: self.contact_name.trim().to_string(),
            phone: clean(&self.phone),
        }
    }
}

/// Customer fields copied onto a transaction for display and invoicing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSnapshot {
    pub company_name: Option<String>,
    pub contact_name: String,
    pub phone: Option<String>,
}

// =============================================================================
// Purchase Order
// =============================================================================

/// A purchase order row.
///
/// `invoice_number` and `invoice_date` are either both `None` or both set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PurchaseOrder {
    pub id: i64,
    pub po_number: String,
    pub date: DateTime<Utc>,
    pub customer_id: Option<i64>,
    pub invoice_number: Option<String>,
    pub invoice_date: Option<DateTime<Utc>>,
}

impl PurchaseOrder {
    /// Returns the billing state of this order.
    pub fn invoice_state(&self) -> InvoiceState {
        InvoiceState::from_parts(self.invoice_number.as_deref(), self.invoice_date)
    }
}

/// Billing state of a purchase order.
///
/// ```text
/// Unbilled ──issue()──► Invoiced   (one way, never re-issued)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum InvoiceState {
    /// No invoice number has been issued yet.
    Unbilled,
    /// Invoice number and date are set and immutable.
    Invoiced {
        invoice_number: String,
        invoice_date: DateTime<Utc>,
    },
}

impl InvoiceState {
    /// Derives the state from the two nullable invoice columns.
    ///
    /// A row with only one of the two columns set violates the pairing
    /// invariant; it is reported as `Unbilled` only when the number is absent,
    /// because the number is what the issuance guard keys on.
    pub fn from_parts(number: Option<&str>, date: Option<DateTime<Utc>>) -> Self {
        match (number, date) {
            (Some(invoice_number), Some(invoice_date)) => InvoiceState::Invoiced {
                invoice_number: invoice_number.to_string(),
                invoice_date,
            },
            (Some(invoice_number), None) => InvoiceState::Invoiced {
                invoice_number: invoice_number.to_string(),
                invoice_date: DateTime::<Utc>::UNIX_EPOCH,
            },
            (None, _) => InvoiceState::Unbilled,
        }
    }

    /// Returns `true` once an invoice number exists.
    pub fn is_invoiced(&self) -> bool {
        matches!(self, InvoiceState::Invoiced { .. })
    }
}

/// Result of a successful issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedInvoice {
    pub po_number: String,
    pub invoice_number: String,
    pub invoice_date: DateTime<Utc>,
}

// =============================================================================
// Transaction Items
// =============================================================================

/// Secondary quantity of the same item held on consignment terms.
///
/// Billed at the parent item's unit price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consignment {
    pub name: String,
    pub quantity: i64,
}

/// A persisted line item of a purchase order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionItem {
    pub id: i64,
    pub item_name: String,
    pub unit_price: Money,
    pub quantity: i64,
    /// Stored redundantly; equals `unit_price × quantity` at write time.
    pub total_price: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consignment: Option<Consignment>,
}

impl TransactionItem {
    /// Total of the consignment sub-line, if any.
    pub fn consignment_total(&self) -> Option<Money> {
        self.consignment
            .as_ref()
            .and_then(|c| self.unit_price.checked_multiply(c.quantity))
    }
}

/// A line item as submitted when creating an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransactionItem {
    pub item_name: String,
    pub unit_price: Money,
    pub quantity: i64,
    pub consignment: Option<Consignment>,
}

impl NewTransactionItem {
    /// Line total persisted as `total_price`.
    pub fn line_total(&self) -> Option<Money> {
        self.unit_price.checked_multiply(self.quantity)
    }
}

/// Input for creating a purchase order together with its items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub customer_id: i64,
    pub items: Vec<NewTransactionItem>,
}

/// Identifiers of a freshly created order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedTransaction {
    pub id: i64,
    pub po_number: String,
    pub date: DateTime<Utc>,
}

// =============================================================================
// Transaction (aggregate view)
// =============================================================================

/// A purchase order with its customer and ordered line items.
///
/// Built on read from joined rows; see [`crate::aggregate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub po_number: String,
    pub date: DateTime<Utc>,
    pub customer_id: Option<i64>,
    pub customer: Option<CustomerSnapshot>,
    pub invoice_number: Option<String>,
    pub invoice_date: Option<DateTime<Utc>>,
    pub items: Vec<TransactionItem>,
}

impl Transaction {
    /// Returns the billing state of the underlying order.
    pub fn invoice_state(&self) -> InvoiceState {
        InvoiceState::from_parts(self.invoice_number.as_deref(), self.invoice_date)
    }
}

// =============================================================================
// Sequence Counters
// =============================================================================

/// Named counters seeded at initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceName {
    PoNumber,
    InvoiceNumber,
}

impl SequenceName {
    /// Row id in `sequence_numbers`.
    pub const fn as_str(&self) -> &'static str {
        match self {
            SequenceName::PoNumber => "po_number",
            SequenceName::InvoiceNumber => "invoice_number",
        }
    }
}

impl std::fmt::Display for SequenceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Users
// =============================================================================

/// A back-office user (password hash excluded).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
