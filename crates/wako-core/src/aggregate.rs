//! # Transaction Aggregation
//!
//! Turns the flat rows of an outer join into nested [`Transaction`]s.
//!
//! ## Row Shape
//! ```text
//! purchase_orders ⟕ customers ⟕ transaction_items
//! ORDER BY po.date DESC, po.id DESC, ti.id ASC
//!
//!   po_id │ po_number       │ ... │ item_id │ item_name
//!   ──────┼─────────────────┼─────┼─────────┼──────────
//!     12  │ WK-240502-0012  │     │   31    │ Banner      ┐
//!     12  │ WK-240502-0012  │     │   32    │ Sticker     ┘ one Transaction
//!     11  │ WK-240501-0011  │     │  NULL   │ NULL        ─ one Transaction, no items
//! ```
//!
//! Grouping is a single pass: the first row of a `po_number` opens a new
//! transaction, later rows only append items. The output therefore keeps the
//! order of the input rows.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{Consignment, CustomerSnapshot, Transaction, TransactionItem};

/// One row of the order/customer/item join.
///
/// Item and customer columns are nullable because of the outer joins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TransactionRow {
    pub po_id: i64,
    pub po_number: String,
    pub date: DateTime<Utc>,
    pub customer_id: Option<i64>,
    pub company_name: Option<String>,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub invoice_number: Option<String>,
    pub invoice_date: Option<DateTime<Utc>>,
    pub item_id: Option<i64>,
    pub item_name: Option<String>,
    pub unit_price_cents: Option<i64>,
    pub quantity: Option<i64>,
    pub total_price_cents: Option<i64>,
    pub consignment_name: Option<String>,
    pub consignment_qty: Option<i64>,
}

impl TransactionRow {
    fn customer(&self) -> Option<CustomerSnapshot> {
        self.contact_name.as_ref().map(|contact_name| CustomerSnapshot {
            company_name: self.company_name.clone(),
            contact_name: contact_name.clone(),
            phone: self.phone.clone(),
        })
    }

    fn item(&self) -> Option<TransactionItem> {
        let id = self.item_id?;

        let consignment = match (&self.consignment_name, self.consignment_qty) {
            (Some(name), Some(quantity)) => Some(Consignment {
                name: name.clone(),
                quantity,
            }),
            _ => None,
        };

        Some(TransactionItem {
            id,
            item_name: self.item_name.clone().unwrap_or_default(),
            unit_price: Money::from_cents(self.unit_price_cents.unwrap_or_default()),
            quantity: self.quantity.unwrap_or_default(),
            total_price: Money::from_cents(self.total_price_cents.unwrap_or_default()),
            consignment,
        })
    }

    fn open_transaction(&self) -> Transaction {
        Transaction {
            id: self.po_id,
            po_number: self.po_number.clone(),
            date: self.date,
            customer_id: self.customer_id,
            customer: self.customer(),
            invoice_number: self.invoice_number.clone(),
            invoice_date: self.invoice_date,
            items: Vec::new(),
        }
    }
}

/// Groups sorted join rows into one [`Transaction`] per `po_number`.
///
/// Transactions appear in the order their first row appears. A row whose
/// item columns are NULL contributes the order but no item.
///
/// ## Example
/// ```rust
/// use chrono::Utc;
/// use wako_core::aggregate::{group_rows, TransactionRow};
///
/// let row = TransactionRow {
///     po_id: 1,
///     po_number: "WK-240501-0001".into(),
///     date: Utc::now(),
///     customer_id: None,
///     company_name: None,
///     contact_name: None,
///     phone: None,
///     invoice_number: None,
///     invoice_date: None,
///     item_id: None,
///     item_name: None,
///     unit_price_cents: None,
///     quantity: None,
///     total_price_cents: None,
///     consignment_name: None,
///     consignment_qty: None,
/// };
///
/// let transactions = group_rows(vec![row]);
/// assert_eq!(transactions.len(), 1);
/// assert!(transactions[0].items.is_empty());
/// ```
pub fn group_rows<I>(rows: I) -> Vec<Transaction>
where
    I: IntoIterator<Item = TransactionRow>,
{
    let (transactions, _) = rows.into_iter().fold(
        (Vec::<Transaction>::new(), HashMap::<String, usize>::new()),
        |(mut transactions, mut index), row| {
            let slot = match index.get(&row.po_number) {
                Some(&slot) => slot,
                None => {
                    index.insert(row.po_number.clone(), transactions.len());
                    transactions.push(row.open_transaction());
                    transactions.len() - 1
                }
            };

            if let Some(item) = row.item() {
                transactions[slot].items.push(item);
            }

            (transactions, index)
        },
    );

    transactions
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row(po_id: i64, po_number: &str, item: Option<(i64, &str, i64, i64)>) -> TransactionRow {
        TransactionRow {
            po_id,
            po_number: po_number.to_string(),
            date: Utc.with_ymd_and_hms(2024, 5, 1, 3, 0, 0).unwrap(),
            customer_id: Some(1),
            company_name: Some("PT Maju".to_string()),
            contact_name: Some("Budi".to_string()),
            phone: None,
            invoice_number: None,
            invoice_date: None,
            item_id: item.map(|i| i.0),
            item_name: item.map(|i| i.1.to_string()),
            unit_price_cents: item.map(|i| i.2),
            quantity: item.map(|i| i.3),
            total_price_cents: item.map(|i| i.2 * i.3),
            consignment_name: None,
            consignment_qty: None,
        }
    }

    #[test]
    fn test_groups_items_under_one_order() {
        let rows = vec![
            row(2, "WK-240501-0002", Some((3, "Banner", 5_000_000, 2))),
            row(2, "WK-240501-0002", Some((4, "Sticker", 100_000, 50))),
            row(1, "WK-240501-0001", Some((1, "Flyer", 50_000, 100))),
        ];

        let transactions = group_rows(rows);

        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0].po_number, "WK-240501-0002");
        assert_eq!(transactions[0].items.len(), 2);
        assert_eq!(transactions[0].items[0].item_name, "Banner");
        assert_eq!(transactions[0].items[1].item_name, "Sticker");
        assert_eq!(transactions[1].po_number, "WK-240501-0001");
        assert_eq!(
            transactions[0].items[0].total_price,
            Money::from_rupiah(100_000)
        );
    }

    #[test]
    fn test_order_without_items_has_empty_list() {
        let transactions = group_rows(vec![row(1, "WK-240501-0001", None)]);

        assert_eq!(transactions.len(), 1);
        assert!(transactions[0].items.is_empty());
        assert_eq!(
            transactions[0].customer.as_ref().map(|c| c.contact_name.as_str()),
            Some("Budi")
        );
    }

    #[test]
    fn test_preserves_first_seen_order() {
        // Non-adjacent rows of the same order still land in its first slot.
        let rows = vec![
            row(3, "WK-240503-0003", Some((5, "A", 100, 1))),
            row(2, "WK-240502-0002", None),
            row(3, "WK-240503-0003", Some((6, "B", 100, 1))),
        ];

        let numbers: Vec<_> = group_rows(rows)
            .into_iter()
            .map(|t| (t.po_number, t.items.len()))
            .collect();

        assert_eq!(
            numbers,
            vec![
                ("WK-240503-0003".to_string(), 2),
                ("WK-240502-0002".to_string(), 0)
            ]
        );
    }

    #[test]
    fn test_consignment_stays_on_parent_item() {
        let mut with_consignment = row(1, "WK-240501-0001", Some((1, "Banner", 500_000, 1)));
        with_consignment.consignment_name = Some("Flyer".to_string());
        with_consignment.consignment_qty = Some(10);

        let transactions = group_rows(vec![with_consignment]);
        let items = &transactions[0].items;

        assert_eq!(items.len(), 1);
        assert_eq!(
            items[0].consignment,
            Some(Consignment {
                name: "Flyer".to_string(),
                quantity: 10
            })
        );
    }

    #[test]
    fn test_missing_customer_yields_none() {
        let mut orphan = row(1, "WK-240501-0001", None);
        orphan.customer_id = None;
        orphan.company_name = None;
        orphan.contact_name = None;

        let transactions = group_rows(vec![orphan]);
        assert!(transactions[0].customer.is_none());
    }
}
