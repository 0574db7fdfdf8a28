//! # Transaction Repository
//!
//! Purchase orders, their line items, and invoice issuance.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Purchase Order Lifecycle                          │
//! │                                                                         │
//! │  1. CREATE (one unit of work)                                           │
//! │     ├── validate items            (before anything is written)          │
//! │     ├── allocate po_number        WK-YYMMDD-NNNN                        │
//! │     ├── insert purchase_orders row                                      │
//! │     └── insert every transaction_items row                              │
//! │         any failure → ROLLBACK, counter increment included              │
//! │                                                                         │
//! │  2. READ                                                                │
//! │     └── outer join → group_rows() → Transaction { items: [...] }        │
//! │                                                                         │
//! │  3. ISSUE INVOICE (one unit of work, Unbilled → Invoiced)               │
//! │     ├── allocate invoice_number   INV-YYMM-NNNN (order's own date)      │
//! │     ├── already invoiced? → ROLLBACK, return existing number            │
//! │     └── set invoice_number + invoice_date together                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every unit of work here starts with its counter increment, which takes
//! SQLite's write lock before anything is read. Concurrent writers queue on
//! the busy timeout instead of racing on stale snapshots.

use chrono::{DateTime, FixedOffset, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::sequence::next_value;
use wako_core::numbering::{invoice_code, local_date, po_code};
use wako_core::validation::validate_new_transaction;
use wako_core::{
    group_rows, CreatedTransaction, IssuedInvoice, NewTransaction, PurchaseOrder, SequenceName,
    Transaction, TransactionRow,
};

/// Join of orders, customers and items, newest order first.
const TRANSACTION_ROWS_SQL: &str = r#"
    SELECT
        po.id               AS po_id,
        po.po_number        AS po_number,
        po.date             AS date,
        po.customer_id      AS customer_id,
        c.company_name      AS company_name,
        c.contact_name      AS contact_name,
        c.phone             AS phone,
        po.invoice_number   AS invoice_number,
        po.invoice_date     AS invoice_date,
        ti.id               AS item_id,
        ti.item_name        AS item_name,
        ti.unit_price_cents AS unit_price_cents,
        ti.quantity         AS quantity,
        ti.total_price_cents AS total_price_cents,
        ti.consignment_name AS consignment_name,
        ti.consignment_qty  AS consignment_qty
    FROM purchase_orders po
    LEFT JOIN customers c ON c.id = po.customer_id
    LEFT JOIN transaction_items ti ON ti.po_id = po.id
"#;

const ORDER_COLUMNS: &str = "id, po_number, date, customer_id, invoice_number, invoice_date";

/// Repository for purchase orders and their aggregates.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
    local_offset: FixedOffset,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository.
    ///
    /// `local_offset` decides the calendar date printed in generated codes.
    pub fn new(pool: SqlitePool, local_offset: FixedOffset) -> Self {
        TransactionRepository { pool, local_offset }
    }

    // =========================================================================
    // Create
    // =========================================================================

    /// Creates a purchase order with all its items, dated now.
    pub async fn create(&self, input: &NewTransaction) -> DbResult<CreatedTransaction> {
        self.create_at(input, Utc::now()).await
    }

    /// Creates a purchase order with all its items at a given timestamp.
    ///
    /// Either the order and every item persist, or nothing does (the
    /// po_number allocation included).
    ///
    /// ## Errors
    /// - [`DbError::Validation`] for an empty item list or a bad item,
    ///   raised before the counter is touched
    /// - [`DbError::NotFound`] if the customer does not exist
    pub async fn create_at(
        &self,
        input: &NewTransaction,
        now: DateTime<Utc>,
    ) -> DbResult<CreatedTransaction> {
        validate_new_transaction(input)?;

        let mut tx = self.pool.begin().await?;

        let number = next_value(&mut tx, SequenceName::PoNumber).await?;
        let po_number = po_code(local_date(now, self.local_offset), number);

        if !customer_exists(&mut tx, input.customer_id).await? {
            tx.rollback().await?;
            warn!(customer_id = input.customer_id, "Order rejected: unknown customer");
            return Err(DbError::not_found("Customer", input.customer_id));
        }

        debug!(po_number = %po_number, items = input.items.len(), "Creating purchase order");

        let po_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO purchase_orders (po_number, date, customer_id)
            VALUES (?1, ?2, ?3)
            RETURNING id
            "#,
        )
        .bind(&po_number)
        .bind(now)
        .bind(input.customer_id)
        .fetch_one(&mut *tx)
        .await?;

        for item in &input.items {
            let total = item.line_total().ok_or_else(|| {
                DbError::Internal(format!("line total overflow for {}", item.item_name))
            })?;
            let (consignment_name, consignment_qty) = match &item.consignment {
                Some(c) => (Some(c.name.trim()), Some(c.quantity)),
                None => (None, None),
            };

            sqlx::query(
                r#"
                INSERT INTO transaction_items (
                    po_id, item_name, unit_price_cents, quantity, total_price_cents,
                    consignment_name, consignment_qty
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(po_id)
            .bind(item.item_name.trim())
            .bind(item.unit_price.cents())
            .bind(item.quantity)
            .bind(total.cents())
            .bind(consignment_name)
            .bind(consignment_qty)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(po_number = %po_number, po_id, "Purchase order created");

        Ok(CreatedTransaction {
            id: po_id,
            po_number,
            date: now,
        })
    }

    // =========================================================================
    // Read
    // =========================================================================

    /// Lists every transaction, newest first.
    ///
    /// Orders sharing a timestamp are ordered by id, most recent first.
    pub async fn list(&self) -> DbResult<Vec<Transaction>> {
        let rows = sqlx::query_as::<_, TransactionRow>(&format!(
            "{TRANSACTION_ROWS_SQL} ORDER BY po.date DESC, po.id DESC, ti.id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        debug!(rows = rows.len(), "Grouping transaction rows");
        Ok(group_rows(rows))
    }

    /// Gets one transaction by its PO number.
    pub async fn get(&self, po_number: &str) -> DbResult<Transaction> {
        let rows = sqlx::query_as::<_, TransactionRow>(&format!(
            "{TRANSACTION_ROWS_SQL} WHERE po.po_number = ?1 ORDER BY ti.id ASC"
        ))
        .bind(po_number)
        .fetch_all(&self.pool)
        .await?;

        group_rows(rows)
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("Purchase order", po_number))
    }

    /// Gets the bare purchase order row.
    pub async fn find_order(&self, po_number: &str) -> DbResult<Option<PurchaseOrder>> {
        let order = sqlx::query_as::<_, PurchaseOrder>(&format!(
            "SELECT {ORDER_COLUMNS} FROM purchase_orders WHERE po_number = ?1"
        ))
        .bind(po_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Counts all purchase orders.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM purchase_orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // =========================================================================
    // Invoice Issuance
    // =========================================================================

    /// Issues an invoice for an unbilled order, stamped now.
    pub async fn issue_invoice(&self, po_number: &str) -> DbResult<IssuedInvoice> {
        self.issue_invoice_at(po_number, Utc::now()).await
    }

    /// Moves an order from Unbilled to Invoiced.
    ///
    /// The invoice code takes its YYMM from the order's date, not from `now`.
    ///
    /// ## Errors
    /// - [`DbError::NotFound`] if the PO number is unknown
    /// - [`DbError::AlreadyInvoiced`] carrying the existing number; the
    ///   invoice counter is not advanced
    pub async fn issue_invoice_at(
        &self,
        po_number: &str,
        now: DateTime<Utc>,
    ) -> DbResult<IssuedInvoice> {
        let mut tx = self.pool.begin().await?;

        let number = next_value(&mut tx, SequenceName::InvoiceNumber).await?;

        let order = match order_by_number(&mut tx, po_number).await? {
            Some(order) => order,
            None => {
                tx.rollback().await?;
                return Err(DbError::not_found("Purchase order", po_number));
            }
        };

        if let Some(existing) = order.invoice_number {
            tx.rollback().await?;
            warn!(po_number, invoice_number = %existing, "Invoice already issued");
            return Err(DbError::AlreadyInvoiced {
                po_number: po_number.to_string(),
                invoice_number: existing,
            });
        }

        let invoice_number = invoice_code(local_date(order.date, self.local_offset), number);

        let updated = sqlx::query(
            r#"
            UPDATE purchase_orders
            SET invoice_number = ?2, invoice_date = ?3
            WHERE id = ?1 AND invoice_number IS NULL
            "#,
        )
        .bind(order.id)
        .bind(&invoice_number)
        .bind(now)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated != 1 {
            tx.rollback().await?;
            return Err(DbError::TransactionFailed(format!(
                "purchase order {po_number} changed during invoice issuance"
            )));
        }

        tx.commit().await?;

        info!(po_number, invoice_number = %invoice_number, "Invoice issued");

        Ok(IssuedInvoice {
            po_number: po_number.to_string(),
            invoice_number,
            invoice_date: now,
        })
    }
}

async fn customer_exists(conn: &mut SqliteConnection, customer_id: i64) -> DbResult<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM customers WHERE id = ?1")
        .bind(customer_id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(found.is_some())
}

async fn order_by_number(
    conn: &mut SqliteConnection,
    po_number: &str,
) -> DbResult<Option<PurchaseOrder>> {
    let order = sqlx::query_as::<_, PurchaseOrder>(&format!(
        "SELECT {ORDER_COLUMNS} FROM purchase_orders WHERE po_number = ?1"
    ))
    .bind(po_number)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(order)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::{Database, DbConfig};
    use chrono::TimeZone;
    use wako_core::{
        Consignment, InvoiceDocument, InvoiceState, Money, NewCustomer, NewTransactionItem,
    };

    async fn setup() -> (Database, i64) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let customer = db
            .customers()
            .create(&NewCustomer {
                company_name: Some("PT Maju".to_string()),
                contact_name: "Budi".to_string(),
                phone: None,
            })
            .await
            .unwrap();
        (db, customer.id)
    }

    fn item(name: &str, rupiah: i64, quantity: i64) -> NewTransactionItem {
        NewTransactionItem {
            item_name: name.to_string(),
            unit_price: Money::from_rupiah(rupiah),
            quantity,
            consignment: None,
        }
    }

    fn may_first() -> DateTime<Utc> {
        // 10:00 at UTC+7
        Utc.with_ymd_and_hms(2024, 5, 1, 3, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_create_formats_po_number() {
        let (db, customer_id) = setup().await;
        db.sequences()
            .advance_to(SequenceName::PoNumber, 6)
            .await
            .unwrap();

        let created = db
            .transactions()
            .create_at(
                &NewTransaction {
                    customer_id,
                    items: vec![item("Banner", 50_000, 2)],
                },
                may_first(),
            )
            .await
            .unwrap();

        assert_eq!(created.po_number, "WK-240501-0007");
    }

    #[tokio::test]
    async fn test_po_date_uses_local_offset() {
        let (db, customer_id) = setup().await;
        // 2024-04-30 18:30 UTC is already May 1st in UTC+7.
        let late_evening = Utc.with_ymd_and_hms(2024, 4, 30, 18, 30, 0).unwrap();

        let created = db
            .transactions()
            .create_at(
                &NewTransaction {
                    customer_id,
                    items: vec![item("Banner", 50_000, 1)],
                },
                late_evening,
            )
            .await
            .unwrap();

        assert_eq!(created.po_number, "WK-240501-0001");
    }

    #[tokio::test]
    async fn test_create_and_list_single_item() {
        let (db, customer_id) = setup().await;

        db.transactions()
            .create(&NewTransaction {
                customer_id,
                items: vec![item("Banner", 50_000, 2)],
            })
            .await
            .unwrap();

        let transactions = db.transactions().list().await.unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].items.len(), 1);
        assert_eq!(
            transactions[0].items[0].total_price,
            Money::from_rupiah(100_000)
        );
        assert_eq!(
            transactions[0].customer.as_ref().map(|c| c.contact_name.as_str()),
            Some("Budi")
        );
        assert_eq!(transactions[0].invoice_state(), InvoiceState::Unbilled);
    }

    #[tokio::test]
    async fn test_zero_items_rejected_without_writes() {
        let (db, customer_id) = setup().await;

        let result = db
            .transactions()
            .create(&NewTransaction {
                customer_id,
                items: vec![],
            })
            .await;

        assert!(matches!(result, Err(DbError::Validation(_))));
        assert_eq!(db.transactions().count().await.unwrap(), 0);
        assert_eq!(
            db.sequences().current(SequenceName::PoNumber).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_unknown_customer_rolls_back_everything() {
        let (db, _) = setup().await;

        let result = db
            .transactions()
            .create(&NewTransaction {
                customer_id: 999,
                items: vec![item("Banner", 50_000, 1)],
            })
            .await;

        assert!(matches!(result, Err(DbError::NotFound { .. })));
        assert_eq!(db.transactions().count().await.unwrap(), 0);
        assert_eq!(
            db.sequences().current(SequenceName::PoNumber).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_failed_item_insert_rolls_back_order_and_counter() {
        let (db, customer_id) = setup().await;
        sqlx::query(
            "CREATE TRIGGER reject_misprint BEFORE INSERT ON transaction_items \
             WHEN NEW.item_name = 'Misprint' \
             BEGIN SELECT RAISE(ABORT, 'misprint rejected'); END",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let result = db
            .transactions()
            .create(&NewTransaction {
                customer_id,
                items: vec![item("Banner", 50_000, 1), item("Misprint", 1_000, 1)],
            })
            .await;

        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert_eq!(db.transactions().count().await.unwrap(), 0);

        let items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transaction_items")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(items, 0);
        assert_eq!(
            db.sequences().current(SequenceName::PoNumber).await.unwrap(),
            0
        );

        let created = db
            .transactions()
            .create(&NewTransaction {
                customer_id,
                items: vec![item("Banner", 50_000, 1)],
            })
            .await
            .unwrap();
        assert!(created.po_number.ends_with("-0001"));
    }

    #[tokio::test]
    async fn test_consignment_name_is_trimmed() {
        let (db, customer_id) = setup().await;
        let mut flyer = item("Flyer", 1_000, 50);
        flyer.consignment = Some(Consignment {
            name: "  Flyer titip ".to_string(),
            quantity: 10,
        });

        let created = db
            .transactions()
            .create(&NewTransaction {
                customer_id,
                items: vec![flyer],
            })
            .await
            .unwrap();

        let txn = db.transactions().get(&created.po_number).await.unwrap();
        let consignment = txn.items[0].consignment.as_ref().unwrap();
        assert_eq!(consignment.name, "Flyer titip");
        assert_eq!(consignment.quantity, 10);
    }

    #[tokio::test]
    async fn test_item_count_and_totals() {
        let (db, customer_id) = setup().await;
        let mut flyer = item("Banner", 5_000, 2);
        flyer.consignment = Some(Consignment {
            name: "Flyer".to_string(),
            quantity: 10,
        });

        let created = db
            .transactions()
            .create(&NewTransaction {
                customer_id,
                items: vec![flyer, item("Sticker", 1_000, 50), item("Nota", 25_000, 3)],
            })
            .await
            .unwrap();

        let txn = db.transactions().get(&created.po_number).await.unwrap();
        assert_eq!(txn.items.len(), 3);
        assert_eq!(txn.items[0].item_name, "Banner");
        assert_eq!(
            txn.items[0].consignment_total(),
            Some(Money::from_rupiah(50_000))
        );

        let expected: Money = txn
            .items
            .iter()
            .map(|i| {
                let line = i.unit_price.checked_multiply(i.quantity).unwrap();
                line + i.consignment_total().unwrap_or_default()
            })
            .sum();

        db.transactions()
            .issue_invoice(&created.po_number)
            .await
            .unwrap();
        let invoiced = db.transactions().get(&created.po_number).await.unwrap();
        let doc = InvoiceDocument::from_transaction(&invoiced).unwrap();

        // 10.000 + 50.000 + 50.000 + 75.000
        assert_eq!(doc.grand_total, expected);
        assert_eq!(doc.grand_total, Money::from_rupiah(185_000));
    }

    #[tokio::test]
    async fn test_list_newest_first_with_id_tie_break() {
        let (db, customer_id) = setup().await;
        let repo = db.transactions();
        let order = |name: &str| NewTransaction {
            customer_id,
            items: vec![item(name, 1_000, 1)],
        };

        let older = Utc.with_ymd_and_hms(2024, 5, 1, 1, 0, 0).unwrap();
        let first = repo.create_at(&order("A"), older).await.unwrap();
        let second = repo.create_at(&order("B"), may_first()).await.unwrap();
        let third = repo.create_at(&order("C"), may_first()).await.unwrap();

        let numbers: Vec<_> = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.po_number)
            .collect();

        assert_eq!(
            numbers,
            vec![third.po_number, second.po_number, first.po_number]
        );
    }

    #[tokio::test]
    async fn test_get_unknown_po_is_not_found() {
        let (db, _) = setup().await;
        let result = db.transactions().get("WK-000000-0000").await;
        assert!(matches!(result, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_issue_uses_order_date() {
        let (db, customer_id) = setup().await;
        let created = db
            .transactions()
            .create_at(
                &NewTransaction {
                    customer_id,
                    items: vec![item("Banner", 50_000, 2)],
                },
                may_first(),
            )
            .await
            .unwrap();

        let june = Utc.with_ymd_and_hms(2024, 6, 15, 3, 0, 0).unwrap();
        let issued = db
            .transactions()
            .issue_invoice_at(&created.po_number, june)
            .await
            .unwrap();

        assert_eq!(issued.invoice_number, "INV-2405-0001");
        assert_eq!(issued.invoice_date, june);

        let order = db
            .transactions()
            .find_order(&created.po_number)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(order.invoice_number.as_deref(), Some("INV-2405-0001"));
        assert_eq!(order.invoice_date, Some(june));
    }

    #[tokio::test]
    async fn test_second_issue_returns_existing_number() {
        let (db, customer_id) = setup().await;
        let created = db
            .transactions()
            .create(&NewTransaction {
                customer_id,
                items: vec![item("Banner", 50_000, 2)],
            })
            .await
            .unwrap();

        let first = db
            .transactions()
            .issue_invoice(&created.po_number)
            .await
            .unwrap();
        let second = db.transactions().issue_invoice(&created.po_number).await;

        match second {
            Err(DbError::AlreadyInvoiced { invoice_number, .. }) => {
                assert_eq!(invoice_number, first.invoice_number);
            }
            other => panic!("expected AlreadyInvoiced, got {other:?}"),
        }

        assert_eq!(
            db.sequences()
                .current(SequenceName::InvoiceNumber)
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_issue_unknown_po_is_not_found() {
        let (db, _) = setup().await;

        let result = db.transactions().issue_invoice("WK-240501-9999").await;

        assert!(matches!(result, Err(DbError::NotFound { .. })));
        assert_eq!(
            db.sequences()
                .current(SequenceName::InvoiceNumber)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_concurrent_creates_get_distinct_numbers() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("wako.db")).max_connections(6))
            .await
            .unwrap();
        let customer = db
            .customers()
            .create(&NewCustomer {
                company_name: None,
                contact_name: "Budi".to_string(),
                phone: None,
            })
            .await
            .unwrap();

        let mut handles = Vec::new();
        for i in 0..12 {
            let repo = db.transactions();
            let input = NewTransaction {
                customer_id: customer.id,
                items: vec![item(&format!("Item {i}"), 1_000, 1), item("Extra", 500, 2)],
            };
            handles.push(tokio::spawn(async move { repo.create(&input).await }));
        }

        let mut numbers = Vec::new();
        for handle in handles {
            numbers.push(handle.await.unwrap().unwrap().po_number);
        }
        numbers.sort();
        numbers.dedup();

        assert_eq!(numbers.len(), 12);
        let transactions = db.transactions().list().await.unwrap();
        assert_eq!(transactions.len(), 12);
        assert!(transactions.iter().all(|t| t.items.len() == 2));
    }
}
