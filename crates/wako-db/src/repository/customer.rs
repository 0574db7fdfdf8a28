//! # Customer Repository
//!
//! Database operations for customers.
//!
//! Customers are referenced by purchase orders through `customer_id`, so a
//! customer can only be deleted while no order points at it.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use wako_core::validation::validate_new_customer;
use wako_core::{Customer, NewCustomer};

const CUSTOMER_COLUMNS: &str = "id, company_name, contact_name, phone, created_at";

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Lists all customers ordered by company name, then contact name.
    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY company_name, contact_name, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Gets a customer by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Gets a customer by ID, failing with NotFound when absent.
    pub async fn get(&self, id: i64) -> DbResult<Customer> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }

    /// Creates a customer.
    ///
    /// Blank optional fields are stored as NULL.
    pub async fn create(&self, input: &NewCustomer) -> DbResult<Customer> {
        let input = input.normalized();
        validate_new_customer(&input)?;

        let customer = sqlx::query_as::<_, Customer>(&format!(
            r#"
            INSERT INTO customers (company_name, contact_name, phone, created_at)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING {CUSTOMER_COLUMNS}
            "#
        ))
        .bind(&input.company_name)
        .bind(&input.contact_name)
        .bind(&input.phone)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        info!(customer_id = customer.id, "Customer created");
        Ok(customer)
    }

    /// Replaces the editable fields of a customer.
    pub async fn update(&self, id: i64, input: &NewCustomer) -> DbResult<Customer> {
        let input = input.normalized();
        validate_new_customer(&input)?;

        debug!(customer_id = id, "Updating customer");

        let customer = sqlx::query_as::<_, Customer>(&format!(
            r#"
            UPDATE customers
            SET company_name = ?2, contact_name = ?3, phone = ?4
            WHERE id = ?1
            RETURNING {CUSTOMER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&input.company_name)
        .bind(&input.contact_name)
        .bind(&input.phone)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Customer", id))?;

        Ok(customer)
    }

    /// Deletes a customer that no purchase order references.
    ///
    /// The reference check and the delete are one statement, so an order
    /// created concurrently either lands first (delete refused) or fails its
    /// foreign key.
    ///
    /// ## Errors
    /// - [`DbError::NotFound`] if the customer does not exist
    /// - [`DbError::CustomerInUse`] if any order references it
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let deleted = sqlx::query(
            r#"
            DELETE FROM customers
            WHERE id = ?1
              AND NOT EXISTS (SELECT 1 FROM purchase_orders WHERE customer_id = ?1)
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if deleted == 1 {
            info!(customer_id = id, "Customer deleted");
            return Ok(());
        }

        if self.get_by_id(id).await?.is_none() {
            return Err(DbError::not_found("Customer", id));
        }

        let orders = self.order_count(id).await?;
        warn!(customer_id = id, orders, "Refusing to delete customer with orders");
        Err(DbError::CustomerInUse {
            customer_id: id,
            orders,
        })
    }

    /// Counts purchase orders referencing a customer.
    pub async fn order_count(&self, id: i64) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM purchase_orders WHERE customer_id = ?1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    /// Counts all customers.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use wako_core::{Money, NewTransaction, NewTransactionItem};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn customer(company: Option<&str>, contact: &str) -> NewCustomer {
        NewCustomer {
            company_name: company.map(str::to_string),
            contact_name: contact.to_string(),
            phone: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = setup().await;

        let created = db
            .customers()
            .create(&NewCustomer {
                company_name: Some("".to_string()),
                contact_name: " Budi ".to_string(),
                phone: Some("0812".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(created.contact_name, "Budi");
        assert_eq!(created.company_name, None);

        let fetched = db.customers().get(created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_contact_name_required() {
        let db = setup().await;

        let result = db.customers().create(&customer(Some("PT Maju"), "  ")).await;

        assert!(matches!(result, Err(DbError::Validation(_))));
        assert_eq!(db.customers().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_ordering() {
        let db = setup().await;
        let repo = db.customers();
        repo.create(&customer(Some("PT Zebra"), "Andi")).await.unwrap();
        repo.create(&customer(Some("CV Abadi"), "Sari")).await.unwrap();
        repo.create(&customer(Some("CV Abadi"), "Rudi")).await.unwrap();

        let names: Vec<_> = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.contact_name)
            .collect();

        assert_eq!(names, vec!["Rudi", "Sari", "Andi"]);
    }

    #[tokio::test]
    async fn test_update() {
        let db = setup().await;
        let created = db.customers().create(&customer(None, "Budi")).await.unwrap();

        let updated = db
            .customers()
            .update(created.id, &customer(Some("PT Maju"), "Budi Santoso"))
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.company_name.as_deref(), Some("PT Maju"));
        assert_eq!(updated.created_at, created.created_at);

        let missing = db.customers().update(999, &customer(None, "X")).await;
        assert!(matches!(missing, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_unreferenced_customer() {
        let db = setup().await;
        let created = db.customers().create(&customer(None, "Budi")).await.unwrap();

        db.customers().delete(created.id).await.unwrap();

        assert!(db.customers().get_by_id(created.id).await.unwrap().is_none());
        assert!(matches!(
            db.customers().delete(created.id).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_with_orders_is_conflict() {
        let db = setup().await;
        let created = db.customers().create(&customer(None, "Budi")).await.unwrap();
        db.transactions()
            .create(&NewTransaction {
                customer_id: created.id,
                items: vec![NewTransactionItem {
                    item_name: "Banner".to_string(),
                    unit_price: Money::from_rupiah(50_000),
                    quantity: 1,
                    consignment: None,
                }],
            })
            .await
            .unwrap();

        let result = db.customers().delete(created.id).await;

        assert!(matches!(
            result,
            Err(DbError::CustomerInUse { orders: 1, .. })
        ));
        assert!(db.customers().get_by_id(created.id).await.unwrap().is_some());
    }
}
