//! # Schema Migrations
//!
//! The schema ships inside the binary (`migrations/sqlite/*.sql`, embedded
//! by `sqlx::migrate!`). sqlx records applied files in `_sqlx_migrations`
//! and skips them on the next start.
//!
//! ```text
//! 001_initial_schema.sql
//!   customers ◄── purchase_orders ◄── transaction_items (ON DELETE CASCADE)
//!   sequence_numbers: ('po_number', 0), ('invoice_number', 0)
//!   users
//! ```
//!
//! Applied files are never edited; schema changes go in a new numbered file.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Embedded versus applied migration counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationStatus {
    pub embedded: usize,
    pub applied: usize,
}

impl MigrationStatus {
    pub fn is_current(&self) -> bool {
        self.applied >= self.embedded
    }
}

/// Applies every embedded migration not yet recorded, each in its own
/// transaction.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    debug!(embedded = MIGRATOR.migrations.len(), "Applying migrations");
    MIGRATOR.run(pool).await?;
    info!("Schema up to date");
    Ok(())
}

/// Reads how far the database is migrated.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<MigrationStatus> {
    let applied: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await?;

    Ok(MigrationStatus {
        embedded: MIGRATOR.migrations.len(),
        applied: usize::try_from(applied).unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_rerun_is_noop() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.run_migrations().await.unwrap();

        let status = migration_status(db.pool()).await.unwrap();
        assert!(status.is_current());
        assert_eq!(status.embedded, status.applied);
    }

    #[tokio::test]
    async fn test_schema_rejects_mismatched_line_total() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        sqlx::query("INSERT INTO customers (contact_name) VALUES ('Budi')")
            .execute(db.pool())
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO purchase_orders (po_number, date, customer_id) \
             VALUES ('WK-240501-0001', '2024-05-01T03:00:00Z', 1)",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let result = sqlx::query(
            "INSERT INTO transaction_items \
             (po_id, item_name, unit_price_cents, quantity, total_price_cents) \
             VALUES (1, 'Banner', 100, 3, 301)",
        )
        .execute(db.pool())
        .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_schema_rejects_half_invoice() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let result = sqlx::query(
            "INSERT INTO purchase_orders (po_number, date, invoice_number) \
             VALUES ('WK-240501-0001', '2024-05-01T03:00:00Z', 'INV-2405-0001')",
        )
        .execute(db.pool())
        .await;

        assert!(result.is_err());
    }
}
