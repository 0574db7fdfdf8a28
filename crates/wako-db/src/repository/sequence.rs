//! # Sequence Repository
//!
//! Atomic allocation from the named counters in `sequence_numbers`.
//!
//! ## Allocation
//! ```text
//! BEGIN
//!   UPDATE sequence_numbers
//!      SET last_number = last_number + 1
//!    WHERE id = 'po_number'
//!   RETURNING last_number            ◄── takes SQLite's write lock first
//!   ... caller's other writes ...
//! COMMIT                             ◄── or ROLLBACK: increment disappears
//! ```
//!
//! Increment and read happen in one statement, and it is the first statement
//! of the unit of work, so two callers can never observe the same value. A
//! rolled-back unit of work leaves the counter untouched.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use wako_core::numbering::pad_sequence;
use wako_core::SequenceName;

/// Repository for sequence counters.
#[derive(Debug, Clone)]
pub struct SequenceRepository {
    pool: SqlitePool,
}

impl SequenceRepository {
    /// Creates a new SequenceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SequenceRepository { pool }
    }

    /// Allocates the next number of `name` in its own unit of work.
    ///
    /// Returns the number zero-padded to four digits (`7 → "0007"`); larger
    /// numbers keep all their digits.
    ///
    /// ## Errors
    /// - [`DbError::NotFound`] if the counter row was never seeded
    /// - Storage errors roll the increment back
    pub async fn allocate(&self, name: SequenceName) -> DbResult<String> {
        let mut tx = self.pool.begin().await?;
        let next = next_value(&mut tx, name).await?;
        tx.commit().await?;

        Ok(pad_sequence(next))
    }

    /// Reads the last issued number without allocating.
    pub async fn current(&self, name: SequenceName) -> DbResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT last_number FROM sequence_numbers WHERE id = ?1")
            .bind(name.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Sequence counter", name))
    }

    /// Sets a counter to a given value.
    ///
    /// Only moves forward; a lower value is ignored.
    pub async fn advance_to(&self, name: SequenceName, value: i64) -> DbResult<i64> {
        debug!(counter = %name, value, "Advancing sequence counter");

        sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE sequence_numbers
            SET last_number = MAX(last_number, ?2)
            WHERE id = ?1
            RETURNING last_number
            "#,
        )
        .bind(name.as_str())
        .bind(value)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Sequence counter", name))
    }
}

/// Increments `name` on an open connection and returns the new value.
///
/// Meant to be the first statement of a transaction so the write lock is
/// held from the start; the increment commits or rolls back with it.
pub(crate) async fn next_value(conn: &mut SqliteConnection, name: SequenceName) -> DbResult<i64> {
    let next = sqlx::query_scalar::<_, i64>(
        r#"
        UPDATE sequence_numbers
        SET last_number = last_number + 1
        WHERE id = ?1
        RETURNING last_number
        "#,
    )
    .bind(name.as_str())
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| DbError::not_found("Sequence counter", name))?;

    debug!(counter = %name, next, "Allocated sequence number");
    Ok(next)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use std::collections::HashSet;

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_allocate_from_six_returns_0007() {
        let db = setup().await;
        db.sequences()
            .advance_to(SequenceName::PoNumber, 6)
            .await
            .unwrap();

        let next = db.sequences().allocate(SequenceName::PoNumber).await.unwrap();

        assert_eq!(next, "0007");
        assert_eq!(db.sequences().current(SequenceName::PoNumber).await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_counters_are_independent() {
        let db = setup().await;
        let seq = db.sequences();

        assert_eq!(seq.allocate(SequenceName::PoNumber).await.unwrap(), "0001");
        assert_eq!(seq.allocate(SequenceName::PoNumber).await.unwrap(), "0002");
        assert_eq!(seq.allocate(SequenceName::InvoiceNumber).await.unwrap(), "0001");
    }

    #[tokio::test]
    async fn test_padding_grows_past_four_digits() {
        let db = setup().await;
        db.sequences()
            .advance_to(SequenceName::InvoiceNumber, 9_999)
            .await
            .unwrap();

        let next = db
            .sequences()
            .allocate(SequenceName::InvoiceNumber)
            .await
            .unwrap();
        assert_eq!(next, "10000");
    }

    #[tokio::test]
    async fn test_missing_counter_is_not_found() {
        let db = setup().await;
        sqlx::query("DELETE FROM sequence_numbers WHERE id = 'po_number'")
            .execute(db.pool())
            .await
            .unwrap();

        let result = db.sequences().allocate(SequenceName::PoNumber).await;
        assert!(matches!(result, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_rolled_back_allocation_is_invisible() {
        let db = setup().await;

        let mut tx = db.pool().begin().await.unwrap();
        assert_eq!(next_value(&mut tx, SequenceName::PoNumber).await.unwrap(), 1);
        tx.rollback().await.unwrap();

        assert_eq!(db.sequences().current(SequenceName::PoNumber).await.unwrap(), 0);
        assert_eq!(
            db.sequences().allocate(SequenceName::PoNumber).await.unwrap(),
            "0001"
        );
    }

    #[tokio::test]
    async fn test_concurrent_allocations_never_repeat() {
        let dir = tempfile::tempdir().unwrap();
        let config = DbConfig::new(dir.path().join("wako.db")).max_connections(8);
        let db = Database::new(config).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let seq = db.sequences();
            handles.push(tokio::spawn(async move {
                let mut issued = Vec::new();
                for _ in 0..10 {
                    let n = seq.allocate(SequenceName::PoNumber).await.unwrap();
                    issued.push(n.parse::<i64>().unwrap());
                }
                issued
            }));
        }

        let mut all = Vec::new();
        for handle in handles {
            let issued = handle.await.unwrap();
            // Each caller sees strictly increasing values.
            assert!(issued.windows(2).all(|w| w[0] < w[1]));
            all.extend(issued);
        }

        let unique: HashSet<_> = all.iter().copied().collect();
        assert_eq!(unique.len(), 80);
        assert_eq!(all.iter().max(), Some(&80));
        assert_eq!(db.sequences().current(SequenceName::PoNumber).await.unwrap(), 80);
    }
}
