//! # Storage Errors
//!
//! ```text
//! sqlx::Error ─┐
//!              ├──► DbError ──kind()──► Validation │ NotFound │ Conflict │ Storage
//! ValidationError ┘                                                        │
//!                                                   apps/api logs these ◄──┘
//! ```
//!
//! Domain outcomes (`AlreadyInvoiced`, `CustomerInUse`) are ordinary variants
//! so callers can match on them; everything SQLite reports that the
//! repositories do not anticipate collapses into a Storage-kind variant.

use thiserror::Error;
use wako_core::{CoreError, ValidationError};

/// Caller-facing category of a [`DbError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input; never retried.
    Validation,
    /// Unknown po_number, customer id or counter.
    NotFound,
    /// Duplicate issuance, customer still referenced, unique key clash.
    Conflict,
    /// The unit of work could not complete and was rolled back.
    Storage,
}

#[derive(Debug, Error)]
pub enum DbError {
    /// Unknown po_number, customer, user, or an unseeded counter.
    #[error("{entity} '{id}' does not exist")]
    NotFound { entity: String, id: String },

    /// A UNIQUE column already holds this value (usernames, codes).
    #[error("{field} '{value}' is already taken")]
    UniqueViolation { field: String, value: String },

    /// The order already has an invoice; the stored number is carried back
    /// unchanged.
    #[error("Purchase order {po_number} is already invoiced as {invoice_number}")]
    AlreadyInvoiced {
        po_number: String,
        invoice_number: String,
    },

    /// Purchase orders still reference the customer.
    #[error("Customer {customer_id} has {orders} purchase order(s) and cannot be deleted")]
    CustomerInUse { customer_id: i64, orders: i64 },

    /// Rejected before anything was written.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A FOREIGN KEY or CHECK constraint refused the write.
    #[error("Constraint violated: {0}")]
    Constraint(String),

    /// The database could not be opened, or the pool is closed or saturated.
    #[error("Database unavailable: {0}")]
    Unavailable(String),

    /// An embedded migration failed to apply.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// A unit of work found the row in an unexpected state and rolled back.
    #[error("Transaction aborted: {0}")]
    TransactionFailed(String),

    /// Any other statement failure reported by SQLite.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DbError::Validation(_) => ErrorKind::Validation,
            DbError::NotFound { .. } => ErrorKind::NotFound,
            DbError::UniqueViolation { .. }
            | DbError::AlreadyInvoiced { .. }
            | DbError::CustomerInUse { .. } => ErrorKind::Conflict,
            DbError::Constraint(_)
            | DbError::Unavailable(_)
            | DbError::Migration(_)
            | DbError::TransactionFailed(_)
            | DbError::QueryFailed(_)
            | DbError::Internal(_) => ErrorKind::Storage,
        }
    }
}

/// SQLite constraint messages look like `UNIQUE constraint failed: users.username`,
/// `FOREIGN KEY constraint failed`, `CHECK constraint failed: ...`.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Row", "?"),

            sqlx::Error::Database(db_err) => {
                let message = db_err.message();
                if let Some(column) = message.strip_prefix("UNIQUE constraint failed: ") {
                    DbError::duplicate(column, "?")
                } else if message.contains("constraint failed") {
                    DbError::Constraint(message.to_string())
                } else {
                    DbError::QueryFailed(message.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::Unavailable("timed out waiting for a connection".to_string()),
            sqlx::Error::PoolClosed => DbError::Unavailable("pool is closed".to_string()),
            sqlx::Error::Io(e) => DbError::Unavailable(e.to_string()),

            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::Migration(err.to_string())
    }
}

impl From<CoreError> for DbError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(v) => DbError::Validation(v),
            other => DbError::Internal(other.to_string()),
        }
    }
}

pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_outcomes_are_conflicts() {
        let issued = DbError::AlreadyInvoiced {
            po_number: "WK-240501-0001".to_string(),
            invoice_number: "INV-2405-0001".to_string(),
        };
        assert_eq!(issued.kind(), ErrorKind::Conflict);
        assert_eq!(
            issued.to_string(),
            "Purchase order WK-240501-0001 is already invoiced as INV-2405-0001"
        );

        let in_use = DbError::CustomerInUse {
            customer_id: 1,
            orders: 2,
        };
        assert_eq!(in_use.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn test_validation_and_lookup_kinds() {
        let err = DbError::from(ValidationError::Required {
            field: "items".to_string(),
        });
        assert_eq!(err.kind(), ErrorKind::Validation);

        assert_eq!(
            DbError::not_found("Purchase order", "WK-1").kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            DbError::not_found("Customer", 9).to_string(),
            "Customer '9' does not exist"
        );
    }

    #[test]
    fn test_pool_errors_are_storage() {
        let err: DbError = sqlx::Error::PoolClosed.into();
        assert!(matches!(err, DbError::Unavailable(_)));
        assert_eq!(err.kind(), ErrorKind::Storage);

        let err: DbError = sqlx::Error::RowNotFound.into();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_core_overflow_is_internal() {
        let err: DbError = CoreError::AmountOverflow {
            what: "line total".to_string(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Storage);
    }
}
