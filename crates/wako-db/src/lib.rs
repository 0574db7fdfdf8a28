//! # wako-db: Database Layer for the Wako Back Office
//!
//! This crate provides database access for the back office.
//! It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Back Office Data Flow                            │
//! │                                                                         │
//! │  HTTP handler (POST /api/transactions)                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     wako-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌─────────────────┐   ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories   │   │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                 │   │  (embedded)  │  │   │
//! │  │   │               │    │ CustomerRepo    │   │              │  │   │
//! │  │   │ SqlitePool    │◄───│ SequenceRepo    │   │ 001_initial  │  │   │
//! │  │   │ local offset  │    │ TransactionRepo │   │   _schema    │  │   │
//! │  │   │               │    │ UserRepo        │   │              │  │   │
//! │  │   └───────────────┘    └─────────────────┘   └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (WAL)                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wako_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./wako.db")).await?;
//!
//! let created = db.transactions().create(&order).await?;
//! let issued = db.transactions().issue_invoice(&created.po_number).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, ErrorKind};
pub use pool::{Database, DbConfig, DEFAULT_UTC_OFFSET_SECS};

// Repository re-exports for convenience
pub use repository::customer::CustomerRepository;
pub use repository::sequence::SequenceRepository;
pub use repository::transaction::TransactionRepository;
pub use repository::user::{StoredUser, UserRepository};
