//! # Repository Module
//!
//! Database repository implementations for the back office.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  HTTP handler                                                           │
//! │       │                                                                 │
//! │       │  db.transactions().issue_invoice("WK-240501-0007")              │
//! │       ▼                                                                 │
//! │  TransactionRepository                                                  │
//! │  ├── create(&self, order)          order + items, all or nothing        │
//! │  ├── list(&self)                   joined rows → Transaction            │
//! │  ├── get(&self, po_number)                                              │
//! │  └── issue_invoice(&self, po_number)                                    │
//! │       │                                                                 │
//! │       │  SQL                                                            │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CustomerRepository`](customer::CustomerRepository) - Customer CRUD
//! - [`SequenceRepository`](sequence::SequenceRepository) - Named counters
//! - [`TransactionRepository`](transaction::TransactionRepository) - Orders, items, invoices
//! - [`UserRepository`](user::UserRepository) - Accounts

pub mod customer;
pub mod sequence;
pub mod transaction;
pub mod user;
