//! # Wako API
//!
//! HTTP server for the printing-shop back office.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                            API Services                                 │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  auth_service  │  │customer_service│  │  transaction_service       ││
//! │  │                │  │                │  │                            ││
//! │  │ • register     │  │ • list / get   │  │ • list / get               ││
//! │  │ • login        │  │ • create       │  │ • create (WK- code)        ││
//! │  │ • me           │  │ • update/delete│  │                            ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐                                │
//! │  │invoice_service │  │ health_service │                                │
//! │  │                │  │                │                                │
//! │  │ • issue (INV-) │  │ • /health      │                                │
//! │  │ • download PDF │  │                │                                │
//! │  └────────────────┘  └────────────────┘                                │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Infrastructure: SQLite (wako-db) · JWT + argon2 · printpdf      │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables (a `.env` file is honoured):
//! - `HTTP_PORT` - Listen port (default: 3000)
//! - `DATABASE_PATH` - SQLite file (default: ./wako.db)
//! - `JWT_SECRET` - Token signing secret
//! - `UTC_OFFSET_HOURS` - Shop-local offset for code dates (default: 7)
//! - `BUSINESS_*`, `BANK_*` - Seller details printed on invoices

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod services;
pub mod state;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use services::{
    auth_service, customer_service, health_service, invoice_service, transaction_service,
};
use state::AppState;

/// Builds the full router over shared state.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_service::health_handler))
        .route("/api/register", post(auth_service::register))
        .route("/api/login", post(auth_service::login))
        .route("/api/me", get(auth_service::me))
        .route(
            "/api/customers",
            get(customer_service::list_customers).post(customer_service::create_customer),
        )
        .route(
            "/api/customers/{id}",
            get(customer_service::get_customer)
                .put(customer_service::update_customer)
                .delete(customer_service::delete_customer),
        )
        .route(
            "/api/transactions",
            get(transaction_service::list_transactions)
                .post(transaction_service::create_transaction),
        )
        .route(
            "/api/transactions/{po_number}",
            get(transaction_service::get_transaction),
        )
        .route(
            "/api/transactions/{po_number}/invoice",
            post(invoice_service::issue_invoice),
        )
        .route(
            "/api/transactions/{po_number}/invoice/download",
            get(invoice_service::download_invoice),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// =============================================================================
// Router Tests
// =============================================================================
