//! Shared application state.

use std::sync::Arc;

use wako_core::InvoiceRenderer;
use wako_db::Database;

use crate::auth::JwtManager;

/// State shared by all handlers behind an `Arc`.
pub struct AppState {
    pub db: Database,
    pub jwt: JwtManager,
    pub renderer: Arc<dyn InvoiceRenderer>,
}

impl AppState {
    pub fn new(db: Database, jwt: JwtManager, renderer: Arc<dyn InvoiceRenderer>) -> Self {
        AppState { db, jwt, renderer }
    }
}
