//! Invoice issuance and download.
//!
//! ```text
//! POST /invoice            issue_invoice ──► 201 { invoice_number, ... }
//!                                       └──► 409 + existing number if already invoiced
//!
//! GET  /invoice/download   get ──► unbilled? issue ──► reload
//!                              ──► InvoiceDocument ──► renderer (blocking pool)
//!                              ──► application/pdf attachment
//! ```

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{debug, info};
use wako_core::{InvoiceDocument, IssuedInvoice, Transaction};
use wako_db::DbError;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// `POST /api/transactions/{po_number}/invoice`
pub async fn issue_invoice(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(po_number): Path<String>,
) -> ApiResult<(StatusCode, Json<IssuedInvoice>)> {
    let issued = state.db.transactions().issue_invoice(&po_number).await?;
    info!(
        po_number = %issued.po_number,
        invoice_number = %issued.invoice_number,
        user = %auth.username,
        "Invoice issued via API"
    );
    Ok((StatusCode::CREATED, Json(issued)))
}

/// `GET /api/transactions/{po_number}/invoice/download`
pub async fn download_invoice(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Path(po_number): Path<String>,
) -> ApiResult<Response> {
    let transaction = invoiced_transaction(&state, &po_number).await?;
    let document = InvoiceDocument::from_transaction(&transaction)?;
    let file_name = document.file_name();

    let renderer = Arc::clone(&state.renderer);
    let bytes = tokio::task::spawn_blocking(move || renderer.render(&document))
        .await
        .map_err(|e| ApiError::internal(format!("Render task failed: {}", e)))??;

    debug!(%po_number, size = bytes.len(), "Invoice rendered");

    Ok((
        [
            (CONTENT_TYPE, "application/pdf".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename={}", file_name),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// Loads the transaction, issuing its invoice first when it has none.
///
/// A concurrent issuer winning the race is fine: the reload picks up
/// whatever number was stored.
async fn invoiced_transaction(state: &AppState, po_number: &str) -> Result<Transaction, ApiError> {
    let transactions = state.db.transactions();
    let transaction = transactions.get(po_number).await?;

    if transaction.invoice_state().is_invoiced() {
        return Ok(transaction);
    }

    match transactions.issue_invoice(po_number).await {
        Ok(_) | Err(DbError::AlreadyInvoiced { .. }) => {}
        Err(e) => return Err(e.into()),
    }

    Ok(transactions.get(po_number).await?)
}
