//! Purchase order handlers.
//!
//! Request bodies carry `unit_price` as a JSON number or a decimal string.
//! Either form goes through [`Money::parse`], so prices are converted to sen
//! exactly and never touch floating point arithmetic.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use wako_core::validation::validate_consignment;
use wako_core::{
    CreatedTransaction, Money, NewTransaction, NewTransactionItem, Transaction, ValidationError,
};

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::state::AppState;

/// Price as sent by the client.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PriceInput {
    Number(serde_json::Number),
    Text(String),
}

impl PriceInput {
    pub fn to_money(&self) -> Result<Money, ValidationError> {
        match self {
            PriceInput::Number(n) => Money::parse(&n.to_string()),
            PriceInput::Text(s) => Money::parse(s),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemRequest {
    pub item_name: String,
    pub unit_price: PriceInput,
    pub quantity: i64,
    #[serde(default)]
    pub consignment_name: Option<String>,
    #[serde(default)]
    pub consignment_qty: Option<i64>,
}

impl ItemRequest {
    fn into_new_item(self) -> Result<NewTransactionItem, ValidationError> {
        let unit_price = self.unit_price.to_money()?;
        let consignment =
            validate_consignment(self.consignment_name.as_deref(), self.consignment_qty)?;

        Ok(NewTransactionItem {
            item_name: self.item_name,
            unit_price,
            quantity: self.quantity,
            consignment,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTransactionRequest {
    pub customer_id: i64,
    #[serde(default)]
    pub items: Vec<ItemRequest>,
}

impl CreateTransactionRequest {
    pub fn into_new_transaction(self) -> Result<NewTransaction, ValidationError> {
        let items = self
            .items
            .into_iter()
            .map(ItemRequest::into_new_item)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(NewTransaction {
            customer_id: self.customer_id,
            items,
        })
    }
}

/// `GET /api/transactions`
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
) -> ApiResult<Json<Vec<Transaction>>> {
    let transactions = state.db.transactions().list().await?;
    Ok(Json(transactions))
}

/// `GET /api/transactions/{po_number}`
pub async fn get_transaction(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Path(po_number): Path<String>,
) -> ApiResult<Json<Transaction>> {
    let transaction = state.db.transactions().get(&po_number).await?;
    Ok(Json(transaction))
}

/// `POST /api/transactions`
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    ApiJson(req): ApiJson<CreateTransactionRequest>,
) -> ApiResult<(StatusCode, Json<CreatedTransaction>)> {
    let input = req.into_new_transaction()?;
    let created = state.db.transactions().create(&input).await?;

    tracing::debug!(po_number = %created.po_number, user = %auth.username, "Order created via API");
    Ok((StatusCode::CREATED, Json(created)))
}
