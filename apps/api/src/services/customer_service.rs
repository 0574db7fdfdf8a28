//! Customer CRUD handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use wako_core::{Customer, NewCustomer};

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::extract::ApiJson;
use crate::state::AppState;

/// `GET /api/customers`
pub async fn list_customers(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
) -> ApiResult<Json<Vec<Customer>>> {
    let customers = state.db.customers().list().await?;
    Ok(Json(customers))
}

/// `GET /api/customers/{id}`
pub async fn get_customer(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Customer>> {
    let customer = state.db.customers().get(id).await?;
    Ok(Json(customer))
}

/// `POST /api/customers`
pub async fn create_customer(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    ApiJson(input): ApiJson<NewCustomer>,
) -> ApiResult<(StatusCode, Json<Customer>)> {
    let customer = state.db.customers().create(&input).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

/// `PUT /api/customers/{id}`
pub async fn update_customer(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Path(id): Path<i64>,
    ApiJson(input): ApiJson<NewCustomer>,
) -> ApiResult<Json<Customer>> {
    let customer = state.db.customers().update(id, &input).await?;
    Ok(Json(customer))
}

/// `DELETE /api/customers/{id}`
pub async fn delete_customer(
    State(state): State<Arc<AppState>>,
    _auth: AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.db.customers().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
