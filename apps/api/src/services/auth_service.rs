//! Registration, login and the current-user lookup.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use wako_core::validation::{validate_password, validate_username};
use wako_core::User;

use crate::auth::{hash_password_blocking, verify_password_blocking, AuthUser};
use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::state::AppState;

const BAD_CREDENTIALS: &str = "Invalid username or password";

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: User,
}

/// `POST /api/register`
pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    validate_username(&req.username)?;
    validate_password(&req.password)?;

    let password_hash = hash_password_blocking(req.password).await?;
    let user = state
        .db
        .users()
        .create(&req.username, &password_hash, req.email.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// `POST /api/login`
///
/// Unknown users and wrong passwords get the same answer.
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let stored = state.db.users().find_by_username(req.username.trim()).await?;

    let verified = match &stored {
        Some(stored) => {
            verify_password_blocking(req.password, stored.password_hash.clone()).await?
        }
        None => false,
    };

    let stored = match stored {
        Some(stored) if verified => stored,
        _ => {
            warn!(username = %req.username.trim(), "Login rejected");
            return Err(ApiError::unauthenticated(BAD_CREDENTIALS));
        }
    };

    let token = state
        .jwt
        .generate_token(stored.user.id, &stored.user.username)?;
    info!(user_id = stored.user.id, "User logged in");

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer",
        expires_in: state.jwt.lifetime_secs(),
        user: stored.user,
    }))
}

/// `GET /api/me`
pub async fn me(State(state): State<Arc<AppState>>, auth: AuthUser) -> ApiResult<Json<User>> {
    let user = state
        .db
        .users()
        .get_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User", auth.user_id))?;

    Ok(Json(user))
}
