//! services/api/src/web/session.rs
//!
//! Session endpoints: login issues a signed token, logout is the
//! client-side discard of one.

use argon2::{
    password_hash::{PasswordHash, PasswordVerifier},
    Argon2,
};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::middleware::PresentedToken;
use crate::web::state::AppState;
use newswatcher_core::domain::UserId;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user_id: Uuid,
    pub display_name: String,
    pub msg: String,
}

#[derive(Serialize, ToSchema)]
pub struct LogoutResponse {
    pub msg: String,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/sessions - Login and receive a session token
#[utoipa::path(
    post,
    path = "/api/sessions",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // 1. Look up the account; an unknown email reads the same as a wrong
    // password to the caller.
    let account = state
        .store
        .find_by_email(&req.email)
        .await?
        .ok_or(ApiError::BadCredentials)?;

    // 2. Verify the password against the stored argon2 hash.
    let parsed_hash = PasswordHash::new(&account.password_hash).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        ApiError::Internal("Authentication error".to_string())
    })?;
    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::BadCredentials)?;

    // 3. Issue the self-contained token; nothing is persisted.
    let token = state.sessions.issue(account.id);
    info!("session issued for user {}", account.id);

    Ok(Json(LoginResponse {
        token,
        user_id: account.id.0,
        display_name: account.display_name,
        msg: "Authorized".to_string(),
    }))
}

/// DELETE /api/sessions/{id} - Logout
///
/// Tokens are stateless, so logout enforces nothing server-side; the client
/// discards its copy and expiry does the rest. The gate still runs so a
/// logout for someone else's id fails like any other mismatched request.
#[utoipa::path(
    delete,
    path = "/api/sessions/{id}",
    params(("id" = Uuid, Path, description = "The account logging out")),
    responses(
        (status = 200, description = "Logout acknowledged", body = LogoutResponse),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<UserId>,
    Extension(PresentedToken(token)): Extension<PresentedToken>,
) -> Result<impl IntoResponse, ApiError> {
    let subject = state.gate.authorize(id, &token)?;
    state.sessions.revoke(subject);
    Ok(Json(LogoutResponse {
        msg: "Logged out".to_string(),
    }))
}
