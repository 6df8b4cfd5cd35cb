//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service and its
//! mapping onto HTTP responses. Every failure yields a JSON body of the
//! shape `{"message": ..., "error": ...}`; the `error` field carries
//! diagnostic detail only outside production, while the server side always
//! logs the full picture.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::sync::OnceLock;
use tracing::error;

use crate::config::{ConfigError, Environment};
use newswatcher_core::mutator::MutateError;
use newswatcher_core::ports::StoreError;
use newswatcher_core::session::AuthError;

/// Error-detail policy, set once at startup and read-only thereafter.
/// Defaults to the production policy when never installed.
static DETAIL_POLICY: OnceLock<Environment> = OnceLock::new();

/// Install the environment that governs whether response bodies carry
/// diagnostic detail. Called once from `main`.
pub fn install_detail_policy(environment: Environment) {
    let _ = DETAIL_POLICY.set(environment);
}

fn detail_enabled() -> bool {
    matches!(
        DETAIL_POLICY.get().copied(),
        Some(Environment::Development)
    )
}

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A request body or parameter failed boundary validation.
    #[error("{0}")]
    Validation(String),

    /// The request could not be authenticated or authorized.
    #[error("{0}")]
    Auth(#[from] AuthError),

    /// A login presented an unknown email or a wrong password. The two are
    /// indistinguishable to the caller.
    #[error("Invalid email or password")]
    BadCredentials,

    /// A store-level failure propagated up through a port.
    #[error("{0}")]
    Store(#[from] StoreError),

    /// A mutation was rejected by the conditional-update protocol.
    #[error("{0}")]
    Mutate(MutateError),

    /// The requested resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl From<MutateError> for ApiError {
    fn from(err: MutateError) -> Self {
        match err {
            // Store failures keep their own status mapping.
            MutateError::Store(e) => ApiError::Store(e),
            other => ApiError::Mutate(other),
        }
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Auth(_) | ApiError::BadCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Store(StoreError::DuplicateKey) => StatusCode::FORBIDDEN,
            // A failed acknowledgment or unreachable store mid-mutation is
            // reported as contention, matching the conditional-update
            // semantics: the outcome is unknown, not definitively failed.
            ApiError::Store(StoreError::Unavailable(_)) => StatusCode::CONFLICT,
            ApiError::Store(StoreError::Unexpected(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Mutate(MutateError::SaveRejected) => StatusCode::FORBIDDEN,
            ApiError::Mutate(MutateError::NotFound) => StatusCode::NOT_FOUND,
            ApiError::Mutate(MutateError::Store(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Config(_) | ApiError::Io(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("request failed: {:?}", self);
        }
        let detail = if detail_enabled() {
            json!(format!("{:?}", self))
        } else {
            json!({})
        };
        let body = json!({
            "message": self.to_string(),
            "error": detail,
        });
        (status, Json(body)).into_response()
    }
}
