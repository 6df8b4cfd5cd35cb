//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting identity-scoped routes.

use axum::{extract::Request, middleware::Next, response::Response};

use crate::error::ApiError;
use newswatcher_core::session::AuthError;

/// The header clients present their session token on.
pub const AUTH_HEADER: &str = "x-auth";

/// The raw token a request presented, stashed for the handler's
/// authorization check.
#[derive(Clone)]
pub struct PresentedToken(pub String);

/// Middleware that requires a session token to be present.
///
/// It only extracts the opaque header value; verification happens in the
/// request gate together with the claimed identity, so every protected
/// handler performs exactly one signature check bound to its path id.
/// A missing header is rejected here with 401 before any handler runs.
pub async fn require_auth(mut req: Request, next: Next) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(AUTH_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Auth(AuthError::Malformed))?
        .to_string();

    req.extensions_mut().insert(PresentedToken(token));
    Ok(next.run(req).await)
}
