pub mod middleware;
pub mod rest;
pub mod session;
pub mod state;
pub mod users;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};

use crate::web::state::AppState;

pub use middleware::require_auth;

/// Build the API router: public registration and login, then the
/// identity-scoped routes behind the token-presence middleware.
///
/// Shared between the server binary and the integration tests so both drive
/// exactly the same stack.
pub fn api_router(state: Arc<AppState>) -> Router {
    let public_routes = Router::new()
        .route("/api/users", post(users::register_handler))
        .route("/api/sessions", post(session::login_handler));

    let protected_routes = Router::new()
        .route(
            "/api/users/{id}",
            get(users::profile_handler).delete(users::delete_account_handler),
        )
        .route(
            "/api/users/{id}/savedstories",
            post(users::save_story_handler),
        )
        .route(
            "/api/users/{id}/savedstories/{sid}",
            delete(users::remove_story_handler),
        )
        .route("/api/sessions/{id}", delete(session::logout_handler))
        .layer(axum_middleware::from_fn(require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .fallback(rest::fallback_handler)
        .layer(DefaultBodyLimit::max(64 * 1024))
        .with_state(state)
}
