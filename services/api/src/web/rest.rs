//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification, plus the JSON
//! fallback for unmatched routes.

use axum::response::IntoResponse;
use utoipa::OpenApi;

use crate::error::ApiError;
use crate::web::session::{LoginRequest, LoginResponse, LogoutResponse};
use crate::web::users::{MsgResponse, RegisterRequest, RegisterResponse, SaveStoryRequest};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::users::register_handler,
        crate::web::users::profile_handler,
        crate::web::users::save_story_handler,
        crate::web::users::remove_story_handler,
        crate::web::users::delete_account_handler,
        crate::web::session::login_handler,
        crate::web::session::logout_handler,
    ),
    components(
        schemas(
            RegisterRequest,
            RegisterResponse,
            SaveStoryRequest,
            MsgResponse,
            LoginRequest,
            LoginResponse,
            LogoutResponse,
        )
    ),
    tags(
        (name = "NewsWatcher API", description = "Accounts, sessions and saved-story curation.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Fallback
//=========================================================================================

/// Catches everything no route matched and returns the JSON 404 body every
/// other failure uses.
pub async fn fallback_handler() -> impl IntoResponse {
    ApiError::NotFound("Not found".to_string())
}
