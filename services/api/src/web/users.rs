//! services/api/src/web/users.rs
//!
//! Account endpoints: registration, profile fetch, saved-story curation and
//! account deletion. Every identity-scoped handler runs the request gate
//! before touching the store, and every mutation goes through the
//! conditional-update engine rather than a read-then-write pair.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::validate;
use crate::web::middleware::PresentedToken;
use crate::web::state::AppState;
use newswatcher_core::domain::{NewAccount, StoryRef, UserId};
use newswatcher_core::mutator::DeleteOutcome;
use newswatcher_core::ports::StoreError;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub display_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub email: String,
    pub display_name: String,
}

/// The story payload a save request carries. Mirrors the stored story
/// shape; kept separate so the boundary contract can move independently of
/// the document format.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveStoryRequest {
    #[serde(rename = "storyID")]
    pub story_id: String,
    pub title: String,
    pub source: String,
    pub link: String,
    pub image_url: String,
    pub content_snippet: String,
    pub date: i64,
    #[serde(default)]
    pub hours: Option<String>,
    pub keep: bool,
}

impl From<SaveStoryRequest> for StoryRef {
    fn from(req: SaveStoryRequest) -> Self {
        StoryRef {
            story_id: req.story_id,
            title: req.title,
            source: req.source,
            link: req.link,
            image_url: req.image_url,
            content_snippet: req.content_snippet,
            date: req.date,
            hours: req.hours,
            keep: req.keep,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct MsgResponse {
    pub msg: String,
}

/// Cache-prevention headers for responses carrying account data.
fn no_store_headers() -> [(header::HeaderName, &'static str); 3] {
    [
        (
            header::CACHE_CONTROL,
            "no-cache, no-store, must-revalidate",
        ),
        (header::PRAGMA, "no-cache"),
        (header::EXPIRES, "0"),
    ]
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/users - Register a new account
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = RegisterResponse),
        (status = 400, description = "Validation failure"),
        (status = 403, description = "Email already registered"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<serde_json::Value>,
) -> Result<impl IntoResponse, ApiError> {
    // 1. Validate the payload before anything touches the store.
    let req: RegisterRequest = serde_json::from_value(body)
        .map_err(|e| ApiError::Validation(format!("Invalid registration payload: {}", e)))?;
    validate::registration(&req)?;

    // 2. Lookup-then-insert guard for email uniqueness. The store's own
    // unique index closes the race window this check leaves open.
    if state.store.find_by_email(&req.email).await?.is_some() {
        return Err(ApiError::Store(StoreError::DuplicateKey));
    }

    // 3. Hash the password
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            ApiError::Internal("Failed to hash password".to_string())
        })?
        .to_string();

    // 4. Create the account with its default settings and seeded filter.
    let created = state
        .store
        .insert(NewAccount {
            email: req.email,
            display_name: req.display_name,
            password_hash,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id: created.id.0,
            email: created.email,
            display_name: created.display_name,
        }),
    ))
}

/// GET /api/users/{id} - Fetch the account profile
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "The account to fetch")),
    responses(
        (status = 200, description = "The profile projection"),
        (status = 401, description = "Missing, invalid or mismatched token"),
        (status = 404, description = "Account no longer exists")
    )
)]
pub async fn profile_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<UserId>,
    Extension(PresentedToken(token)): Extension<PresentedToken>,
) -> Result<impl IntoResponse, ApiError> {
    let subject = state.gate.authorize(id, &token)?;
    let profile = state.mutator.fetch_profile(subject).await?;
    // The payload contains account data; keep it out of shared caches.
    Ok((no_store_headers(), Json(profile)))
}

/// POST /api/users/{id}/savedstories - Save a story
///
/// Responds with the pre-update saved-story snapshot. A 403 covers both
/// rejection causes (already saved, folder at capacity); the server cannot
/// tell them apart without a second read, and clients that care re-fetch
/// the profile.
#[utoipa::path(
    post,
    path = "/api/users/{id}/savedstories",
    params(("id" = Uuid, Path, description = "The account saving the story")),
    responses(
        (status = 200, description = "Saved; body is the pre-update snapshot"),
        (status = 400, description = "Validation failure"),
        (status = 401, description = "Missing, invalid or mismatched token"),
        (status = 403, description = "Duplicate story or folder at capacity"),
        (status = 409, description = "Store-level conflict")
    )
)]
pub async fn save_story_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<UserId>,
    Extension(PresentedToken(token)): Extension<PresentedToken>,
    Json(body): Json<serde_json::Value>,
) -> Result<impl IntoResponse, ApiError> {
    let subject = state.gate.authorize(id, &token)?;
    let req: SaveStoryRequest = serde_json::from_value(body)
        .map_err(|e| ApiError::Validation(format!("Invalid story payload: {}", e)))?;
    validate::story(&req)?;

    let before = state
        .mutator
        .add_saved_story(subject, StoryRef::from(req))
        .await?;
    Ok(Json(before.profile()))
}

/// DELETE /api/users/{id}/savedstories/{sid} - Remove a saved story
///
/// Removal is idempotent; removing a story that is not in the folder is a
/// successful no-op. Responds with the pre-update snapshot.
#[utoipa::path(
    delete,
    path = "/api/users/{id}/savedstories/{sid}",
    params(
        ("id" = Uuid, Path, description = "The account"),
        ("sid" = String, Path, description = "The story to remove")
    ),
    responses(
        (status = 200, description = "Removed; body is the pre-update snapshot"),
        (status = 401, description = "Missing, invalid or mismatched token"),
        (status = 409, description = "Store-level conflict")
    )
)]
pub async fn remove_story_handler(
    State(state): State<Arc<AppState>>,
    Path((id, sid)): Path<(UserId, String)>,
    Extension(PresentedToken(token)): Extension<PresentedToken>,
) -> Result<impl IntoResponse, ApiError> {
    let subject = state.gate.authorize(id, &token)?;
    let before = state.mutator.remove_saved_story(subject, &sid).await?;
    Ok(Json(before.profile()))
}

/// DELETE /api/users/{id} - Delete the account
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "The account to delete")),
    responses(
        (status = 200, description = "Deleted, or already deleted", body = MsgResponse),
        (status = 401, description = "Missing, invalid or mismatched token"),
        (status = 409, description = "Store-level conflict")
    )
)]
pub async fn delete_account_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<UserId>,
    Extension(PresentedToken(token)): Extension<PresentedToken>,
) -> Result<impl IntoResponse, ApiError> {
    let subject = state.gate.authorize(id, &token)?;
    let msg = match state.mutator.delete_account(subject).await? {
        DeleteOutcome::Deleted => "User Deleted",
        // A racing second delete is reported, not failed.
        DeleteOutcome::AlreadyDeleted => "Account already deleted",
    };
    Ok(Json(MsgResponse {
        msg: msg.to_string(),
    }))
}
