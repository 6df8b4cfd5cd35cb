//! services/api/tests/http_api.rs
//!
//! End-to-end tests driving the full router against the in-memory store.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use tracing::Level;

use api_lib::adapters::MemoryStore;
use api_lib::config::{Config, Environment};
use api_lib::web::{api_router, state::AppState};
use newswatcher_core::domain::{NewAccount, UserAccount, UserId};
use newswatcher_core::ports::{CredentialStore, Mutation, Predicate, StoreResult};

fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse::<SocketAddr>().unwrap(),
        database_url: None,
        log_level: Level::INFO,
        environment: Environment::Production,
        token_secret: "an integration test signing secret".to_string(),
        token_ttl_hours: 24,
        cors_origin: None,
    }
}

fn app() -> (Router, Arc<AppState>) {
    let store = Arc::new(MemoryStore::new());
    let state = Arc::new(AppState::new(store, Arc::new(test_config())));
    (api_router(state.clone()), state)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("x-auth", token);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn story(id: &str) -> Value {
    json!({
        "storyID": id,
        "title": format!("Story {}", id),
        "source": "NYT",
        "link": "https://example.com/story",
        "imageUrl": "https://example.com/story.png",
        "contentSnippet": "A snippet of the story body.",
        "date": 1_700_000_000_000i64,
        "keep": false,
    })
}

/// Register alice and log in, returning (user_id, token).
async fn register_and_login(app: &Router) -> (String, String) {
    let (status, body) = send(
        app,
        "POST",
        "/api/users",
        None,
        Some(json!({
            "displayName": "alice1",
            "email": "alice@x.com",
            "password": "abc123!",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let user_id = body["userId"].as_str().unwrap().to_string();

    let (status, body) = send(
        app,
        "POST",
        "/api/sessions",
        None,
        Some(json!({"email": "alice@x.com", "password": "abc123!"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userId"].as_str().unwrap(), user_id);
    let token = body["token"].as_str().unwrap().to_string();
    (user_id, token)
}

#[tokio::test]
async fn register_login_and_fetch_profile() {
    let (app, _) = app();
    let (user_id, token) = register_and_login(&app).await;

    let (status, profile) = send(
        &app,
        "GET",
        &format!("/api/users/{}", user_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["displayName"], "alice1");
    assert_eq!(profile["email"], "alice@x.com");
    assert_eq!(profile["savedStories"], json!([]));
    assert_eq!(profile["settings"]["requireWifi"], json!(true));
    assert_eq!(profile["newsFilters"][0]["name"], "Technology Companies");
    // The plaintext password and its hash never appear in any payload.
    let text = profile.to_string();
    assert!(!text.contains("abc123!"));
    assert!(!text.contains("passwordHash"));
}

#[tokio::test]
async fn profile_responses_forbid_caching() {
    let (app, _) = app();
    let (user_id, token) = register_and_login(&app).await;

    let request = Request::builder()
        .method("GET")
        .uri(format!("/api/users/{}", user_id))
        .header("x-auth", &token)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(
        headers.get(header::CACHE_CONTROL).unwrap(),
        "no-cache, no-store, must-revalidate"
    );
    assert_eq!(headers.get(header::PRAGMA).unwrap(), "no-cache");
    assert_eq!(headers.get(header::EXPIRES).unwrap(), "0");
}

#[tokio::test]
async fn registration_rejects_invalid_fields() {
    let (app, _) = app();
    for (display_name, email, password) in [
        ("al", "alice@x.com", "abc123!"),       // name too short
        ("alice1", "nope", "abc123!"),          // bad email
        ("alice1", "alice@x.com", "abcdefg"),   // no digit, no special
        ("alice1", "alice@x.com", "abc1234"),   // no special
    ] {
        let (status, body) = send(
            &app,
            "POST",
            "/api/users",
            None,
            Some(json!({
                "displayName": display_name,
                "email": email,
                "password": password,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("Invalid"));
    }
}

#[tokio::test]
async fn duplicate_email_registration_is_forbidden() {
    let (app, _) = app();
    register_and_login(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/users",
        None,
        Some(json!({
            "displayName": "alice2",
            "email": "Alice@X.com",
            "password": "abc123!",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Email account already registered");
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let (app, _) = app();
    register_and_login(&app).await;

    let (status, unknown) = send(
        &app,
        "POST",
        "/api/sessions",
        None,
        Some(json!({"email": "bob@x.com", "password": "abc123!"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, wrong) = send(
        &app,
        "POST",
        "/api/sessions",
        None,
        Some(json!({"email": "alice@x.com", "password": "wrong99!"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown["message"], wrong["message"]);
}

#[tokio::test]
async fn missing_or_invalid_tokens_yield_401() {
    let (app, _) = app();
    let (user_id, _token) = register_and_login(&app).await;
    let uri = format!("/api/users/{}", user_id);

    let (status, _) = send(&app, "GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", &uri, Some("not-a-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn saved_story_capacity_walk() {
    let (app, _) = app();
    let (user_id, token) = register_and_login(&app).await;
    let uri = format!("/api/users/{}/savedstories", user_id);

    for i in 0..30 {
        let (status, snapshot) =
            send(&app, "POST", &uri, Some(&token), Some(story(&format!("s-{}", i)))).await;
        assert_eq!(status, StatusCode::OK);
        // The response is the pre-update snapshot.
        assert_eq!(snapshot["savedStories"].as_array().unwrap().len(), i);
    }

    // The 31st distinct story is rejected.
    let (status, body) = send(&app, "POST", &uri, Some(&token), Some(story("s-31"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Over the save limit, or story already saved");

    // Removing any one story frees a slot for a new one.
    let (status, snapshot) = send(
        &app,
        "DELETE",
        &format!("{}/s-7", uri),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snapshot["savedStories"].as_array().unwrap().len(), 30);

    let (status, _) = send(&app, "POST", &uri, Some(&token), Some(story("s-31"))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, profile) = send(
        &app,
        "GET",
        &format!("/api/users/{}", user_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["savedStories"].as_array().unwrap().len(), 30);
}

#[tokio::test]
async fn duplicate_saves_are_rejected_without_changing_the_set() {
    let (app, _) = app();
    let (user_id, token) = register_and_login(&app).await;
    let uri = format!("/api/users/{}/savedstories", user_id);

    let (status, _) = send(&app, "POST", &uri, Some(&token), Some(story("same"))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "POST", &uri, Some(&token), Some(story("same"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, profile) = send(
        &app,
        "GET",
        &format!("/api/users/{}", user_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(profile["savedStories"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn removing_an_absent_story_succeeds() {
    let (app, _) = app();
    let (user_id, token) = register_and_login(&app).await;

    let (status, snapshot) = send(
        &app,
        "DELETE",
        &format!("/api/users/{}/savedstories/never-saved", user_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snapshot["savedStories"], json!([]));
}

#[tokio::test]
async fn story_payloads_are_validated() {
    let (app, _) = app();
    let (user_id, token) = register_and_login(&app).await;
    let uri = format!("/api/users/{}/savedstories", user_id);

    // Missing required fields.
    let (status, _) = send(
        &app,
        "POST",
        &uri,
        Some(&token),
        Some(json!({"storyID": "s-1"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Over-long field.
    let mut oversized = story("s-1");
    oversized["title"] = json!("t".repeat(201));
    let (status, _) = send(&app, "POST", &uri, Some(&token), Some(oversized)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_account_twice_reports_already_deleted() {
    let (app, _) = app();
    let (user_id, token) = register_and_login(&app).await;
    let uri = format!("/api/users/{}", user_id);

    let (status, body) = send(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["msg"], "User Deleted");

    let (status, body) = send(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["msg"], "Account already deleted");
}

#[tokio::test]
async fn logout_acknowledges_and_token_remains_time_bounded() {
    let (app, _) = app();
    let (user_id, token) = register_and_login(&app).await;

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/sessions/{}", user_id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["msg"], "Logged out");
}

#[tokio::test]
async fn unmatched_routes_get_a_json_404() {
    let (app, _) = app();
    let (status, body) = send(&app, "GET", "/api/nothing-here", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Not found");
}

//=========================================================================================
// Forbidden requests must short-circuit before the store
//=========================================================================================

/// Wraps the memory store and counts every call that reaches it.
struct CountingStore {
    inner: MemoryStore,
    calls: AtomicUsize,
}

impl CountingStore {
    fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CredentialStore for CountingStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<UserAccount>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.find_by_email(email).await
    }

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<UserAccount>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.find_by_id(id).await
    }

    async fn insert(&self, account: NewAccount) -> StoreResult<UserAccount> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.insert(account).await
    }

    async fn conditional_update(
        &self,
        id: UserId,
        predicate: &Predicate,
        mutation: &Mutation,
    ) -> StoreResult<Option<UserAccount>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.conditional_update(id, predicate, mutation).await
    }

    async fn delete_by_id(&self, id: UserId) -> StoreResult<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.delete_by_id(id).await
    }
}

#[tokio::test]
async fn mismatched_identity_is_rejected_before_any_store_access() {
    let store = Arc::new(CountingStore::new());
    let state = Arc::new(AppState::new(store.clone(), Arc::new(test_config())));
    let app = api_router(state.clone());

    let account = store
        .insert(NewAccount {
            email: "alice@x.com".to_string(),
            display_name: "alice1".to_string(),
            password_hash: "$argon2id$stub".to_string(),
        })
        .await
        .unwrap();
    let token = state.sessions.issue(account.id);
    let other = UserId::new();
    store.calls.store(0, Ordering::SeqCst);

    // A valid token replayed against someone else's resource path.
    for (method, uri, body) in [
        ("GET", format!("/api/users/{}", other), None),
        ("DELETE", format!("/api/users/{}", other), None),
        (
            "POST",
            format!("/api/users/{}/savedstories", other),
            Some(story("s-1")),
        ),
        (
            "DELETE",
            format!("/api/users/{}/savedstories/s-1", other),
            None,
        ),
    ] {
        let (status, _) = send(&app, method, &uri, Some(&token), body).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
    assert_eq!(store.calls.load(Ordering::SeqCst), 0);
}
