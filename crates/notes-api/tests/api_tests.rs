//! API Integration Tests
//!
//! Every test drives the full router (middleware included) against a
//! private in-memory SQLite database.
//!
//! Author: hephaex@gmail.com

use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Utc};
use notes_api::auth::{PasswordConfig, PasswordHasher};
use notes_api::{create_router, state::AppState};
use notes_core::config::{AuthConfig, ServerConfig};
use notes_core::SqliteStore;
use serde_json::{json, Value};
use std::time::Duration;
use tower::ServiceExt;

const SECRET: &str = "integration-test-secret";

async fn create_router_for_testing() -> Router {
    let store = SqliteStore::in_memory().await.expect("open in-memory store");
    let auth = AuthConfig {
        jwt_secret: SECRET.to_string(),
        token_ttl_secs: 3600,
    };
    let hasher = PasswordHasher::new(PasswordConfig::insecure_fast());
    let state = AppState::from_config(store, &auth, hasher).expect("build state");
    create_router(state, &ServerConfig::default())
}

/// Helper to create a test request
fn create_json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");

    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }

    match body {
        Some(json_body) => builder
            .body(Body::from(serde_json::to_string(&json_body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Send a request and decode the body (`Null` when empty)
async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };

    (status, headers, json)
}

async fn signup(app: &Router, username: &str, password: &str) -> (StatusCode, Value) {
    let request = create_json_request(
        "POST",
        "/auth/signup",
        None,
        Some(json!({"username": username, "password": password})),
    );
    let (status, _, json) = send(app, request).await;
    (status, json)
}

async fn signin(app: &Router, username: &str, password: &str) -> (StatusCode, Value) {
    let request = create_json_request(
        "POST",
        "/auth/signin",
        None,
        Some(json!({"username": username, "password": password})),
    );
    let (status, _, json) = send(app, request).await;
    (status, json)
}

/// Register and sign in, returning a bearer token
async fn token_for(app: &Router, username: &str) -> String {
    let (status, _) = signup(app, username, "secret").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, json) = signin(app, username, "secret").await;
    assert_eq!(status, StatusCode::OK);
    json["token"].as_str().unwrap().to_string()
}

async fn create_note(app: &Router, token: &str, title: &str, content: &str) -> i64 {
    let request = create_json_request(
        "POST",
        "/notes/",
        Some(token),
        Some(json!({"title": title, "content": content})),
    );
    let (status, _, json) = send(app, request).await;
    assert_eq!(status, StatusCode::CREATED);
    json["id"].as_i64().unwrap()
}

// =============================================================================
// End-to-end scenario
// =============================================================================

#[tokio::test]
async fn test_full_note_lifecycle() {
    let app = create_router_for_testing().await;

    let (status, json) = signup(&app, "alice", "secret").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json, json!({"id": 1, "username": "alice"}));

    let (status, json) = signin(&app, "alice", "secret").await;
    assert_eq!(status, StatusCode::OK);
    let token = json["token"].as_str().unwrap().to_string();
    assert!(!token.is_empty());

    // No notes yet
    let (status, _, json) = send(&app, create_json_request("GET", "/notes/", Some(&token), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json["NotFound"].is_string());

    // Create
    let request = create_json_request(
        "POST",
        "/notes/",
        Some(&token),
        Some(json!({"title": "T", "content": "C"})),
    );
    let (status, _, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json, json!({"id": 1, "title": "T", "content": "C"}));

    // Read
    let (status, _, note) = send(&app, create_json_request("GET", "/notes/1", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(note["id"], 1);
    assert_eq!(note["user_id"], 1);
    assert_eq!(note["title"], "T");
    assert_eq!(note["content"], "C");
    let created_updated_at: DateTime<Utc> =
        serde_json::from_value(note["updated_at"].clone()).unwrap();

    // List
    let (status, _, json) = send(&app, create_json_request("GET", "/notes/", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 1);

    tokio::time::sleep(Duration::from_millis(10)).await;

    // Update
    let request = create_json_request(
        "PUT",
        "/notes/1",
        Some(&token),
        Some(json!({"title": "T2", "content": "C2"})),
    );
    let (status, _, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(json, Value::Null);

    let (_, _, note) = send(&app, create_json_request("GET", "/notes/1", Some(&token), None)).await;
    assert_eq!(note["title"], "T2");
    assert_eq!(note["content"], "C2");
    let updated_at: DateTime<Utc> = serde_json::from_value(note["updated_at"].clone()).unwrap();
    let created_at: DateTime<Utc> = serde_json::from_value(note["created_at"].clone()).unwrap();
    assert!(updated_at > created_updated_at);
    assert!(updated_at > created_at);

    // Delete
    let (status, _, _) = send(&app, create_json_request("DELETE", "/notes/1", Some(&token), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _, json) = send(&app, create_json_request("GET", "/notes/1", Some(&token), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json, json!({"NotFound": "Note not found"}));
}

#[tokio::test]
async fn test_notes_without_trailing_slash() {
    let app = create_router_for_testing().await;
    let token = token_for(&app, "alice").await;

    let request = create_json_request(
        "POST",
        "/notes",
        Some(&token),
        Some(json!({"title": "T", "content": "C"})),
    );
    let (status, _, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _, json) = send(&app, create_json_request("GET", "/notes", Some(&token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_list_is_ordered_by_creation() {
    let app = create_router_for_testing().await;
    let token = token_for(&app, "alice").await;

    let first = create_note(&app, &token, "first", "").await;
    let second = create_note(&app, &token, "second", "").await;

    let (_, _, json) = send(&app, create_json_request("GET", "/notes/", Some(&token), None)).await;
    let ids: Vec<i64> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![first, second]);
}

// =============================================================================
// Registration and sign-in
// =============================================================================

#[tokio::test]
async fn test_signup_duplicate_is_conflict() {
    let app = create_router_for_testing().await;

    let (status, _) = signup(&app, "alice", "secret").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, json) = signup(&app, "alice", "different").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json, json!({"UserExists": "User already exists"}));

    // The first account still works
    let (status, _) = signin(&app, "alice", "secret").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_signup_validation() {
    let app = create_router_for_testing().await;

    let (status, json) = signup(&app, "", "secret").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["ValidationError"]
        .as_str()
        .unwrap()
        .contains("Username cannot be empty"));

    let (status, json) = signup(&app, "alice", "abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["ValidationError"]
        .as_str()
        .unwrap()
        .contains("Password cannot be less than 4 characters"));
}

#[tokio::test]
async fn test_malformed_body_is_invalid_request() {
    let app = create_router_for_testing().await;

    let request = Request::builder()
        .method("POST")
        .uri("/auth/signup")
        .header("Content-Type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["InvalidRequest"].is_string());

    let request = Request::builder()
        .method("POST")
        .uri("/auth/signin")
        .body(Body::from(r#"{"username":"alice","password":"secret"}"#))
        .unwrap();
    let (status, _, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["InvalidRequest"].is_string());
}

#[tokio::test]
async fn test_signin_failures_are_identical() {
    let app = create_router_for_testing().await;
    signup(&app, "alice", "secret").await;

    let (wrong_status, wrong_body) = signin(&app, "alice", "wrong-password").await;
    let (unknown_status, unknown_body) = signin(&app, "mallory", "secret").await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
    assert_eq!(
        wrong_body,
        json!({"AuthenticationError": "Invalid username or password"})
    );
}

// =============================================================================
// Auth gate
// =============================================================================

#[tokio::test]
async fn test_missing_authorization_header() {
    let app = create_router_for_testing().await;

    let (status, _, json) = send(&app, create_json_request("GET", "/notes/", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json, json!({"Unauthorized": "Authorization header is required"}));
}

#[tokio::test]
async fn test_invalid_authorization_format() {
    let app = create_router_for_testing().await;
    let token = token_for(&app, "alice").await;

    for value in [token.clone(), format!("Basic {token}"), "Bearer".to_string()] {
        let request = Request::builder()
            .uri("/notes/")
            .header("Authorization", value)
            .body(Body::empty())
            .unwrap();
        let (status, _, json) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json, json!({"Unauthorized": "Invalid authorization format"}));
    }
}

#[tokio::test]
async fn test_invalid_token() {
    let app = create_router_for_testing().await;
    let token = token_for(&app, "alice").await;

    let (signed, signature) = token.rsplit_once('.').unwrap();
    let swapped = if signature.starts_with('A') { 'B' } else { 'A' };
    let tampered = format!("{signed}.{swapped}{}", &signature[1..]);

    for bad in ["not-a-jwt", tampered.as_str()] {
        let (status, _, json) =
            send(&app, create_json_request("GET", "/notes/", Some(bad), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json, json!({"Unauthorized": "Invalid token"}));
    }
}

#[tokio::test]
async fn test_token_from_other_secret_rejected() {
    let app = create_router_for_testing().await;
    token_for(&app, "alice").await;

    let foreign = notes_api::auth::TokenIssuer::new(b"other-secret", Duration::from_secs(60))
        .unwrap()
        .issue(1)
        .unwrap();

    let (status, _, json) =
        send(&app, create_json_request("GET", "/notes/", Some(&foreign), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json, json!({"Unauthorized": "Invalid token"}));
}

#[tokio::test]
async fn test_gate_runs_before_id_parsing() {
    let app = create_router_for_testing().await;

    let (status, _, json) = send(&app, create_json_request("GET", "/notes/abc", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(json["Unauthorized"].is_string());
}

// =============================================================================
// Notes
// =============================================================================

#[tokio::test]
async fn test_non_integer_id() {
    let app = create_router_for_testing().await;
    let token = token_for(&app, "alice").await;

    for (method, body) in [
        ("GET", None),
        ("PUT", Some(json!({"title": "T", "content": "C"}))),
        ("DELETE", None),
    ] {
        let request = create_json_request(method, "/notes/abc", Some(&token), body);
        let (status, _, json) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{method}");
        assert_eq!(json, json!({"InvalidID": "ID must be an integer"}));
    }
}

#[tokio::test]
async fn test_create_note_requires_title() {
    let app = create_router_for_testing().await;
    let token = token_for(&app, "alice").await;

    let request = create_json_request(
        "POST",
        "/notes/",
        Some(&token),
        Some(json!({"title": "", "content": "C"})),
    );
    let (status, _, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["ValidationError"]
        .as_str()
        .unwrap()
        .contains("Title cannot be empty"));
}

#[tokio::test]
async fn test_create_note_without_content() {
    let app = create_router_for_testing().await;
    let token = token_for(&app, "alice").await;

    let request = create_json_request(
        "POST",
        "/notes/",
        Some(&token),
        Some(json!({"title": "only a title"})),
    );
    let (status, _, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["content"], "");
}

#[tokio::test]
async fn test_foreign_notes_look_missing() {
    let app = create_router_for_testing().await;
    let alice = token_for(&app, "alice").await;
    let bob = token_for(&app, "bob").await;

    let id = create_note(&app, &alice, "private", "alice only").await;
    let missing = id + 100;

    for target in [id, missing] {
        let uri = format!("/notes/{target}");

        let (status, _, json) = send(&app, create_json_request("GET", &uri, Some(&bob), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json, json!({"NotFound": "Note not found"}));

        let request = create_json_request(
            "PUT",
            &uri,
            Some(&bob),
            Some(json!({"title": "hijacked", "content": ""})),
        );
        let (status, _, json) = send(&app, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json, json!({"NotFound": "Note not found"}));

        let (status, _, json) =
            send(&app, create_json_request("DELETE", &uri, Some(&bob), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json, json!({"NotFound": "Note not found"}));
    }

    // Bob has no notes of his own
    let (status, _, _) = send(&app, create_json_request("GET", "/notes/", Some(&bob), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Alice's note is untouched
    let (status, _, note) =
        send(&app, create_json_request("GET", &format!("/notes/{id}"), Some(&alice), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(note["title"], "private");
    assert_eq!(note["content"], "alice only");
}

// =============================================================================
// Ambient endpoints and headers
// =============================================================================

#[tokio::test]
async fn test_health_check() {
    let app = create_router_for_testing().await;

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, _, json) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_readiness_check() {
    let app = create_router_for_testing().await;

    let request = Request::builder().uri("/ready").body(Body::empty()).unwrap();
    let (status, _, json) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ready"], true);
    assert_eq!(json["database"], true);
}

#[tokio::test]
async fn test_openapi_document_served() {
    let app = create_router_for_testing().await;

    let request = Request::builder()
        .uri("/api-docs/openapi.json")
        .body(Body::empty())
        .unwrap();
    let (status, _, json) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["paths"]["/notes/{id}"].is_object());
}

#[tokio::test]
async fn test_response_headers() {
    let app = create_router_for_testing().await;
    let token = token_for(&app, "alice").await;
    let id = create_note(&app, &token, "T", "C").await;

    let requests = [
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
        create_json_request("GET", "/notes/", None, None),
        create_json_request("DELETE", &format!("/notes/{id}"), Some(&token), None),
    ];

    for request in requests {
        let (_, headers, _) = send(&app, request).await;
        assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(headers.get(header::X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");
        let request_id = headers.get("x-request-id").unwrap().to_str().unwrap();
        assert!(uuid::Uuid::parse_str(request_id).is_ok());
    }
}

#[tokio::test]
async fn test_client_request_id_is_propagated() {
    let app = create_router_for_testing().await;

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "client-supplied-id")
        .body(Body::empty())
        .unwrap();
    let (_, headers, _) = send(&app, request).await;

    assert_eq!(headers.get("x-request-id").unwrap(), "client-supplied-id");
}
