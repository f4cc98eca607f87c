//! Integration tests for the refdesk-bot HTTP API
//!
//! Tests cover:
//! - Health endpoint (no auth required)
//! - Update intake for messages, callbacks and documents
//! - Bearer-token middleware
//! - JSON error bodies for malformed requests

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

use refdesk_bot::{build_router, AppState, Dispatcher};
use refdesk_common::{OperatorRegistry, RecordStore, UserId};

const OPERATOR: i64 = 12345678;

/// Test helper: app over a freshly seeded store
fn setup_app(dir: &TempDir, api_token: Option<&str>) -> axum::Router {
    let dispatcher = Dispatcher::new(
        RecordStore::open(dir.path().join("schedule_data.json")),
        OperatorRegistry::new([UserId(OPERATOR)]),
        dir.path().join("backups"),
    );
    build_router(AppState::new(dispatcher, api_token.map(str::to_string)))
}

fn update_request(body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/updates")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

// =============================================================================
// Health Endpoint Tests
// =============================================================================

#[tokio::test]
async fn test_health_endpoint_no_auth_required() {
    let dir = TempDir::new().unwrap();
    let app = setup_app(&dir, Some("secret"));

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "refdesk-bot");
    assert!(body["version"].is_string());
    assert!(body["build"].is_string());
    assert_eq!(body["records"], 1);
}

#[tokio::test]
async fn test_health_reports_record_count_after_import() {
    let dir = TempDir::new().unwrap();
    let app = setup_app(&dir, None);

    let import = update_request(
        json!({"user_id": OPERATOR, "update": {"type": "message", "text": "/import"}}),
        None,
    );
    app.clone().oneshot(import).await.unwrap();
    let batch = json!([{
        "class_name": "10Б", "semester": "2", "subject": "Физика",
        "exam_type": "Контрольная", "material_type": "Таблицы", "info": "a"
    }]);
    let upload = update_request(
        json!({
            "user_id": OPERATOR,
            "update": {"type": "document", "file_name": "batch.json", "content": batch.to_string()}
        }),
        None,
    );
    app.clone().oneshot(upload).await.unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["records"], 2);
}

// =============================================================================
// Update Tests
// =============================================================================

#[tokio::test]
async fn test_start_message_returns_class_menu() {
    let dir = TempDir::new().unwrap();
    let app = setup_app(&dir, None);

    let request = update_request(
        json!({"user_id": 1, "update": {"type": "message", "text": "/start"}}),
        None,
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert!(body["text"].as_str().unwrap().contains("Choose a class"));
    assert_eq!(body["keyboard"][0][0]["text"], "9А");
    assert_eq!(body["keyboard"][0][0]["callback_data"], "class:9А");
}

#[tokio::test]
async fn test_session_survives_across_requests() {
    let dir = TempDir::new().unwrap();
    let app = setup_app(&dir, None);

    let start = update_request(
        json!({"user_id": 1, "update": {"type": "message", "text": "/start"}}),
        None,
    );
    app.clone().oneshot(start).await.unwrap();

    let pick = update_request(
        json!({"user_id": 1, "update": {"type": "callback", "data": "class:9А"}}),
        None,
    );
    let response = app.oneshot(pick).await.unwrap();

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["keyboard"][0][0]["callback_data"], "semester:1");
    assert_eq!(body["keyboard"][1][0]["callback_data"], "back");
}

#[tokio::test]
async fn test_export_returns_document() {
    let dir = TempDir::new().unwrap();
    let app = setup_app(&dir, None);

    let request = update_request(
        json!({"user_id": OPERATOR, "update": {"type": "message", "text": "/export"}}),
        None,
    );
    let response = app.oneshot(request).await.unwrap();

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["document"]["file_name"], "schedule_data.json");
    let content: Value =
        serde_json::from_str(body["document"]["content"].as_str().unwrap()).unwrap();
    assert_eq!(content[0]["class_name"], "9А");
}

#[tokio::test]
async fn test_document_update_is_accepted() {
    let dir = TempDir::new().unwrap();
    let app = setup_app(&dir, None);

    let import = update_request(
        json!({"user_id": OPERATOR, "update": {"type": "message", "text": "/import"}}),
        None,
    );
    app.clone().oneshot(import).await.unwrap();

    let upload = update_request(
        json!({
            "user_id": OPERATOR,
            "update": {"type": "document", "file_name": "batch.json", "content": "[]"}
        }),
        None,
    );
    let response = app.oneshot(upload).await.unwrap();

    let body = extract_json(response.into_body()).await;
    assert!(body["text"].as_str().unwrap().contains("Imported 0 record(s)"));
}

#[tokio::test]
async fn test_malformed_update_is_bad_request() {
    let dir = TempDir::new().unwrap();
    let app = setup_app(&dir, None);

    let request = update_request(json!({"user_id": 1, "update": {"type": "sticker"}}), None);
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert!(body["error"].is_string());
}

// =============================================================================
// Authentication Tests
// =============================================================================

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let dir = TempDir::new().unwrap();
    let app = setup_app(&dir, Some("secret"));

    let request = update_request(
        json!({"user_id": 1, "update": {"type": "message", "text": "/start"}}),
        None,
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = extract_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("API token"));
}

#[tokio::test]
async fn test_wrong_token_is_unauthorized() {
    let dir = TempDir::new().unwrap();
    let app = setup_app(&dir, Some("secret"));

    let request = update_request(
        json!({"user_id": 1, "update": {"type": "message", "text": "/start"}}),
        Some("guess"),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_valid_token_is_accepted() {
    let dir = TempDir::new().unwrap();
    let app = setup_app(&dir, Some("secret"));

    let request = update_request(
        json!({"user_id": 1, "update": {"type": "message", "text": "/help"}}),
        Some("secret"),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert!(body["text"].as_str().unwrap().contains("/start"));
}
