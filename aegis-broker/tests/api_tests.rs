//! Integration tests for aegis-broker API endpoints
//!
//! Covers upload validation, the status-read contract (404 shape), the
//! prior-results listing, health, and the narrative/video error paths.
//! The full hand-off lifecycle against mock collaborators lives in
//! handoff_tests.rs.

use aegis_broker::narrative::NarrativeClient;
use aegis_broker::videos::VideoSearchClient;
use aegis_broker::worker_client::WorkerClient;
use aegis_broker::{build_router, AppState};
use aegis_common::storage::MemoryObjectStore;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: create app state with an in-memory store and no external
/// collaborators configured
fn test_app_state() -> AppState {
    AppState::new(
        Arc::new(MemoryObjectStore::new()),
        // Nothing in these tests expects the worker call to succeed
        WorkerClient::new("http://127.0.0.1:1", Duration::from_millis(250)),
        NarrativeClient::new(None, None),
        VideoSearchClient::new(None, "US"),
        "http://storage.test/aegis-uploads",
    )
}

/// Test helper: create request with empty body
fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Test helper: build a multipart upload request for the given file
fn upload_request(file_name: &str, content: &[u8]) -> Request<Body> {
    let boundary = "aegis-test-boundary";
    let mut body = format!(
        "--{boundary}\r\n\
         content-disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
         content-type: image/jpeg\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Test helper: extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

// =============================================================================
// Health Endpoint
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = build_router(test_app_state());

    let response = app.oneshot(test_request("GET", "/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "aegis-broker");
    assert!(body["version"].is_string());
}

// =============================================================================
// Status Read Contract
// =============================================================================

#[tokio::test]
async fn test_unknown_task_id_returns_not_found_body() {
    let app = build_router(test_app_state());

    let response = app
        .oneshot(test_request(
            "GET",
            "/status/00000000-0000-0000-0000-000000000000",
        ))
        .await
        .unwrap();

    // NotFound must be distinguishable from "still processing"
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "not_found");
}

#[tokio::test]
async fn test_malformed_task_id_is_rejected() {
    let app = build_router(test_app_state());

    let response = app
        .oneshot(test_request("GET", "/status/not-a-uuid"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_status_of_created_task_is_processing() {
    let state = test_app_state();
    let app = build_router(state.clone());

    // Created directly, so no hand-off runs and the snapshot stays stable
    let task_id = state.tasks.create("a.jpg", "2026-08-07/a.jpg").await;

    let response = app
        .oneshot(test_request("GET", &format!("/status/{task_id}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "processing");
    assert!(body["result"].is_null());
}

// =============================================================================
// Upload Validation
// =============================================================================

#[tokio::test]
async fn test_upload_returns_task_id() {
    let app = build_router(test_app_state());

    let response = app
        .oneshot(upload_request("test.jpg", b"fake-image-data"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert!(body["task_id"].is_string());
    assert!(body["message"].as_str().unwrap().contains("accepted"));
}

#[tokio::test]
async fn test_upload_ids_are_never_reused() {
    let app = build_router(test_app_state());

    let first = extract_json(
        app.clone()
            .oneshot(upload_request("a.jpg", b"one"))
            .await
            .unwrap()
            .into_body(),
    )
    .await;
    let second = extract_json(
        app.oneshot(upload_request("a.jpg", b"two"))
            .await
            .unwrap()
            .into_body(),
    )
    .await;

    assert_ne!(first["task_id"], second["task_id"]);
}

#[tokio::test]
async fn test_upload_rejects_empty_file() {
    let app = build_router(test_app_state());

    let response = app.oneshot(upload_request("empty.jpg", b"")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_rejects_missing_file_field() {
    let boundary = "aegis-test-boundary";
    let body = format!(
        "--{boundary}\r\n\
         content-disposition: form-data; name=\"other\"\r\n\r\n\
         value\r\n--{boundary}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap();

    let app = build_router(test_app_state());
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Prior Results Listing
// =============================================================================

#[tokio::test]
async fn test_tasks_listing_newest_first() {
    let state = test_app_state();
    let app = build_router(state.clone());

    state.tasks.create("first.jpg", "2026-08-07/first.jpg").await;
    tokio::time::sleep(Duration::from_millis(5)).await;
    state.tasks.create("second.jpg", "2026-08-07/second.jpg").await;

    let response = app.oneshot(test_request("GET", "/tasks")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let listing = body.as_array().unwrap();
    assert_eq!(listing.len(), 2);
    assert_eq!(listing[0]["file_name"], "second.jpg");
    assert_eq!(listing[1]["file_name"], "first.jpg");
}

// =============================================================================
// Narrative Endpoint Error Paths
// =============================================================================

#[tokio::test]
async fn test_narrative_unknown_task_is_404() {
    let app = build_router(test_app_state());

    let response = app
        .oneshot(test_request(
            "POST",
            "/narrative/00000000-0000-0000-0000-000000000000",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_narrative_requires_completed_task() {
    let state = test_app_state();
    let app = build_router(state.clone());

    let task_id = state.tasks.create("a.jpg", "2026-08-07/a.jpg").await;

    let response = app
        .oneshot(test_request("POST", &format!("/narrative/{task_id}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_narrative_unconfigured_is_503() {
    let state = test_app_state();
    let app = build_router(state.clone());

    let task_id = state.tasks.create("a.jpg", "2026-08-07/a.jpg").await;
    state
        .tasks
        .complete(task_id, json!({"model_result": "Fake", "confidence": 0.87}))
        .await;

    let response = app
        .oneshot(test_request("POST", &format!("/narrative/{task_id}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

// =============================================================================
// Video Endpoint Error Paths
// =============================================================================

#[tokio::test]
async fn test_video_search_unconfigured_is_503() {
    let app = build_router(test_app_state());

    let response = app
        .oneshot(test_request("GET", "/videos/search?query=deepfake"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_video_search_rejects_blank_query() {
    let app = build_router(test_app_state());

    let response = app
        .oneshot(test_request("GET", "/videos/search?query=%20"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
