//! Integration tests for the worker processing endpoint
//!
//! Each test spawns mock collaborators (object store gateway, inference
//! endpoint) on ephemeral ports and drives the real HttpObjectStore and
//! ClassifierClient through the worker router.

use aegis_common::storage::HttpObjectStore;
use aegis_worker::classifier::ClassifierClient;
use aegis_worker::{build_router, AppState};
use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot` method

const TEST_BUCKET: &str = "test-bucket";

/// Spawn a mock object store gateway serving the given objects under
/// `/{bucket}/{key}`
async fn spawn_mock_store(objects: HashMap<String, Vec<u8>>) -> SocketAddr {
    async fn get_object(
        State(objects): State<Arc<HashMap<String, Vec<u8>>>>,
        axum::extract::Path(key): axum::extract::Path<String>,
    ) -> impl IntoResponse {
        match objects.get(&key) {
            Some(bytes) => (StatusCode::OK, bytes.clone()).into_response(),
            None => (StatusCode::NOT_FOUND, "NoSuchKey").into_response(),
        }
    }

    let app = Router::new()
        .route(&format!("/{TEST_BUCKET}/*key"), get(get_object))
        .with_state(Arc::new(objects));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Spawn a mock inference endpoint answering every model path with the
/// given status and body
async fn spawn_mock_classifier(status: StatusCode, body: Value) -> SocketAddr {
    let app = Router::new().route(
        "/models/*model",
        post(move || {
            let body = body.clone();
            async move { (status, Json(body)) }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Build worker state around the mock collaborators; returns the scratch
/// dir guard so tests can assert cleanup
fn test_app_state(
    store_addr: SocketAddr,
    classifier_addr: SocketAddr,
) -> (AppState, tempfile::TempDir) {
    let scratch = tempfile::tempdir().unwrap();
    let state = AppState::new(
        Arc::new(HttpObjectStore::new(
            format!("http://{store_addr}"),
            TEST_BUCKET,
            None,
        )),
        ClassifierClient::new(
            format!("http://{classifier_addr}"),
            "acme/manipulation-detector",
            None,
        ),
        scratch.path().to_path_buf(),
    );
    (state, scratch)
}

fn process_request(object_name: &str, object_key: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/process")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "object_name": object_name, "object_key": object_key }).to_string(),
        ))
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

fn scratch_is_empty(dir: &tempfile::TempDir) -> bool {
    std::fs::read_dir(dir.path()).unwrap().next().is_none()
}

// =============================================================================
// Success Flow
// =============================================================================

#[tokio::test]
async fn test_process_returns_verdict() {
    let mut objects = HashMap::new();
    objects.insert("2026-08-07/test.jpg".to_string(), b"fake-image-data".to_vec());
    let store_addr = spawn_mock_store(objects).await;
    let classifier_addr = spawn_mock_classifier(
        StatusCode::OK,
        json!([{"label": "DeepFake", "score": 0.87}, {"label": "Real", "score": 0.13}]),
    )
    .await;

    let (state, scratch) = test_app_state(store_addr, classifier_addr);
    let app = build_router(state);

    let response = app
        .oneshot(process_request("test.jpg", "2026-08-07/test.jpg"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["model_result"], "Fake");
    assert!((body["confidence"].as_f64().unwrap() - 0.87).abs() < f64::EPSILON);
    assert_eq!(body["source_object"], "test.jpg");
    assert!(body["message"].as_str().unwrap().contains("completed"));

    // The local temporary copy is removed after classification
    assert!(scratch_is_empty(&scratch));
}

// =============================================================================
// Failure Paths
// =============================================================================

#[tokio::test]
async fn test_missing_object_is_upstream_failure() {
    let store_addr = spawn_mock_store(HashMap::new()).await;
    let classifier_addr =
        spawn_mock_classifier(StatusCode::OK, json!([{"label": "Real", "score": 0.9}])).await;

    let (state, _scratch) = test_app_state(store_addr, classifier_addr);
    let app = build_router(state);

    let response = app
        .oneshot(process_request("missing.jpg", "2026-08-07/missing.jpg"))
        .await
        .unwrap();

    // Non-success, distinguishable from a verdict
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = extract_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("download"));
}

#[tokio::test]
async fn test_classifier_failure_is_upstream_and_cleans_scratch() {
    let mut objects = HashMap::new();
    objects.insert("2026-08-07/test.jpg".to_string(), b"fake-image-data".to_vec());
    let store_addr = spawn_mock_store(objects).await;
    let classifier_addr = spawn_mock_classifier(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({"error": "model exploded"}),
    )
    .await;

    let (state, scratch) = test_app_state(store_addr, classifier_addr);
    let app = build_router(state);

    let response = app
        .oneshot(process_request("test.jpg", "2026-08-07/test.jpg"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = extract_json(response.into_body()).await;
    assert!(body["error"].as_str().unwrap().contains("classification failed"));

    // Cleanup happens on the failure path too
    assert!(scratch_is_empty(&scratch));
}

#[tokio::test]
async fn test_empty_object_key_is_rejected() {
    let store_addr = spawn_mock_store(HashMap::new()).await;
    let classifier_addr =
        spawn_mock_classifier(StatusCode::OK, json!([{"label": "Real", "score": 0.9}])).await;

    let (state, _scratch) = test_app_state(store_addr, classifier_addr);
    let app = build_router(state);

    let response = app
        .oneshot(process_request("test.jpg", ""))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let store_addr = spawn_mock_store(HashMap::new()).await;
    let classifier_addr = spawn_mock_classifier(StatusCode::OK, json!([])).await;

    let (state, _scratch) = test_app_state(store_addr, classifier_addr);
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "aegis-worker");
}
