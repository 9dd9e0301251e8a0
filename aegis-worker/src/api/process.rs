//! Processing endpoint: POST /process
//!
//! The broker's hand-off sends only the stored object's identifiers; the
//! worker fetches the bytes itself, materializes a scratch copy for the
//! classification pipeline, and removes that copy whether or not
//! classification succeeds.

use axum::{
    extract::State,
    routing::post,
    Json, Router,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::AppState;
use aegis_common::api::types::{ProcessRequest, ProcessResponse};

/// POST /process
///
/// Download → classify → respond. Failure to locate the object or to run
/// the classification call is reported as 502 with an `{"error": ...}`
/// body; the broker treats either as a terminal task failure.
pub async fn process_object(
    State(state): State<AppState>,
    Json(request): Json<ProcessRequest>,
) -> ApiResult<Json<ProcessResponse>> {
    if request.object_key.trim().is_empty() {
        return Err(ApiError::BadRequest("object_key must not be empty".to_string()));
    }

    info!(object_key = %request.object_key, "Processing stored object");

    let bytes = state
        .store
        .get(&request.object_key)
        .await
        .map_err(|e| ApiError::Upstream(format!("object download failed: {}", e)))?;

    // Scratch copy for the classification pipeline; the uuid prefix keeps
    // concurrent requests for the same object name from colliding.
    let scratch_path = state.scratch_dir.join(format!(
        "{}-{}",
        Uuid::new_v4(),
        sanitize_file_name(&request.object_name)
    ));
    tokio::fs::write(&scratch_path, &bytes).await?;

    let result = state.classifier.classify(&scratch_path).await;

    // Cleanup is this service's responsibility, on success and failure alike
    if let Err(e) = tokio::fs::remove_file(&scratch_path).await {
        warn!(path = %scratch_path.display(), error = %e, "Failed to remove scratch file");
    }

    let verdict = result
        .map_err(|e| ApiError::Upstream(format!("classification failed: {}", e)))?;

    info!(
        object_key = %request.object_key,
        model_result = %verdict.model_result,
        confidence = verdict.confidence,
        "Classification completed"
    );

    Ok(Json(ProcessResponse {
        message: "classification completed successfully".to_string(),
        source_object: request.object_name,
        model_result: verdict.model_result,
        confidence: verdict.confidence,
    }))
}

/// Strip any path components from a broker-supplied object name
fn sanitize_file_name(name: &str) -> String {
    let base = std::path::Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    if base.is_empty() || base == "." || base == ".." {
        "object".to_string()
    } else {
        base
    }
}

/// Build processing routes
pub fn process_routes() -> Router<AppState> {
    Router::new().route("/process", post(process_object))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_path_components() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("2026-08-07/test.jpg"), "test.jpg");
    }

    #[test]
    fn test_sanitize_rejects_degenerate_names() {
        assert_eq!(sanitize_file_name(""), "object");
        assert_eq!(sanitize_file_name(".."), "object");
    }
}
