//! Upload endpoint: POST /upload
//!
//! Accepts a multipart image upload, creates a `processing` task, schedules
//! the asynchronous hand-off, and returns the task id immediately. The
//! hand-off executes independently of the request/response cycle and may
//! complete after this response has been sent.

use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::handoff::{self, HandoffInput};
use crate::AppState;
use aegis_common::api::types::UploadResponse;
use aegis_common::storage;

/// POST /upload
///
/// Returns `{task_id, message}` with the polling token. Empty or missing
/// file content is rejected with 400.
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let mut file_name: Option<String> = None;
    let mut content: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("failed to read multipart field: {}", e)))?
    {
        if field.name() == Some("file") {
            file_name = Some(sanitize_file_name(field.file_name().unwrap_or("upload")));
            content = Some(field.bytes().await.map_err(|e| {
                ApiError::BadRequest(format!("failed to read file content: {}", e))
            })?);
        }
    }

    let file_name = file_name
        .ok_or_else(|| ApiError::BadRequest("missing multipart field 'file'".to_string()))?;
    let content =
        content.ok_or_else(|| ApiError::BadRequest("missing file content".to_string()))?;
    if content.is_empty() {
        return Err(ApiError::BadRequest("uploaded file is empty".to_string()));
    }

    // The store key is computed exactly once, here, and persisted with the
    // task - later retrieval never recomputes the date prefix.
    let object_key = storage::object_key_for_today(&file_name);
    let task_id = state.tasks.create(&file_name, &object_key).await;

    info!(
        task_id = %task_id,
        file_name = %file_name,
        size = content.len(),
        "Upload accepted, scheduling hand-off"
    );

    handoff::spawn(
        &state,
        HandoffInput {
            task_id,
            file_name,
            object_key,
            content,
        },
    );

    Ok(Json(UploadResponse {
        task_id,
        message: "upload accepted, processing started".to_string(),
    }))
}

/// Strip any path components from a client-supplied file name
fn sanitize_file_name(name: &str) -> String {
    let base = std::path::Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    if base.is_empty() || base == "." || base == ".." {
        "upload".to_string()
    } else {
        base
    }
}

/// Build upload routes
pub fn upload_routes() -> Router<AppState> {
    Router::new().route("/upload", post(upload_file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_path_components() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("dir/photo.jpg"), "photo.jpg");
        assert_eq!(sanitize_file_name("photo.jpg"), "photo.jpg");
    }

    #[test]
    fn test_sanitize_rejects_degenerate_names() {
        assert_eq!(sanitize_file_name(""), "upload");
        assert_eq!(sanitize_file_name(".."), "upload");
    }
}
