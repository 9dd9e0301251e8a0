//! Narrative report endpoint: POST /narrative/{task_id}
//!
//! Only meaningful for completed tasks: the report prompt is built from the
//! stored verdict and the public URL of the stored object. The task record
//! itself is never mutated here.

use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::narrative::{ClassificationVerdict, NarrativeError, NarrativeReport};
use crate::AppState;
use aegis_common::api::types::TaskStatus;

/// POST /narrative/{task_id}
///
/// 404 for unknown tasks, 409 for tasks that are not `completed`, 502 when
/// the LLM endpoint fails, 503 when no endpoint is configured.
pub async fn generate_narrative(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
) -> ApiResult<Json<NarrativeReport>> {
    let record = state
        .tasks
        .record(task_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("task not found: {}", task_id)))?;

    if record.status != TaskStatus::Completed {
        return Err(ApiError::Conflict(format!(
            "narrative requires a completed task (current status: {:?})",
            record.status
        )));
    }

    // The worker's body carries the verdict; missing fields degrade to a
    // neutral prompt rather than failing the report.
    let result = record.result.as_ref();
    let verdict = ClassificationVerdict {
        model_result: result
            .and_then(|r| r["model_result"].as_str())
            .unwrap_or("N/A")
            .to_string(),
        confidence: result
            .and_then(|r| r["confidence"].as_f64())
            .unwrap_or(0.0),
    };
    let image_url = state.object_url(&record.object_key);

    info!(task_id = %task_id, verdict = %verdict.model_result, "Generating narrative report");

    let report = state
        .narrative
        .analyze(&verdict, &image_url)
        .await
        .map_err(|e| match e {
            NarrativeError::NotConfigured => ApiError::Unavailable(e.to_string()),
            other => ApiError::Upstream(other.to_string()),
        })?;

    Ok(Json(report))
}

/// Build narrative routes
pub fn narrative_routes() -> Router<AppState> {
    Router::new().route("/narrative/:task_id", post(generate_narrative))
}
