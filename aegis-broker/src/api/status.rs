//! Task status endpoints: GET /status/{task_id}, GET /tasks
//!
//! Pure lookups with no side effects. The polling contract requires an
//! unknown id to be distinguishable from "still processing", so the 404
//! body is `{"status": "not_found"}` rather than the generic error
//! envelope.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::AppState;
use aegis_common::api::types::TaskSummary;

/// GET /status/{task_id}
///
/// Returns the current `{status, result}` snapshot. Once a task is
/// terminal, repeated calls return the identical pair.
pub async fn get_task_status(
    State(state): State<AppState>,
    Path(task_id): Path<Uuid>,
) -> Response {
    match state.tasks.get(task_id).await {
        Some(snapshot) => {
            debug!(task_id = %task_id, status = ?snapshot.status, "Status query");
            Json(snapshot).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "status": "not_found" })),
        )
            .into_response(),
    }
}

/// GET /tasks
///
/// Prior results, newest first, for the report-browsing view.
pub async fn list_tasks(State(state): State<AppState>) -> Json<Vec<TaskSummary>> {
    Json(state.tasks.list().await)
}

/// Build status routes
pub fn status_routes() -> Router<AppState> {
    Router::new()
        .route("/status/:task_id", get(get_task_status))
        .route("/tasks", get(list_tasks))
}
