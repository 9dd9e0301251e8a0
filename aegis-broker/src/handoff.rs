//! Asynchronous task hand-off
//!
//! Runs once per submitted upload, concurrently with (but started after)
//! the HTTP request that created the task:
//!
//! 1. Upload the file content to the object store under the task's
//!    persisted key. Failure marks the task `failed` and stops - the worker
//!    is never contacted.
//! 2. Send a single processing request to the worker. Timeout, transport
//!    failure, or a non-success response marks the task `failed` with the
//!    failure detail; a success response marks it `completed` with the
//!    worker's body.
//!
//! There is no retry of either step, no cancellation path, and no cleanup
//! of the stored object when the worker call fails afterwards. Every
//! outcome ends in a terminal task state; the routine itself never
//! escapes the spawned task.

use crate::worker_client::WorkerError;
use crate::AppState;
use bytes::Bytes;
use tracing::{error, info};
use uuid::Uuid;

/// Input captured from the upload request for one hand-off run
#[derive(Debug, Clone)]
pub struct HandoffInput {
    pub task_id: Uuid,
    pub file_name: String,
    pub object_key: String,
    pub content: Bytes,
}

/// Spawn the hand-off for a freshly created task.
///
/// Returns immediately; the hand-off outlives the request handler and the
/// handler holds nothing but the task id.
pub fn spawn(state: &AppState, input: HandoffInput) {
    let state = state.clone();
    let task_id = input.task_id;
    tokio::spawn(async move {
        info!(task_id = %task_id, "Hand-off started");
        execute(state, input).await;
        info!(task_id = %task_id, "Hand-off finished");
    });
}

async fn execute(state: AppState, input: HandoffInput) {
    let HandoffInput {
        task_id,
        file_name,
        object_key,
        content,
    } = input;

    // Step 1: store the upload. No retry; failure is terminal and the
    // worker is never contacted for this task.
    if let Err(e) = state.store.put(&object_key, content).await {
        error!(task_id = %task_id, error = %e, "Object storage upload failed");
        state
            .tasks
            .fail(task_id, format!("object storage upload failed: {}", e))
            .await;
        return;
    }

    // Step 2: one worker call. A stored object whose worker call fails is
    // left in place.
    match state.worker.process(&file_name, &object_key).await {
        Ok(body) => {
            info!(task_id = %task_id, "Worker completed processing");
            state.tasks.complete(task_id, body).await;
        }
        Err(e @ WorkerError::Transport(_)) => {
            error!(task_id = %task_id, error = %e, "Worker call failed");
            state.tasks.fail(task_id, e.to_string()).await;
        }
        Err(WorkerError::Rejected { status, body }) => {
            error!(task_id = %task_id, status = %status, "Worker rejected processing request");
            state
                .tasks
                .fail(task_id, format!("worker error ({}): {}", status, body))
                .await;
        }
    }
}
