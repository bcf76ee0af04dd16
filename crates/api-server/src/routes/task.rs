//! Task API endpoints
//!
//! Polling endpoint for task status and the trigger endpoint that
//! advances a task by one slice. The trigger is meant to be called by
//! an external scheduler (cron hitting the process route), never by
//! the UI directly, so it sits behind a bearer token.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use rb_core::task::{TaskRepository, TaskSnapshot};
use task_engine::EngineError;

use crate::routes::{api_error, internal_error, not_found, ApiError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessTaskRequest {
    pub task_id: Uuid,
}

/// GET /api/tasks/:id - Poll a task's status
async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TaskSnapshot>, ApiError> {
    let task = state.tasks().get(id).await.map_err(internal_error)?;

    match task {
        Some(task) => Ok(Json(TaskSnapshot::from(&task))),
        None => Err(not_found(format!("Task {} not found", id))),
    }
}

/// POST /api/tasks/process - Advance a task by one slice
async fn process_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ProcessTaskRequest>,
) -> Result<Json<TaskSnapshot>, ApiError> {
    let Some(token) = state.trigger_token() else {
        // No token configured: refuse rather than run an open trigger
        return Err(api_error(StatusCode::UNAUTHORIZED, "Unauthorized"));
    };
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", token))
        .unwrap_or(false);
    if !authorized {
        return Err(api_error(StatusCode::UNAUTHORIZED, "Unauthorized"));
    }

    match state.orchestrator().run_slice(req.task_id).await {
        Ok(snapshot) => Ok(Json(snapshot)),
        Err(EngineError::TaskNotFound { task_id }) => {
            Err(not_found(format!("Task {} not found", task_id)))
        }
        Err(e @ EngineError::TaskBusy { .. }) => Err(api_error(StatusCode::CONFLICT, e.to_string())),
        Err(e) => Err(internal_error(e)),
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/tasks/{id}", get(get_task))
        .route("/api/tasks/process", post(process_task))
}
