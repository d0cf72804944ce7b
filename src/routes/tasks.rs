// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Kanban board task routes.
//!
//! The semantics the dashboard UI relies on: insert-or-ignore on POST,
//! merge (not replace) on PUT, newest-first listing, `{ok: true}` deletes.

use crate::error::{AppError, Result};
use crate::models::event::kinds;
use crate::models::{Task, TaskUpdate};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/tasks", get(list_tasks).post(create_task).delete(clear_tasks))
        .route("/api/tasks/{id}", put(update_task).delete(delete_task))
}

/// Response for delete endpoints.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct OkResponse {
    pub ok: bool,
}

/// Turn validator output into a 400 with field details.
pub(crate) fn validation_error(errors: validator::ValidationErrors) -> AppError {
    AppError::BadRequest(errors.to_string().replace('\n', "; "))
}

/// List all tasks, newest first.
async fn list_tasks(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Task>>> {
    let tasks = state.db.list_tasks().await?;
    Ok(Json(tasks))
}

/// Create a task. Re-posting an existing id is a no-op; the payload is
/// echoed back either way (matching the UI's optimistic insert).
async fn create_task(
    State(state): State<Arc<AppState>>,
    Json(task): Json<Task>,
) -> Result<Json<Task>> {
    task.validate().map_err(validation_error)?;

    state.db.insert_task(&task).await?;
    state
        .db
        .append_event(kinds::TASK_CREATED, Some(&task.id), Some(&task.title))
        .await?;

    tracing::debug!(task_id = %task.id, "Task created");
    Ok(Json(task))
}

/// Merge a partial update into a task. 404 when the id is unknown.
async fn update_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(updates): Json<TaskUpdate>,
) -> Result<Json<Task>> {
    let mut task = state
        .db
        .get_task(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".to_string()))?;

    updates.apply_to(&mut task);
    task.validate().map_err(validation_error)?;

    state.db.update_task(&task).await?;
    state
        .db
        .append_event(kinds::TASK_UPDATED, Some(&task.id), Some(&task.title))
        .await?;

    Ok(Json(task))
}

/// Delete a task. Deleting an unknown id still reports ok, so the UI
/// can fire-and-forget.
async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OkResponse>> {
    let removed = state.db.delete_task(&id).await?;
    if removed {
        state
            .db
            .append_event(kinds::TASK_DELETED, Some(&id), None)
            .await?;
    }
    Ok(Json(OkResponse { ok: true }))
}

/// Clear the whole board.
async fn clear_tasks(State(state): State<Arc<AppState>>) -> Result<Json<OkResponse>> {
    state.db.clear_tasks().await?;
    state.db.append_event(kinds::BOARD_CLEARED, None, None).await?;
    Ok(Json(OkResponse { ok: true }))
}
