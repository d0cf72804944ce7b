// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Notes grid routes.

use crate::error::{AppError, Result};
use crate::models::event::kinds;
use crate::models::{Note, NoteUpdate};
use crate::routes::tasks::{validation_error, OkResponse};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/notes", get(list_notes).post(create_note))
        .route("/api/notes/{id}", put(update_note).delete(delete_note))
}

/// List all notes, pinned first, most recently updated first.
async fn list_notes(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Note>>> {
    let notes = state.db.list_notes().await?;
    Ok(Json(notes))
}

/// Create a note. The server stamps created/updated timestamps.
async fn create_note(
    State(state): State<Arc<AppState>>,
    Json(mut note): Json<Note>,
) -> Result<Json<Note>> {
    note.validate().map_err(validation_error)?;

    let now = format_utc_rfc3339(chrono::Utc::now());
    note.created_at = Some(now.clone());
    note.updated_at = Some(now);

    state.db.insert_note(&note).await?;
    state
        .db
        .append_event(kinds::NOTE_CREATED, Some(&note.id), Some(&note.title))
        .await?;

    tracing::debug!(note_id = %note.id, "Note created");
    Ok(Json(note))
}

/// Merge a partial update into a note. 404 when the id is unknown.
async fn update_note(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(updates): Json<NoteUpdate>,
) -> Result<Json<Note>> {
    updates.validate().map_err(validation_error)?;

    let mut note = state
        .db
        .get_note(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Note not found".to_string()))?;

    updates.apply_to(&mut note);
    note.updated_at = Some(format_utc_rfc3339(chrono::Utc::now()));

    state.db.update_note(&note).await?;
    state
        .db
        .append_event(kinds::NOTE_UPDATED, Some(&note.id), Some(&note.title))
        .await?;

    Ok(Json(note))
}

/// Delete a note.
async fn delete_note(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OkResponse>> {
    let removed = state.db.delete_note(&id).await?;
    if removed {
        state
            .db
            .append_event(kinds::NOTE_DELETED, Some(&id), None)
            .await?;
    }
    Ok(Json(OkResponse { ok: true }))
}
