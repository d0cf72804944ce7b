// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! AI assistant routes.
//!
//! Server-side pass-throughs to the chat-completions endpoint. Handlers
//! that mutate the board parse the model output first and only then apply
//! changes, so a bad response never leaves the store half-updated.
//! Suggestions referencing unknown task ids or illegal status/priority
//! values are skipped, not errors.

use crate::error::{AppError, Result};
use crate::models::event::kinds;
use crate::models::task::{PRIORITIES, STATUSES};
use crate::models::{Task, TaskUpdate};
use crate::services::ai::TaskDraft;
use crate::services::{BoardAction, ChatMessage};
use crate::AppState;
use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/ai/summary", post(summary))
        .route("/api/ai/next", post(next_actions))
        .route("/api/ai/priorities", post(apply_priorities))
        .route("/api/ai/autotag", post(apply_tags))
        .route("/api/ai/task", post(create_task_from_text))
        .route("/api/ai/chat", post(chat))
}

/// Free-text AI output.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AiTextResponse {
    pub output: String,
}

/// Board summary in 5 bullet points.
async fn summary(State(state): State<Arc<AppState>>) -> Result<Json<AiTextResponse>> {
    let tasks = state.db.list_tasks().await?;
    let output = state.ai_service.summarize_board(&tasks).await?;
    Ok(Json(AiTextResponse { output }))
}

/// Recommended next best actions.
async fn next_actions(State(state): State<Arc<AppState>>) -> Result<Json<AiTextResponse>> {
    let tasks = state.db.list_tasks().await?;
    let output = state.ai_service.next_actions(&tasks).await?;
    Ok(Json(AiTextResponse { output }))
}

// ─── Applied Suggestions ─────────────────────────────────────────

/// Tasks changed by an applied suggestion run.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AiAppliedResponse {
    pub output: String,
    pub applied: Vec<Task>,
}

/// Ask the model for priorities and apply the valid suggestions.
async fn apply_priorities(State(state): State<Arc<AppState>>) -> Result<Json<AiAppliedResponse>> {
    let tasks = state.db.list_tasks().await?;
    let suggestions = state.ai_service.suggest_priorities(&tasks).await?;

    let mut applied = Vec::new();
    for suggestion in suggestions {
        if !PRIORITIES.contains(&suggestion.priority.as_str()) {
            tracing::debug!(priority = %suggestion.priority, "Skipping illegal priority suggestion");
            continue;
        }
        let Some(mut task) = tasks.iter().find(|t| t.id == suggestion.id).cloned() else {
            continue;
        };
        if task.priority == suggestion.priority {
            continue;
        }

        task.priority = suggestion.priority;
        state.db.update_task(&task).await?;
        state
            .db
            .append_event(
                kinds::AI_PRIORITIES_APPLIED,
                Some(&task.id),
                Some(&format!("priority -> {}", task.priority)),
            )
            .await?;
        applied.push(task);
    }

    tracing::info!(count = applied.len(), "AI priority suggestions applied");
    Ok(Json(AiAppliedResponse {
        output: "Priorities updated.".to_string(),
        applied,
    }))
}

/// Ask the model for tags and apply them.
async fn apply_tags(State(state): State<Arc<AppState>>) -> Result<Json<AiAppliedResponse>> {
    let tasks = state.db.list_tasks().await?;
    let suggestions = state.ai_service.suggest_tags(&tasks).await?;

    let mut applied = Vec::new();
    for suggestion in suggestions {
        let Some(mut task) = tasks.iter().find(|t| t.id == suggestion.id).cloned() else {
            continue;
        };

        task.tags = suggestion.tags;
        state.db.update_task(&task).await?;
        state
            .db
            .append_event(
                kinds::AI_TAGS_APPLIED,
                Some(&task.id),
                Some(&format!("tags -> {}", task.tags.join(","))),
            )
            .await?;
        applied.push(task);
    }

    tracing::info!(count = applied.len(), "AI tag suggestions applied");
    Ok(Json(AiAppliedResponse {
        output: "Tags updated.".to_string(),
        applied,
    }))
}

// ─── Natural-Language Task Creation ──────────────────────────────

#[derive(Deserialize)]
struct AiTaskRequest {
    prompt: String,
}

/// Turn a natural-language request into a stored task.
async fn create_task_from_text(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AiTaskRequest>,
) -> Result<Json<Task>> {
    if request.prompt.trim().is_empty() {
        return Err(AppError::BadRequest("Prompt must not be empty".to_string()));
    }

    let draft = state.ai_service.draft_task(&request.prompt).await?;
    let task = task_from_draft(draft);

    state.db.insert_task(&task).await?;
    state
        .db
        .append_event(kinds::AI_TASK_CREATED, Some(&task.id), Some(&task.title))
        .await?;

    tracing::info!(task_id = %task.id, "AI-drafted task created");
    Ok(Json(task))
}

// ─── Assistant Chat ──────────────────────────────────────────────

#[derive(Deserialize)]
struct AiChatRequest {
    messages: Vec<ChatMessage>,
}

/// Assistant chat result with the board changes it applied.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AiChatResponse {
    pub response: String,
    pub created: Vec<Task>,
    pub updated: Vec<Task>,
}

/// One turn of the board assistant chat. Create/update actions returned
/// by the model are applied before replying.
async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AiChatRequest>,
) -> Result<Json<AiChatResponse>> {
    if request.messages.is_empty() {
        return Err(AppError::BadRequest("Messages must not be empty".to_string()));
    }

    let tasks = state.db.list_tasks().await?;
    let outcome = state.ai_service.chat(&request.messages, &tasks).await?;

    let mut created = Vec::new();
    let mut updated = Vec::new();

    for action in outcome.actions {
        match action {
            BoardAction::Create { task: draft } => {
                let task = task_from_draft(draft);
                state.db.insert_task(&task).await?;
                state
                    .db
                    .append_event(kinds::AI_CHAT_ACTION, Some(&task.id), Some("created"))
                    .await?;
                created.push(task);
            }
            BoardAction::Update { id, updates } => {
                let Some(mut task) = state.db.get_task(&id).await? else {
                    tracing::debug!(task_id = %id, "Chat action targets unknown task, skipping");
                    continue;
                };
                apply_sanitized_update(&mut task, updates);
                state.db.update_task(&task).await?;
                state
                    .db
                    .append_event(kinds::AI_CHAT_ACTION, Some(&task.id), Some("updated"))
                    .await?;
                updated.push(task);
            }
        }
    }

    Ok(Json(AiChatResponse {
        response: outcome.response,
        created,
        updated,
    }))
}

// ─── Draft Handling ──────────────────────────────────────────────

/// Build a stored task from a model draft, filling the UI's defaults and
/// clamping or dropping field values that would fail validation. The built
/// task must always pass `Task::validate`, or later merge updates on it
/// would be rejected.
fn task_from_draft(draft: TaskDraft) -> Task {
    Task {
        id: next_task_id(),
        // 200 matches the title length limit on Task.
        title: clamp_chars(
            draft
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| "New task".to_string()),
            200,
        ),
        summary: Some(
            draft
                .summary
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "No summary yet".to_string()),
        ),
        status: draft
            .status
            .filter(|s| STATUSES.contains(&s.as_str()))
            .unwrap_or_else(|| "backlog".to_string()),
        priority: draft
            .priority
            .filter(|p| PRIORITIES.contains(&p.as_str()))
            .unwrap_or_else(|| "medium".to_string()),
        due: draft
            .due
            .filter(|d| crate::time_utils::parse_day(d).is_some()),
        assignee: Some(draft.assignee.unwrap_or_else(|| "NA".to_string())),
        project: Some(draft.project.unwrap_or_else(|| "General".to_string())),
        progress: 0,
        tags: draft.tags,
        repeat: None,
    }
}

/// Apply a model-supplied update, clamping the title and dropping illegal
/// status/priority/due values so the merged task stays valid.
fn apply_sanitized_update(task: &mut Task, mut updates: TaskUpdate) {
    updates.title = updates
        .title
        .map(|t| clamp_chars(t, 200))
        .filter(|t| !t.trim().is_empty());
    if updates
        .status
        .as_deref()
        .is_some_and(|s| !STATUSES.contains(&s))
    {
        updates.status = None;
    }
    if updates
        .priority
        .as_deref()
        .is_some_and(|p| !PRIORITIES.contains(&p))
    {
        updates.priority = None;
    }
    if let Some(Some(due)) = &updates.due {
        if crate::time_utils::parse_day(due).is_none() {
            updates.due = None;
        }
    }
    updates.apply_to(task);
}

/// Truncate a string to at most `max` characters.
fn clamp_chars(value: String, max: usize) -> String {
    match value.char_indices().nth(max) {
        Some((idx, _)) => value[..idx].to_string(),
        None => value,
    }
}

/// Generate a UI-compatible task id (`tsk-<millis>-<seq>`).
fn next_task_id() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    static NEXT: AtomicU64 = AtomicU64::new(0);

    let seq = NEXT.fetch_add(1, Ordering::Relaxed);
    format!("tsk-{}-{}", chrono::Utc::now().timestamp_millis(), seq)
}
