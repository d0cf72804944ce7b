// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity monitor event model.
//!
//! Events are append-only; the id is the SQLite rowid and doubles as the
//! pagination cursor ordering key.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A single entry in the activity feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Event {
    pub id: i64,
    /// What happened, e.g. `task_created`, `reminder_sent`
    pub kind: String,
    /// Task or note id the event refers to, when applicable
    pub subject_id: Option<String>,
    /// Human-readable detail line
    pub detail: Option<String>,
    /// RFC3339 UTC
    pub created_at: String,
}

/// Event kinds written by the API and scheduler.
pub mod kinds {
    pub const TASK_CREATED: &str = "task_created";
    pub const TASK_UPDATED: &str = "task_updated";
    pub const TASK_DELETED: &str = "task_deleted";
    pub const BOARD_CLEARED: &str = "board_cleared";
    pub const NOTE_CREATED: &str = "note_created";
    pub const NOTE_UPDATED: &str = "note_updated";
    pub const NOTE_DELETED: &str = "note_deleted";
    pub const AI_PRIORITIES_APPLIED: &str = "ai_priorities_applied";
    pub const AI_TAGS_APPLIED: &str = "ai_tags_applied";
    pub const AI_TASK_CREATED: &str = "ai_task_created";
    pub const AI_CHAT_ACTION: &str = "ai_chat_action";
    pub const TASK_RECURRED: &str = "task_recurred";
    pub const REMINDER_SENT: &str = "reminder_sent";
}
