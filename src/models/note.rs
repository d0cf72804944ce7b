// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Notes grid model.

use serde::{Deserialize, Serialize};
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A sticky note on the notes grid.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Note {
    #[validate(length(min = 1, max = 64))]
    pub id: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    /// UI accent color (hex or named)
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub pinned: bool,
    /// RFC3339, set by the server on create
    #[serde(default)]
    pub created_at: Option<String>,
    /// RFC3339, set by the server on every write
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Partial update payload for `PUT /api/notes/{id}`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct NoteUpdate {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub body: Option<String>,
    pub color: Option<String>,
    pub pinned: Option<bool>,
}

impl NoteUpdate {
    /// Merge this update into an existing note.
    pub fn apply_to(self, note: &mut Note) {
        if let Some(title) = self.title {
            note.title = title;
        }
        if let Some(body) = self.body {
            note.body = Some(body);
        }
        if let Some(color) = self.color {
            note.color = Some(color);
        }
        if let Some(pinned) = self.pinned {
            note.pinned = pinned;
        }
    }
}
