// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Kanban task model: storage record plus REST payloads.

use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Kanban column identifiers.
pub const STATUSES: &[&str] = &["backlog", "in_progress", "review", "done"];

/// Priority levels, highest first.
pub const PRIORITIES: &[&str] = &["critical", "high", "medium", "low"];

/// A task on the board.
///
/// Ids are caller-supplied strings (the UI generates `tsk-<millis>`).
/// Due dates are plain `YYYY-MM-DD` strings.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Task {
    #[validate(length(min = 1, max = 64))]
    pub id: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[validate(custom(function = validate_status))]
    pub status: String,
    #[validate(custom(function = validate_priority))]
    pub priority: String,
    #[serde(default)]
    #[validate(custom(function = validate_due))]
    pub due: Option<String>,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0, max = 100))]
    pub progress: i64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    #[validate(nested)]
    pub repeat: Option<Repeat>,
}

/// Recurrence rule attached to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Repeat {
    #[validate(range(min = 1, max = 365))]
    pub interval: u32,
    pub unit: RepeatUnit,
    /// Last date the task may recur to (`YYYY-MM-DD`).
    /// Serialized as `endDate`, matching the UI payloads.
    #[serde(rename = "endDate", default)]
    #[validate(custom(function = validate_due))]
    pub end_date: Option<String>,
}

/// Recurrence step unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum RepeatUnit {
    Days,
    Weeks,
    Months,
}

/// Partial update payload for `PUT /api/tasks/{id}`.
///
/// Absent fields keep their stored values. `repeat` and `due` distinguish
/// "absent" from explicit `null` (the UI clears recurrence by sending
/// `repeat: null` when a task is marked done).
/// The merged task is re-validated by the handler, so no rules live here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub due: Option<Option<String>>,
    pub assignee: Option<String>,
    pub project: Option<String>,
    pub progress: Option<i64>,
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub repeat: Option<Option<Repeat>>,
}

impl TaskUpdate {
    /// Merge this update into an existing task.
    pub fn apply_to(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(summary) = self.summary {
            task.summary = Some(summary);
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(due) = self.due {
            task.due = due;
        }
        if let Some(assignee) = self.assignee {
            task.assignee = Some(assignee);
        }
        if let Some(project) = self.project {
            task.project = Some(project);
        }
        if let Some(progress) = self.progress {
            task.progress = progress;
        }
        if let Some(tags) = self.tags {
            task.tags = tags;
        }
        if let Some(repeat) = self.repeat {
            task.repeat = repeat;
        }
    }
}

/// Deserialize a field that must distinguish absent from `null`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

fn validate_status(status: &str) -> Result<(), ValidationError> {
    if STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_status"))
    }
}

fn validate_priority(priority: &str) -> Result<(), ValidationError> {
    if PRIORITIES.contains(&priority) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_priority"))
    }
}

fn validate_due(due: &str) -> Result<(), ValidationError> {
    if crate::time_utils::parse_day(due).is_some() {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_due_date"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn sample_task() -> Task {
        serde_json::from_value(serde_json::json!({
            "id": "tsk-1",
            "title": "Refresh onboarding flow",
            "summary": "Polish copy",
            "status": "in_progress",
            "priority": "high",
            "due": "2026-02-12",
            "assignee": "MA",
            "project": "Growth",
            "progress": 55,
            "tags": ["UX"],
            "repeat": {"interval": 1, "unit": "weeks", "endDate": null}
        }))
        .unwrap()
    }

    #[test]
    fn test_task_validation() {
        let mut task = sample_task();
        assert!(task.validate().is_ok());

        task.status = "doing".to_string();
        assert!(task.validate().is_err());

        task.status = "done".to_string();
        task.progress = 150;
        assert!(task.validate().is_err());
    }

    #[test]
    fn test_update_null_clears_repeat_but_absent_keeps_it() {
        let mut task = sample_task();

        let keep: TaskUpdate = serde_json::from_str(r#"{"status": "review"}"#).unwrap();
        keep.apply_to(&mut task);
        assert_eq!(task.status, "review");
        assert!(task.repeat.is_some());

        let clear: TaskUpdate =
            serde_json::from_str(r#"{"status": "done", "repeat": null}"#).unwrap();
        clear.apply_to(&mut task);
        assert_eq!(task.status, "done");
        assert!(task.repeat.is_none());
    }
}
