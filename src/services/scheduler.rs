// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! One-minute polling scheduler.
//!
//! Each tick:
//! 1. Catches recurring tasks up: open tasks with a repeat rule whose due
//!    date slipped into the past get their due date stepped forward.
//! 2. Sends due reminders: open tasks due today produce one message per
//!    (task, due date) through the messenger, when one is configured.
//!
//! A tick never takes the server down; per-task failures are logged and
//! skipped.

use crate::db::Db;
use crate::models::event::kinds;
use crate::models::Task;
use crate::services::MessengerService;
use crate::time_utils::{catch_up_due_date, format_day, parse_day, today_utc};
use chrono::NaiveDate;
use dashmap::DashMap;
use std::time::Duration;

const TICK_INTERVAL: Duration = Duration::from_secs(60);

/// Background scheduler over the task store.
pub struct Scheduler {
    db: Db,
    messenger: Option<MessengerService>,
    /// Reminders already sent this process, keyed by task id with the due
    /// date they covered. Pruned to the current day on every reminder pass.
    /// A restart may re-send at most one reminder per task, which is
    /// acceptable for a single-tenant dashboard.
    sent_reminders: DashMap<String, String>,
}

impl Scheduler {
    pub fn new(db: Db, messenger: Option<MessengerService>) -> Self {
        Self {
            db,
            messenger,
            sent_reminders: DashMap::new(),
        }
    }

    /// Run forever, ticking once a minute.
    pub async fn run(self) {
        let mut interval = tokio::time::interval(TICK_INTERVAL);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            self.tick(today_utc()).await;
        }
    }

    /// One scheduler pass for the given day. Public for tests.
    pub async fn tick(&self, today: NaiveDate) {
        if let Err(e) = self.advance_recurring(today).await {
            tracing::warn!(error = %e, "Recurrence pass failed");
        }
        if let Err(e) = self.send_due_reminders(today).await {
            tracing::warn!(error = %e, "Reminder pass failed");
        }
    }

    /// Step overdue recurring tasks forward to their next due date.
    pub async fn advance_recurring(&self, today: NaiveDate) -> crate::error::Result<()> {
        let tasks = self.db.list_recurring_open().await?;

        for mut task in tasks {
            let Some(next) = next_due_date(&task, today) else {
                continue;
            };

            let next_str = format_day(next);
            tracing::info!(
                task_id = %task.id,
                from = task.due.as_deref().unwrap_or(""),
                to = %next_str,
                "Advancing recurring task"
            );

            task.due = Some(next_str.clone());
            if let Err(e) = self.db.update_task(&task).await {
                tracing::warn!(task_id = %task.id, error = %e, "Failed to advance recurring task");
                continue;
            }

            self.db
                .append_event(
                    kinds::TASK_RECURRED,
                    Some(&task.id),
                    Some(&format!("\"{}\" rescheduled to {}", task.title, next_str)),
                )
                .await
                .ok();
        }

        Ok(())
    }

    /// Send one reminder per open task due today.
    pub async fn send_due_reminders(&self, today: NaiveDate) -> crate::error::Result<()> {
        let Some(messenger) = &self.messenger else {
            return Ok(());
        };

        let day = format_day(today);
        // Entries for earlier days are stale, including those for tasks that
        // have since been deleted.
        self.sent_reminders.retain(|_, sent_for| *sent_for == day);

        let due_tasks = self.db.list_due_open(&day).await?;

        for task in due_tasks {
            let already_sent = self
                .sent_reminders
                .get(&task.id)
                .is_some_and(|sent_for| *sent_for == day);
            if already_sent {
                continue;
            }

            let body = format!(
                "Reminder: \"{}\" ({} priority) is due today{}",
                task.title,
                task.priority,
                task.project
                    .as_deref()
                    .map(|p| format!(" [{}]", p))
                    .unwrap_or_default()
            );

            if let Err(e) = messenger.send_reminder(&body).await {
                tracing::warn!(task_id = %task.id, error = %e, "Failed to send reminder");
                continue;
            }

            self.sent_reminders.insert(task.id.clone(), day.clone());
            self.db
                .append_event(kinds::REMINDER_SENT, Some(&task.id), Some(&body))
                .await
                .ok();
            tracing::info!(task_id = %task.id, "Reminder sent");
        }

        Ok(())
    }
}

/// Where a recurring task's due date should move to, if anywhere.
fn next_due_date(task: &Task, today: NaiveDate) -> Option<NaiveDate> {
    let repeat = task.repeat.as_ref()?;
    let due = parse_day(task.due.as_deref()?)?;
    let end_date = repeat.end_date.as_deref().and_then(parse_day);

    catch_up_due_date(due, today, repeat.interval, repeat.unit, end_date)
}
