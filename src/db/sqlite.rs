// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SQLite client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Tasks (kanban board CRUD, scheduler queries)
//! - Notes (notes grid CRUD)
//! - Events (append-only activity feed)
//!
//! `tags` and `repeat` columns hold JSON text, matching the wire format the
//! dashboard UI sends.

use crate::error::AppError;
use crate::models::{Event, Note, Repeat, Task};
use crate::time_utils::format_utc_rfc3339;
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

/// SQLite database client.
#[derive(Clone)]
pub struct Db {
    pool: SqlitePool,
}

impl Db {
    /// Connect to the database and create the schema if needed.
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let pool = SqlitePoolOptions::new()
            .min_connections(1) // keeps shared-memory databases alive
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(|e| AppError::Database(format!("Failed to open database: {}", e)))?;

        let db = Self { pool };
        db.init_schema().await?;

        tracing::info!(url = database_url, "Connected to SQLite");
        Ok(db)
    }

    /// Open a fresh in-memory database (tests).
    ///
    /// Uses a uniquely named shared-cache memory database so every pool
    /// connection sees the same data while separate tests stay isolated.
    pub async fn connect_in_memory() -> Result<Self, AppError> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static NEXT: AtomicU64 = AtomicU64::new(0);

        let n = NEXT.fetch_add(1, Ordering::Relaxed);
        let url = format!("sqlite:file:memdb{}?mode=memory&cache=shared", n);
        Self::connect(&url).await
    }

    async fn init_schema(&self) -> Result<(), AppError> {
        // raw_sql: the schema script is multiple statements.
        sqlx::raw_sql(
            r#"
            CREATE TABLE IF NOT EXISTS tasks (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                summary TEXT,
                status TEXT,
                priority TEXT,
                due TEXT,
                assignee TEXT,
                project TEXT,
                progress INTEGER,
                tags TEXT,
                repeat TEXT
            );

            CREATE TABLE IF NOT EXISTS notes (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                body TEXT,
                color TEXT,
                pinned INTEGER NOT NULL DEFAULT 0,
                created_at TEXT,
                updated_at TEXT
            );

            CREATE TABLE IF NOT EXISTS events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                kind TEXT NOT NULL,
                subject_id TEXT,
                detail TEXT,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // ─── Task Operations ─────────────────────────────────────────

    /// All tasks, newest insertion first (the board's load order).
    pub async fn list_tasks(&self) -> Result<Vec<Task>, AppError> {
        let rows = sqlx::query("SELECT * FROM tasks ORDER BY rowid DESC")
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(row_to_task).collect()
    }

    /// Get a task by id.
    pub async fn get_task(&self, id: &str) -> Result<Option<Task>, AppError> {
        let row = sqlx::query("SELECT * FROM tasks WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(row_to_task).transpose()
    }

    /// Insert a task. Re-inserting an existing id is a no-op.
    pub async fn insert_task(&self, task: &Task) -> Result<(), AppError> {
        sqlx::query(
            r#"INSERT OR IGNORE INTO tasks
               (id, title, summary, status, priority, due, assignee, project, progress, tags, repeat)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&task.id)
        .bind(&task.title)
        .bind(&task.summary)
        .bind(&task.status)
        .bind(&task.priority)
        .bind(&task.due)
        .bind(&task.assignee)
        .bind(&task.project)
        .bind(task.progress)
        .bind(tags_to_json(&task.tags)?)
        .bind(repeat_to_json(task.repeat.as_ref())?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Replace a stored task with its merged state.
    pub async fn update_task(&self, task: &Task) -> Result<(), AppError> {
        sqlx::query(
            r#"UPDATE tasks SET
               title=?, summary=?, status=?, priority=?, due=?,
               assignee=?, project=?, progress=?, tags=?, repeat=?
               WHERE id=?"#,
        )
        .bind(&task.title)
        .bind(&task.summary)
        .bind(&task.status)
        .bind(&task.priority)
        .bind(&task.due)
        .bind(&task.assignee)
        .bind(&task.project)
        .bind(task.progress)
        .bind(tags_to_json(&task.tags)?)
        .bind(repeat_to_json(task.repeat.as_ref())?)
        .bind(&task.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Delete a task. Returns whether a row was removed.
    pub async fn delete_task(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every task (board clear).
    pub async fn clear_tasks(&self) -> Result<(), AppError> {
        sqlx::query("DELETE FROM tasks").execute(&self.pool).await?;
        Ok(())
    }

    /// Open tasks with a recurrence rule and a due date (scheduler).
    pub async fn list_recurring_open(&self) -> Result<Vec<Task>, AppError> {
        let rows = sqlx::query(
            "SELECT * FROM tasks
             WHERE repeat IS NOT NULL AND due IS NOT NULL AND status != 'done'",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(row_to_task).collect()
    }

    /// Open tasks due on the given `YYYY-MM-DD` day (reminders).
    pub async fn list_due_open(&self, day: &str) -> Result<Vec<Task>, AppError> {
        let rows = sqlx::query("SELECT * FROM tasks WHERE due = ? AND status != 'done'")
            .bind(day)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(row_to_task).collect()
    }

    // ─── Note Operations ─────────────────────────────────────────

    /// All notes, pinned first, most recently updated first. Timestamps are
    /// second-resolution, so rowid breaks ties for same-second writes.
    pub async fn list_notes(&self) -> Result<Vec<Note>, AppError> {
        let rows =
            sqlx::query("SELECT * FROM notes ORDER BY pinned DESC, updated_at DESC, rowid DESC")
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter().map(row_to_note).collect()
    }

    /// Get a note by id.
    pub async fn get_note(&self, id: &str) -> Result<Option<Note>, AppError> {
        let row = sqlx::query("SELECT * FROM notes WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(row_to_note).transpose()
    }

    /// Insert a note. Re-inserting an existing id is a no-op.
    pub async fn insert_note(&self, note: &Note) -> Result<(), AppError> {
        sqlx::query(
            r#"INSERT OR IGNORE INTO notes
               (id, title, body, color, pinned, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&note.id)
        .bind(&note.title)
        .bind(&note.body)
        .bind(&note.color)
        .bind(note.pinned as i64)
        .bind(&note.created_at)
        .bind(&note.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Replace a stored note with its merged state.
    pub async fn update_note(&self, note: &Note) -> Result<(), AppError> {
        sqlx::query(
            r#"UPDATE notes SET title=?, body=?, color=?, pinned=?, updated_at=?
               WHERE id=?"#,
        )
        .bind(&note.title)
        .bind(&note.body)
        .bind(&note.color)
        .bind(note.pinned as i64)
        .bind(&note.updated_at)
        .bind(&note.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Delete a note. Returns whether a row was removed.
    pub async fn delete_note(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM notes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ─── Event Operations ────────────────────────────────────────

    /// Append an event to the activity feed.
    pub async fn append_event(
        &self,
        kind: &str,
        subject_id: Option<&str>,
        detail: Option<&str>,
    ) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO events (kind, subject_id, detail, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(kind)
        .bind(subject_id)
        .bind(detail)
        .bind(format_utc_rfc3339(chrono::Utc::now()))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Events newest first, starting strictly below `before_id` when given.
    pub async fn list_events(
        &self,
        before_id: Option<i64>,
        limit: u32,
    ) -> Result<Vec<Event>, AppError> {
        let rows = sqlx::query(
            "SELECT * FROM events
             WHERE (?1 IS NULL OR id < ?1)
             ORDER BY id DESC LIMIT ?2",
        )
        .bind(before_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(row_to_event).collect()
    }
}

// ─── Row Mapping ─────────────────────────────────────────────────

fn row_to_task(row: SqliteRow) -> Result<Task, AppError> {
    let tags: Option<String> = row.try_get("tags")?;
    let repeat: Option<String> = row.try_get("repeat")?;

    Ok(Task {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        summary: row.try_get("summary")?,
        status: row.try_get("status")?,
        priority: row.try_get("priority")?,
        due: row.try_get("due")?,
        assignee: row.try_get("assignee")?,
        project: row.try_get("project")?,
        progress: row.try_get::<Option<i64>, _>("progress")?.unwrap_or(0),
        tags: tags
            .as_deref()
            .map(tags_from_json)
            .transpose()?
            .unwrap_or_default(),
        repeat: repeat.as_deref().map(repeat_from_json).transpose()?,
    })
}

fn row_to_note(row: SqliteRow) -> Result<Note, AppError> {
    Ok(Note {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        body: row.try_get("body")?,
        color: row.try_get("color")?,
        pinned: row.try_get::<i64, _>("pinned")? != 0,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_event(row: SqliteRow) -> Result<Event, AppError> {
    Ok(Event {
        id: row.try_get("id")?,
        kind: row.try_get("kind")?,
        subject_id: row.try_get("subject_id")?,
        detail: row.try_get("detail")?,
        created_at: row.try_get("created_at")?,
    })
}

fn tags_to_json(tags: &[String]) -> Result<String, AppError> {
    serde_json::to_string(tags).map_err(|e| AppError::Database(e.to_string()))
}

fn tags_from_json(raw: &str) -> Result<Vec<String>, AppError> {
    serde_json::from_str(raw)
        .map_err(|e| AppError::Database(format!("Corrupt tags column: {}", e)))
}

fn repeat_to_json(repeat: Option<&Repeat>) -> Result<Option<String>, AppError> {
    repeat
        .map(|r| serde_json::to_string(r).map_err(|e| AppError::Database(e.to_string())))
        .transpose()
}

fn repeat_from_json(raw: &str) -> Result<Repeat, AppError> {
    serde_json::from_str(raw)
        .map_err(|e| AppError::Database(format!("Corrupt repeat column: {}", e)))
}
