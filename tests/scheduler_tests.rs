// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Scheduler tests: recurrence catch-up against a real in-memory store.

use chrono::NaiveDate;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use taskdeck::config::MessagingConfig;
use taskdeck::db::Db;
use taskdeck::models::Task;
use taskdeck::services::{MessengerService, Scheduler};

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn recurring_task(id: &str, due: &str, status: &str, repeat: serde_json::Value) -> Task {
    serde_json::from_value(json!({
        "id": id,
        "title": "Weekly report",
        "summary": "Send status mail",
        "status": status,
        "priority": "medium",
        "due": due,
        "assignee": "NA",
        "project": "Ops",
        "progress": 0,
        "tags": [],
        "repeat": repeat
    }))
    .unwrap()
}

async fn test_db() -> Db {
    Db::connect_in_memory().await.expect("in-memory db")
}

/// Spawn a stub messaging API that counts the messages it receives.
/// Returns its base URL and the hit counter.
async fn spawn_stub_messaging_api() -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    let app = axum::Router::new().route(
        "/{phone_number_id}/messages",
        axum::routing::post(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                axum::Json(json!({"messages": [{"id": "wamid.test"}]}))
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let addr = listener.local_addr().expect("stub addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub server");
    });

    (format!("http://{}", addr), hits)
}

fn test_messenger(api_url: String) -> MessengerService {
    MessengerService::new(&MessagingConfig {
        api_url,
        access_token: "test-token".to_string(),
        phone_number_id: "12345".to_string(),
        recipient: "15551234567".to_string(),
    })
}

#[tokio::test]
async fn test_overdue_recurring_task_advances() {
    let db = test_db().await;
    let task = recurring_task(
        "tsk-1",
        "2026-02-01",
        "backlog",
        json!({"interval": 1, "unit": "weeks", "endDate": null}),
    );
    db.insert_task(&task).await.unwrap();

    let scheduler = Scheduler::new(db.clone(), None);
    scheduler.tick(day("2026-02-11")).await;

    let stored = db.get_task("tsk-1").await.unwrap().unwrap();
    // 02-01 -> 02-08 -> 02-15: first due date not in the past.
    assert_eq!(stored.due.as_deref(), Some("2026-02-15"));

    let events = db.list_events(None, 10).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, "task_recurred");
    assert_eq!(events[0].subject_id.as_deref(), Some("tsk-1"));
}

#[tokio::test]
async fn test_done_tasks_never_recur() {
    let db = test_db().await;
    let task = recurring_task(
        "tsk-1",
        "2026-02-01",
        "done",
        json!({"interval": 1, "unit": "weeks", "endDate": null}),
    );
    db.insert_task(&task).await.unwrap();

    let scheduler = Scheduler::new(db.clone(), None);
    scheduler.tick(day("2026-02-11")).await;

    let stored = db.get_task("tsk-1").await.unwrap().unwrap();
    assert_eq!(stored.due.as_deref(), Some("2026-02-01"));
    assert!(db.list_events(None, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_recurrence_stops_at_end_date() {
    let db = test_db().await;
    let task = recurring_task(
        "tsk-1",
        "2026-01-01",
        "backlog",
        json!({"interval": 1, "unit": "weeks", "endDate": "2026-01-20"}),
    );
    db.insert_task(&task).await.unwrap();

    let scheduler = Scheduler::new(db.clone(), None);
    scheduler.tick(day("2026-03-01")).await;

    let stored = db.get_task("tsk-1").await.unwrap().unwrap();
    // Last step that stays within the end date.
    assert_eq!(stored.due.as_deref(), Some("2026-01-15"));
}

#[tokio::test]
async fn test_future_due_dates_are_untouched() {
    let db = test_db().await;
    let task = recurring_task(
        "tsk-1",
        "2026-03-01",
        "backlog",
        json!({"interval": 1, "unit": "days", "endDate": null}),
    );
    db.insert_task(&task).await.unwrap();

    let scheduler = Scheduler::new(db.clone(), None);
    scheduler.tick(day("2026-02-11")).await;

    let stored = db.get_task("tsk-1").await.unwrap().unwrap();
    assert_eq!(stored.due.as_deref(), Some("2026-03-01"));
    assert!(db.list_events(None, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_ticks_are_idempotent_once_caught_up() {
    let db = test_db().await;
    let task = recurring_task(
        "tsk-1",
        "2026-02-01",
        "backlog",
        json!({"interval": 2, "unit": "days", "endDate": null}),
    );
    db.insert_task(&task).await.unwrap();

    let scheduler = Scheduler::new(db.clone(), None);
    scheduler.tick(day("2026-02-11")).await;
    scheduler.tick(day("2026-02-11")).await;

    let stored = db.get_task("tsk-1").await.unwrap().unwrap();
    assert_eq!(stored.due.as_deref(), Some("2026-02-11"));

    // Only the first tick moved the date.
    let events = db.list_events(None, 10).await.unwrap();
    assert_eq!(events.len(), 1);
}

#[tokio::test]
async fn test_reminder_sent_once_per_task_and_day() {
    let db = test_db().await;
    let task = recurring_task("tsk-1", "2026-02-11", "backlog", json!(null));
    db.insert_task(&task).await.unwrap();

    let (api_url, hits) = spawn_stub_messaging_api().await;
    let scheduler = Scheduler::new(db.clone(), Some(test_messenger(api_url)));

    scheduler.tick(day("2026-02-11")).await;
    scheduler.tick(day("2026-02-11")).await;

    // One outbound message despite two ticks on the same day.
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    let events = db.list_events(None, 10).await.unwrap();
    let reminders: Vec<_> = events
        .iter()
        .filter(|e| e.kind == "reminder_sent")
        .collect();
    assert_eq!(reminders.len(), 1);
    assert_eq!(reminders[0].subject_id.as_deref(), Some("tsk-1"));
}

#[tokio::test]
async fn test_reminder_resends_when_due_date_moves() {
    let db = test_db().await;
    let task = recurring_task("tsk-1", "2026-02-11", "backlog", json!(null));
    db.insert_task(&task).await.unwrap();

    let (api_url, hits) = spawn_stub_messaging_api().await;
    let scheduler = Scheduler::new(db.clone(), Some(test_messenger(api_url)));

    scheduler.tick(day("2026-02-11")).await;
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    // The task slips to the next day; it is due again and reminds again.
    let mut moved = db.get_task("tsk-1").await.unwrap().unwrap();
    moved.due = Some("2026-02-12".to_string());
    db.update_task(&moved).await.unwrap();

    scheduler.tick(day("2026-02-12")).await;
    scheduler.tick(day("2026-02-12")).await;

    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_no_reminders_without_messenger() {
    let db = test_db().await;
    let mut task = recurring_task(
        "tsk-1",
        "2026-02-11",
        "backlog",
        json!({"interval": 1, "unit": "weeks", "endDate": null}),
    );
    task.repeat = None;
    db.insert_task(&task).await.unwrap();

    let scheduler = Scheduler::new(db.clone(), None);
    scheduler.tick(day("2026-02-11")).await;

    assert!(db.list_events(None, 10).await.unwrap().is_empty());
}
