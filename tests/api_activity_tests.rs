// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity feed tests: event recording and cursor pagination.

use axum::http::StatusCode;
use serde_json::json;

mod common;

#[tokio::test]
async fn test_board_changes_show_up_in_feed() {
    let (app, _state) = common::create_test_app().await;

    common::send(&app, "POST", "/api/tasks", Some(common::task_payload("tsk-1", "One"))).await;
    common::send(
        &app,
        "PUT",
        "/api/tasks/tsk-1",
        Some(json!({"status": "done", "repeat": null})),
    )
    .await;
    common::send(&app, "DELETE", "/api/tasks/tsk-1", None).await;

    let (status, body) = common::send(&app, "GET", "/api/activity", None).await;
    assert_eq!(status, StatusCode::OK);

    let events = body["events"].as_array().unwrap();
    assert_eq!(events.len(), 3);
    // Newest first.
    assert_eq!(events[0]["kind"], "task_deleted");
    assert_eq!(events[1]["kind"], "task_updated");
    assert_eq!(events[2]["kind"], "task_created");
    assert_eq!(events[2]["subject_id"], "tsk-1");
    assert!(body["next_cursor"].is_null());
}

#[tokio::test]
async fn test_feed_pagination_with_cursor() {
    let (app, _state) = common::create_test_app().await;

    for i in 0..5 {
        let id = format!("tsk-{}", i);
        common::send(&app, "POST", "/api/tasks", Some(common::task_payload(&id, "Task"))).await;
    }

    let (status, first_page) =
        common::send(&app, "GET", "/api/activity?per_page=2", None).await;
    assert_eq!(status, StatusCode::OK);

    let events = first_page["events"].as_array().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["subject_id"], "tsk-4");
    assert_eq!(events[1]["subject_id"], "tsk-3");

    let cursor = first_page["next_cursor"].as_str().unwrap();
    let (status, second_page) = common::send(
        &app,
        "GET",
        &format!("/api/activity?per_page=2&cursor={}", cursor),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let events = second_page["events"].as_array().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["subject_id"], "tsk-2");
    assert_eq!(events[1]["subject_id"], "tsk-1");

    // Last page has one event and no cursor.
    let cursor = second_page["next_cursor"].as_str().unwrap();
    let (_, last_page) = common::send(
        &app,
        "GET",
        &format!("/api/activity?per_page=2&cursor={}", cursor),
        None,
    )
    .await;
    let events = last_page["events"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["subject_id"], "tsk-0");
    assert!(last_page["next_cursor"].is_null());
}

#[tokio::test]
async fn test_invalid_cursor_is_rejected() {
    let (app, _state) = common::create_test_app().await;

    let (status, body) =
        common::send(&app, "GET", "/api/activity?cursor=%21%21not-a-cursor", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}
