// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use std::sync::Arc;
use taskdeck::config::Config;
use taskdeck::db::Db;
use taskdeck::routes::create_router;
use taskdeck::services::{ai::AiClient, AiService};
use taskdeck::AppState;
use tower::ServiceExt;

/// Create a test app backed by a fresh in-memory database.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub async fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let db = Db::connect_in_memory()
        .await
        .expect("Failed to open in-memory database");

    let ai_client = AiClient::new(
        config.ai_base_url.clone(),
        config.ai_model.clone(),
        config.ai_api_key.clone(),
    );
    let ai_service = AiService::new(ai_client);

    let state = Arc::new(AppState {
        config,
        db,
        ai_service,
    });

    (create_router(state.clone()), state)
}

/// Send a request with an optional JSON body and return status + parsed body.
#[allow(dead_code)]
pub async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };

    (status, json)
}

/// A minimal valid task payload.
#[allow(dead_code)]
pub fn task_payload(id: &str, title: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": title,
        "summary": "No summary yet",
        "status": "backlog",
        "priority": "medium",
        "due": "2026-02-20",
        "assignee": "NA",
        "project": "General",
        "progress": 0,
        "tags": [],
        "repeat": null
    })
}
