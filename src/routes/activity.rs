// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity monitor routes: the append-only event feed behind the
//! dashboard's activity panel, newest first with cursor pagination.

use crate::error::Result;
use crate::models::Event;
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const MAX_PER_PAGE: u32 = 100;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/activity", get(get_activity))
}

#[derive(Deserialize)]
struct ActivityQuery {
    /// Cursor for forward pagination (opaque token).
    cursor: Option<String>,
    /// Items per page
    #[serde(default = "default_per_page")]
    per_page: u32,
}

fn default_per_page() -> u32 {
    50
}

fn parse_cursor(cursor: Option<&str>) -> Result<Option<i64>> {
    cursor
        .map(|raw| {
            let invalid_cursor =
                || crate::error::AppError::BadRequest("Invalid 'cursor' parameter".to_string());

            let decoded = URL_SAFE_NO_PAD.decode(raw).map_err(|_| invalid_cursor())?;
            let decoded_str = std::str::from_utf8(&decoded).map_err(|_| invalid_cursor())?;
            decoded_str.parse::<i64>().map_err(|_| invalid_cursor())
        })
        .transpose()
}

fn encode_cursor(event_id: i64) -> String {
    URL_SAFE_NO_PAD.encode(event_id.to_string())
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivityResponse {
    pub events: Vec<Event>,
    pub per_page: u32,
    pub next_cursor: Option<String>,
}

/// Get the activity feed, newest first.
async fn get_activity(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ActivityQuery>,
) -> Result<Json<ActivityResponse>> {
    let limit = params.per_page.min(MAX_PER_PAGE).max(1);
    let before_id = parse_cursor(params.cursor.as_deref())?;

    // Fetch one extra item to determine if another page is available.
    let mut events = state.db.list_events(before_id, limit + 1).await?;

    let has_more = events.len() > limit as usize;
    if has_more {
        events.truncate(limit as usize);
    }

    let next_cursor = if has_more {
        events.last().map(|e| encode_cursor(e.id))
    } else {
        None
    };

    Ok(Json(ActivityResponse {
        events,
        per_page: limit,
        next_cursor,
    }))
}
