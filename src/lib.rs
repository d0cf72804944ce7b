// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Taskdeck: single-tenant task/notes dashboard backend.
//!
//! This crate provides the REST API behind the dashboard UI (kanban board,
//! notes grid, activity monitor), persisting to a local SQLite store, with
//! optional integrations to a WhatsApp-style messaging API (due reminders)
//! and an OpenAI-compatible chat-completions endpoint (board assistant).

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Db;
use services::AiService;

/// Shared application state.
///
/// The messenger is owned by the scheduler, not the request path, so it
/// does not live here.
pub struct AppState {
    pub config: Config,
    pub db: Db,
    pub ai_service: AiService,
}
