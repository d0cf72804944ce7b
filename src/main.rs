// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Taskdeck API Server
//!
//! Backs the dashboard UI (kanban board, notes grid, activity monitor)
//! with a SQLite store, a one-minute reminder/recurrence scheduler, and
//! optional AI and messaging integrations.

use std::sync::Arc;
use taskdeck::{
    config::Config,
    db::Db,
    services::{ai::AiClient, AiService, MessengerService, Scheduler},
    AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Taskdeck API");

    // Open SQLite store (the default URL lives under data/)
    if config.database_url.starts_with("sqlite:data/") {
        std::fs::create_dir_all("data").ok();
    }
    let db = Db::connect(&config.database_url)
        .await
        .expect("Failed to open database");

    // AI assistant (chat-completions pass-through)
    let ai_client = AiClient::new(
        config.ai_base_url.clone(),
        config.ai_model.clone(),
        config.ai_api_key.clone(),
    );
    let ai_service = AiService::new(ai_client);
    tracing::info!(model = %config.ai_model, "AI service initialized");

    // Messaging integration (due reminders), when configured
    let messenger = config.messaging.as_ref().map(MessengerService::new);
    if messenger.is_some() {
        tracing::info!("Messaging integration enabled");
    } else {
        tracing::info!("Messaging integration disabled (no credentials)");
    }

    // Background scheduler: recurrence catch-up and due reminders
    let scheduler = Scheduler::new(db.clone(), messenger);
    tokio::spawn(scheduler.run());
    tracing::info!("Scheduler started");

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        ai_service,
    });

    // Build router
    let app = taskdeck::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("taskdeck=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
