// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Everything has a local-development default except the messaging
//! integration, which is enabled only when its credentials are present.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// SQLite connection string
    pub database_url: String,
    /// Frontend URL for CORS
    pub frontend_url: String,

    // --- LLM integration (OpenAI-compatible chat completions) ---
    /// Base URL of the chat-completions API
    pub ai_base_url: String,
    /// Model name passed in requests
    pub ai_model: String,
    /// Optional bearer token (local models usually need none)
    pub ai_api_key: Option<String>,

    /// WhatsApp-style messaging integration, when configured.
    pub messaging: Option<MessagingConfig>,
}

/// Credentials for the outbound messaging integration.
#[derive(Debug, Clone)]
pub struct MessagingConfig {
    /// Graph-style API base URL
    pub api_url: String,
    /// Bearer token
    pub access_token: String,
    /// Sender phone number ID (path segment of the /messages endpoint)
    pub phone_number_id: String,
    /// Recipient phone number for due reminders
    pub recipient: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "5174".to_string())
                .parse()
                .unwrap_or(5174),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:data/tasks.db?mode=rwc".to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),

            ai_base_url: env::var("AI_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:1234/v1".to_string()),
            ai_model: env::var("AI_MODEL").unwrap_or_else(|_| "local-model".to_string()),
            ai_api_key: env::var("AI_API_KEY")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),

            messaging: Self::messaging_from_env()?,
        })
    }

    /// Load the messaging credential group.
    ///
    /// The group is keyed off `WHATSAPP_ACCESS_TOKEN`: absent means the
    /// integration is disabled, present means the rest is required.
    fn messaging_from_env() -> Result<Option<MessagingConfig>, ConfigError> {
        let access_token = match env::var("WHATSAPP_ACCESS_TOKEN") {
            Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
            _ => return Ok(None),
        };

        Ok(Some(MessagingConfig {
            api_url: env::var("WHATSAPP_API_URL")
                .unwrap_or_else(|_| "https://graph.facebook.com/v19.0".to_string()),
            access_token,
            phone_number_id: env::var("WHATSAPP_PHONE_NUMBER_ID")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("WHATSAPP_PHONE_NUMBER_ID"))?,
            recipient: env::var("WHATSAPP_RECIPIENT")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("WHATSAPP_RECIPIENT"))?,
        }))
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            port: 5174,
            database_url: "sqlite::memory:".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            ai_base_url: "http://localhost:1234/v1".to_string(),
            ai_model: "local-model".to_string(),
            ai_api_key: None,
            messaging: None,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
