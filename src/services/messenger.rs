// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! WhatsApp-style messaging client for outbound reminders.
//!
//! Graph-API shaped endpoint: `POST {base}/{phone_number_id}/messages` with
//! a bearer token. Outbound only; no webhook ingestion.

use crate::config::MessagingConfig;
use crate::error::AppError;
use serde::Serialize;

/// Messaging API client.
#[derive(Clone)]
pub struct MessengerService {
    http: reqwest::Client,
    api_url: String,
    access_token: String,
    phone_number_id: String,
    /// Default recipient for scheduler reminders.
    recipient: String,
}

#[derive(Serialize)]
struct OutboundMessage<'a> {
    messaging_product: &'static str,
    to: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    text: TextBody<'a>,
}

#[derive(Serialize)]
struct TextBody<'a> {
    body: &'a str,
}

impl MessengerService {
    /// Create a client from the configured credential group.
    pub fn new(config: &MessagingConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            access_token: config.access_token.clone(),
            phone_number_id: config.phone_number_id.clone(),
            recipient: config.recipient.clone(),
        }
    }

    /// Send a text message to the configured reminder recipient.
    pub async fn send_reminder(&self, body: &str) -> Result<(), AppError> {
        self.send_text(&self.recipient, body).await
    }

    /// Send a text message.
    pub async fn send_text(&self, to: &str, body: &str) -> Result<(), AppError> {
        let url = format!("{}/{}/messages", self.api_url, self.phone_number_id);
        let message = OutboundMessage {
            messaging_product: "whatsapp",
            to,
            kind: "text",
            text: TextBody { body },
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&message)
            .send()
            .await
            .map_err(|e| AppError::MessagingApi(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::MessagingApi(format!("HTTP {}: {}", status, body)));
        }

        Ok(())
    }
}
