// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OpenAI-compatible chat-completions client and board assistant.
//!
//! Handles:
//! - Board summaries and next-action recommendations (free text)
//! - Priority / tag suggestions and natural-language task drafts
//!   (strict-JSON prompts with fence-stripping on the way back)
//! - Assistant chat that returns `{response, actions}` for the board

use crate::error::AppError;
use crate::models::{Task, TaskUpdate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

const DEFAULT_TEMPERATURE: f32 = 0.4;
const DEFAULT_MAX_TOKENS: u32 = 400;

/// Chat-completions API client.
#[derive(Clone)]
pub struct AiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

/// One message in a chat-completions conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(ts_rs::TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

impl AiClient {
    /// Create a new client against an OpenAI-compatible endpoint.
    pub fn new(base_url: String, model: String, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            model,
            api_key,
        }
    }

    /// Run one chat completion and return the assistant text.
    pub async fn chat(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, AppError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature,
            max_tokens,
        };

        let mut request = self.http.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::AiApi(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::AiApi(format!("HTTP {}: {}", status, body)));
        }

        let data: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::AiApi(format!("JSON parse error: {}", e)))?;

        Ok(data
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .unwrap_or_default())
    }
}

// ─── Model Output Parsing ────────────────────────────────────────

/// Extract JSON from model output.
///
/// Models routinely wrap JSON in ```json fences or pad it with prose, so
/// strip a fence if present, otherwise slice from the first `{`/`[` to the
/// matching last `}`/`]`, then parse.
pub fn parse_fenced_json<T: DeserializeOwned>(content: &str) -> Result<T, AppError> {
    let text = extract_json_text(content)
        .ok_or_else(|| AppError::AiApi("Model returned no JSON".to_string()))?;
    serde_json::from_str(text)
        .map_err(|e| AppError::AiApi(format!("Model returned invalid JSON: {}", e)))
}

fn extract_json_text(content: &str) -> Option<&str> {
    let mut text = content.trim();

    if let Some(open) = text.find("```") {
        let after = &text[open + 3..];
        // Skip an optional language tag on the fence line.
        let body_start = after.find('\n').map(|i| i + 1).unwrap_or(0);
        let body = &after[body_start..];
        if let Some(close) = body.find("```") {
            text = body[..close].trim();
        }
    }

    if text.starts_with('{') || text.starts_with('[') {
        return Some(text);
    }

    // Fall back to slicing out the outermost object or array.
    for (open, close) in [('{', '}'), ('[', ']')] {
        if let (Some(start), Some(end)) = (text.find(open), text.rfind(close)) {
            if end > start {
                return Some(&text[start..=end]);
            }
        }
    }

    None
}

// ─── Board Assistant ─────────────────────────────────────────────

/// Priority suggestion from the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrioritySuggestion {
    pub id: String,
    pub priority: String,
}

/// Tag suggestion from the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagSuggestion {
    pub id: String,
    pub tags: Vec<String>,
}

/// Task fields drafted by the model (all optional; the caller fills
/// defaults and assigns an id).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub due: Option<String>,
    pub assignee: Option<String>,
    pub project: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A board mutation requested by the assistant chat.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BoardAction {
    Create { task: TaskDraft },
    Update { id: String, updates: TaskUpdate },
}

/// Assistant chat result: reply text plus any board actions.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub response: String,
    pub actions: Vec<BoardAction>,
}

#[derive(Deserialize)]
struct ChatEnvelope {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    actions: Vec<BoardAction>,
}

const CHAT_SYSTEM_PROMPT: &str = "You are a task assistant. You can create or edit tasks when asked. \
Return ONLY JSON (no extra text, no code fences) with fields: response (string) and actions (array). \
Each action is one of: \
{type:'create', task:{title,summary,status,priority,due,assignee,project,tags}} \
or {type:'update', id, updates:{title,summary,status,priority,due,assignee,project,tags}}. \
Use status in [backlog,in_progress,review,done] and priority in [critical,high,medium,low]. \
If no changes needed, return actions: [].";

/// High-level AI features over the task board.
#[derive(Clone)]
pub struct AiService {
    client: AiClient,
}

impl AiService {
    pub fn new(client: AiClient) -> Self {
        Self { client }
    }

    /// Pipe-delimited board listing used as model context.
    fn task_context(tasks: &[Task]) -> String {
        tasks
            .iter()
            .map(|task| {
                format!(
                    "{} | {} | {} | status:{} | priority:{} | due:{} | project:{} | tags:{}",
                    task.id,
                    task.title,
                    task.summary.as_deref().unwrap_or(""),
                    task.status,
                    task.priority,
                    task.due.as_deref().unwrap_or(""),
                    task.project.as_deref().unwrap_or(""),
                    task.tags.join(",")
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    async fn prompt(&self, instruction: &str, payload: &str) -> Result<String, AppError> {
        let messages = [ChatMessage::user(format!("{}\n\n{}", instruction, payload))];
        self.client
            .chat(&messages, DEFAULT_TEMPERATURE, DEFAULT_MAX_TOKENS)
            .await
    }

    /// Executive summary of the board (free text).
    pub async fn summarize_board(&self, tasks: &[Task]) -> Result<String, AppError> {
        self.prompt(
            "Summarize the task board. Return a concise executive summary in 5 bullet points.",
            &Self::task_context(tasks),
        )
        .await
    }

    /// Next best actions (free text, ordered list).
    pub async fn next_actions(&self, tasks: &[Task]) -> Result<String, AppError> {
        self.prompt(
            "Recommend next best actions. Return a short ordered list.",
            &Self::task_context(tasks),
        )
        .await
    }

    /// Priority suggestions keyed by task id.
    pub async fn suggest_priorities(
        &self,
        tasks: &[Task],
    ) -> Result<Vec<PrioritySuggestion>, AppError> {
        let content = self
            .prompt(
                "Suggest task priorities. Return ONLY JSON array of {id, priority} \
                 with priority in [critical, high, medium, low].",
                &Self::task_context(tasks),
            )
            .await?;
        parse_fenced_json(&content)
    }

    /// Tag suggestions keyed by task id.
    pub async fn suggest_tags(&self, tasks: &[Task]) -> Result<Vec<TagSuggestion>, AppError> {
        let content = self
            .prompt(
                "Tag tasks. Return ONLY JSON array of {id, tags} where tags is an array \
                 of short labels.",
                &Self::task_context(tasks),
            )
            .await?;
        parse_fenced_json(&content)
    }

    /// Turn a natural-language request into a task draft.
    pub async fn draft_task(&self, request: &str) -> Result<TaskDraft, AppError> {
        let content = self
            .prompt(
                "Convert the request into a task. Return ONLY JSON with fields: title, \
                 summary, status, priority, due, assignee, project, tags (array). \
                 Use status in [backlog,in_progress,review,done] and priority in \
                 [critical,high,medium,low].",
                request,
            )
            .await?;
        parse_fenced_json(&content)
    }

    /// Run one turn of the assistant chat over the current board.
    pub async fn chat(
        &self,
        history: &[ChatMessage],
        tasks: &[Task],
    ) -> Result<ChatOutcome, AppError> {
        let mut messages = vec![ChatMessage::user(format!(
            "{}\n\nTasks:\n{}",
            CHAT_SYSTEM_PROMPT,
            Self::task_context(tasks)
        ))];
        messages.extend_from_slice(history);

        let content = self
            .client
            .chat(&messages, DEFAULT_TEMPERATURE, DEFAULT_MAX_TOKENS)
            .await?;

        let envelope: ChatEnvelope = parse_fenced_json(&content)?;
        Ok(ChatOutcome {
            response: envelope
                .response
                .unwrap_or_else(|| "Done. I updated your tasks as requested.".to_string()),
            actions: envelope.actions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_bare_json() {
        let parsed: Vec<PrioritySuggestion> =
            parse_fenced_json(r#"[{"id": "tsk-1", "priority": "high"}]"#).unwrap();
        assert_eq!(parsed[0].priority, "high");
    }

    #[test]
    fn test_strips_json_fence() {
        let content = "```json\n[{\"id\": \"tsk-1\", \"tags\": [\"Infra\"]}]\n```";
        let parsed: Vec<TagSuggestion> = parse_fenced_json(content).unwrap();
        assert_eq!(parsed[0].tags, vec!["Infra"]);
    }

    #[test]
    fn test_slices_json_out_of_prose() {
        let content = "Sure! Here is the task:\n{\"title\": \"Ship it\"}\nLet me know.";
        let parsed: TaskDraft = parse_fenced_json(content).unwrap();
        assert_eq!(parsed.title.as_deref(), Some("Ship it"));
    }

    #[test]
    fn test_rejects_non_json() {
        let err = parse_fenced_json::<TaskDraft>("I could not help with that.").unwrap_err();
        assert!(matches!(err, AppError::AiApi(_)));
    }

    #[test]
    fn test_chat_envelope_actions() {
        let content = r#"{
            "response": "Created a task",
            "actions": [
                {"type": "create", "task": {"title": "Write release notes", "tags": []}},
                {"type": "update", "id": "tsk-2", "updates": {"status": "done", "repeat": null}}
            ]
        }"#;
        let envelope: ChatEnvelope = parse_fenced_json(content).unwrap();
        assert_eq!(envelope.actions.len(), 2);
        assert!(matches!(envelope.actions[0], BoardAction::Create { .. }));
        match &envelope.actions[1] {
            BoardAction::Update { id, updates } => {
                assert_eq!(id, "tsk-2");
                assert_eq!(updates.status.as_deref(), Some("done"));
                assert_eq!(updates.repeat, Some(None));
            }
            other => panic!("expected update action, got {:?}", other),
        }
    }
}
