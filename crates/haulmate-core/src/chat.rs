//! AI chat assistant client.
//!
//! A thin pass-through to an external chat-completion endpoint: one system
//! prompt plus one user message per request, no retries, no local history.
//! At most one request is logically in flight; a new request or an explicit
//! [`ChatClient::cancel`] supersedes the previous one, whose result is then
//! discarded and reported as [`ChatError::Cancelled`].

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

/// Default system prompt handed to the assistant.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant for professional truck \
drivers. Answer briefly and practically, with US trucking regulations and road life in mind.";

/// Error type for chat requests.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("the chat service rejected the API key")]
    Unauthorized,
    #[error("the chat service rate limit was reached, try again shortly")]
    RateLimited,
    #[error("the chat service returned status {0}")]
    Status(u16),
    #[error("failed to reach the chat service: {0}")]
    Transport(String),
    #[error("the chat response carried no reply text")]
    MissingReply,
    #[error("the request was superseded by a newer one")]
    Cancelled,
}

/// Endpoint configuration for the chat client.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub system_prompt: String,
}

impl ChatConfig {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: "gpt-4o-mini".to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

/// One transcript entry handed to consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    /// "user" or "assistant".
    pub role: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role("assistant", content)
    }

    fn with_role(role: &str, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: role.to_string(),
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Stateless client for the chat-completion endpoint.
pub struct ChatClient {
    config: ChatConfig,
    generation: AtomicU64,
}

impl ChatClient {
    pub fn new(config: ChatConfig) -> Self {
        Self {
            config,
            generation: AtomicU64::new(0),
        }
    }

    /// Abort the in-flight request, if any.
    ///
    /// The superseded request's result is discarded when it lands.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Send one user message and return the assistant's reply.
    ///
    /// Calling `send` while an earlier request is still in flight cancels
    /// the earlier one.
    pub fn send(&self, user_message: &str) -> Result<ChatMessage, ChatError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": self.config.system_prompt },
                { "role": "user", "content": user_message },
            ],
        });

        let response = ureq::post(&self.config.endpoint)
            .set("Authorization", &format!("Bearer {}", self.config.api_key))
            .send_json(body)
            .map_err(classify_request_error)?;

        let payload: Value = response
            .into_json()
            .map_err(|e| ChatError::Transport(e.to_string()))?;

        if !self.is_current(generation) {
            return Err(ChatError::Cancelled);
        }

        Ok(ChatMessage::assistant(extract_reply(&payload)?))
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }
}

fn classify_request_error(error: ureq::Error) -> ChatError {
    match error {
        ureq::Error::Status(401, _) => ChatError::Unauthorized,
        ureq::Error::Status(429, _) => ChatError::RateLimited,
        ureq::Error::Status(code, _) => ChatError::Status(code),
        ureq::Error::Transport(t) => ChatError::Transport(t.to_string()),
    }
}

/// Pull the reply text out of `choices[0].message.content`.
fn extract_reply(payload: &Value) -> Result<String, ChatError> {
    payload
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(|content| content.as_str())
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or(ChatError::MissingReply)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_reply_finds_nested_content() {
        let payload = json!({
            "choices": [
                { "message": { "role": "assistant", "content": "  Keep your logbook current.  " } }
            ]
        });

        assert_eq!(
            extract_reply(&payload).unwrap(),
            "Keep your logbook current."
        );
    }

    #[test]
    fn extract_reply_rejects_missing_content() {
        assert!(matches!(
            extract_reply(&json!({"choices": []})),
            Err(ChatError::MissingReply)
        ));
        assert!(matches!(
            extract_reply(&json!({"error": "nope"})),
            Err(ChatError::MissingReply)
        ));
        assert!(matches!(
            extract_reply(&json!({"choices": [{"message": {"content": ""}}]})),
            Err(ChatError::MissingReply)
        ));
    }

    #[test]
    fn cancel_supersedes_older_generation() {
        let client = ChatClient::new(ChatConfig::new("http://localhost:0", "key"));

        let generation = client.generation.fetch_add(1, Ordering::SeqCst) + 1;
        assert!(client.is_current(generation));

        client.cancel();
        assert!(!client.is_current(generation));
    }

    #[test]
    fn newer_send_supersedes_older_generation() {
        let client = ChatClient::new(ChatConfig::new("http://localhost:0", "key"));

        let first = client.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let second = client.generation.fetch_add(1, Ordering::SeqCst) + 1;

        assert!(!client.is_current(first));
        assert!(client.is_current(second));
    }

    #[test]
    fn message_constructors_set_roles() {
        let question = ChatMessage::user("How long can I drive today?");
        let answer = ChatMessage::assistant("Up to 11 hours within a 14-hour window.");

        assert_eq!(question.role, "user");
        assert_eq!(answer.role, "assistant");
        assert!(!question.id.is_empty());
        assert_ne!(question.id, answer.id);
    }
}
