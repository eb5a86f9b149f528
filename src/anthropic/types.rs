//! Request and response types for the Anthropic Messages API.
//!
//! Every struct derives `Serialize` and `Deserialize` so it maps one-to-one
//! onto the JSON body of the `v1/messages` endpoint.

use serde::{Deserialize, Serialize};

/// Body of a `/v1/messages` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesRequest {
    /// Model identifier taken verbatim from the job descriptor.
    pub model: String,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Sampling temperature. Omitted from the body when `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Conversation turns; a job sends exactly one user turn.
    pub messages: Vec<Message>,
}

impl MessagesRequest {
    /// Builds a single-turn request carrying `prompt` as the user message.
    pub fn single_turn(model: &str, max_tokens: u32, temperature: f64, prompt: &str) -> Self {
        Self {
            model: model.to_string(),
            max_tokens,
            temperature: Some(temperature),
            messages: vec![Message {
                role: "user".into(),
                content: prompt.to_string(),
            }],
        }
    }
}

/// One conversation turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// "user" or "assistant".
    pub role: String,
    pub content: String,
}

/// Body of a successful `/v1/messages` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesResponse {
    /// Request identifier assigned by the API.
    pub id: String,
    /// Generated content blocks.
    pub content: Vec<ContentBlock>,
    /// Model that produced the response.
    pub model: String,
    /// Why generation stopped ("end_turn", "max_tokens", ...).
    pub stop_reason: Option<String>,
    pub usage: Usage,
}

impl MessagesResponse {
    /// Concatenates every text block in order. `None` when there is no text block.
    pub fn text(&self) -> Option<String> {
        let mut blocks = self
            .content
            .iter()
            .filter(|b| b.content_type == "text")
            .peekable();
        blocks.peek()?;
        Some(blocks.map(|b| b.text.as_str()).collect())
    }
}

/// A content block. The `content_type` field is serialized as `"type"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub content_type: String,
    /// Text of the block; empty for non-text blocks.
    #[serde(default)]
    pub text: String,
}

/// Token accounting for one call. Informational only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl Usage {
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}
