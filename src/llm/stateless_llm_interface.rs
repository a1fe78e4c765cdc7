use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::UpstreamError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
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

/// A single chat completion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

/// Interface for a stateless language model
/// Stateless means the LLM keeps no memory between calls
#[async_trait]
pub trait StatelessLLMInterface: Send + Sync {
    /// Run one completion and return the generated text
    async fn chat_completion(&self, request: ChatRequest) -> Result<String, UpstreamError>;
}
