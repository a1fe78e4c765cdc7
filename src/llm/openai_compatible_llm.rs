use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use super::stateless_llm_interface::{ChatRequest, StatelessLLMInterface};
use crate::error::UpstreamError;
use crate::openai_service::{ChatCompletionResponse, OpenAIServiceClient};

/// OpenAI compatible LLM implementation
pub struct OpenAICompatibleLLM {
    service: Arc<OpenAIServiceClient>,
}

impl OpenAICompatibleLLM {
    pub fn new(service: Arc<OpenAIServiceClient>) -> Self {
        info!("Initialized OpenAICompatibleLLM: base_url={}", service.base_url());
        Self { service }
    }
}

#[async_trait]
impl StatelessLLMInterface for OpenAICompatibleLLM {
    async fn chat_completion(&self, request: ChatRequest) -> Result<String, UpstreamError> {
        debug!(
            "Chat completion: model={}, messages={}, temperature={}",
            request.model,
            request.messages.len(),
            request.temperature
        );
        let response: ChatCompletionResponse =
            self.service.post_json("chat/completions", &request).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| UpstreamError::Unavailable("response contained no message content".to_string()))
    }
}
