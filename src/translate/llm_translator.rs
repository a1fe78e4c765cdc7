use async_trait::async_trait;
use std::sync::Arc;

use super::interface::TranslateInterface;
use crate::error::UpstreamError;
use crate::llm::{ChatMessage, ChatRequest, StatelessLLMInterface};

const PROMPT_PREFIX: &str = "請將以下英文翻譯成自然流暢的中文：";

/// Translator backed by a chat model and a fixed prompt
pub struct LLMTranslator {
    llm: Arc<dyn StatelessLLMInterface>,
    model: String,
    temperature: f32,
}

impl LLMTranslator {
    pub fn new(llm: Arc<dyn StatelessLLMInterface>, model: String, temperature: f32) -> Self {
        Self {
            llm,
            model,
            temperature,
        }
    }

    pub fn build_prompt(text: &str) -> String {
        format!("{}\n\n{}", PROMPT_PREFIX, text)
    }

    fn build_request(&self, text: &str) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(Self::build_prompt(text))],
            temperature: self.temperature,
        }
    }
}

#[async_trait]
impl TranslateInterface for LLMTranslator {
    async fn translate(&self, text: &str) -> Result<String, UpstreamError> {
        self.llm.chat_completion(self.build_request(text)).await
    }
}
