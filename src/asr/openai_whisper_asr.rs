use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::sync::Arc;
use tracing::{debug, info};

use super::interface::{ASRInterface, AudioClip};
use crate::error::UpstreamError;
use crate::openai_service::{OpenAIServiceClient, TranscriptionResponse};

/// Whisper transcription through the `/audio/transcriptions` endpoint
pub struct OpenAIWhisperASR {
    model: String,
    service: Arc<OpenAIServiceClient>,
}

impl OpenAIWhisperASR {
    pub fn new(model: String, service: Arc<OpenAIServiceClient>) -> Self {
        info!("Initialized OpenAIWhisperASR: model={}", model);
        Self { model, service }
    }

    fn build_form(&self, clip: &AudioClip, language: &str) -> Result<Form, UpstreamError> {
        let part = Part::bytes(clip.bytes.clone())
            .file_name(clip.file_name.clone())
            .mime_str(clip.mime_type())
            .map_err(|e| UpstreamError::InvalidInput(e.to_string()))?;

        Ok(Form::new()
            .part("file", part)
            .text("model", self.model.clone())
            .text("language", language.to_string()))
    }
}

#[async_trait]
impl ASRInterface for OpenAIWhisperASR {
    async fn transcribe(&self, clip: &AudioClip, language: &str) -> Result<String, UpstreamError> {
        debug!(
            "Sending {} bytes ({}) for transcription",
            clip.len(),
            clip.file_name
        );
        let form = self.build_form(clip, language)?;
        let response: TranscriptionResponse = self
            .service
            .post_multipart("audio/transcriptions", form)
            .await?;
        Ok(response.text)
    }
}
