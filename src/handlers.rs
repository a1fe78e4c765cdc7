//! Transcription and translation request handlers.
//!
//! Both handlers always produce a response body: failures are reported
//! inside the JSON payload, never through the HTTP status.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::asr::{ASRInterface, AudioClip};
use crate::translate::TranslateInterface;

/// Uploads shorter than this many raw bytes are assumed to hold no speech.
pub const MIN_AUDIO_BYTES: usize = 2000;

pub const AUDIO_TOO_SHORT_MESSAGE: &str = "音訊太短，無法辨識";
pub const UNRECOGNIZED_SPEECH_PLACEHOLDER: &str = "[無法辨識語音內容]";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscribeResponse {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TranscribeResponse {
    fn ok(text: String) -> Self {
        Self { text, error: None }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            text: String::new(),
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslateResponse {
    pub translation: String,
}

pub fn translation_failed_message(reason: &str) -> String {
    format!("[翻譯失敗：{}]", reason)
}

pub struct TranscriptionHandler {
    asr: Arc<dyn ASRInterface>,
    language: String,
}

impl TranscriptionHandler {
    pub fn new(asr: Arc<dyn ASRInterface>, language: String) -> Self {
        Self { asr, language }
    }

    pub async fn handle_transcribe(
        &self,
        audio_bytes: Vec<u8>,
        filename: Option<String>,
    ) -> TranscribeResponse {
        if audio_bytes.len() < MIN_AUDIO_BYTES {
            debug!("Audio upload too short: {} bytes", audio_bytes.len());
            return TranscribeResponse::failed(AUDIO_TOO_SHORT_MESSAGE);
        }

        let clip = AudioClip::new(audio_bytes, filename);
        match self.asr.transcribe(&clip, &self.language).await {
            Ok(text) => TranscribeResponse::ok(text),
            Err(e) => {
                warn!("Transcription failed [{}, transient={}]: {}", e.kind(), e.is_transient(), e);
                TranscribeResponse::failed(e.to_string())
            }
        }
    }
}

pub struct TranslationHandler {
    translator: Arc<dyn TranslateInterface>,
}

impl TranslationHandler {
    pub fn new(translator: Arc<dyn TranslateInterface>) -> Self {
        Self { translator }
    }

    pub async fn handle_translate(&self, text: &str) -> TranslateResponse {
        if text.trim().is_empty() {
            debug!("Blank text submitted for translation");
            return TranslateResponse {
                translation: UNRECOGNIZED_SPEECH_PLACEHOLDER.to_string(),
            };
        }

        let translation = match self.translator.translate(text).await {
            Ok(output) => output.trim().to_string(),
            Err(e) => {
                warn!("Translation failed [{}, transient={}]: {}", e.kind(), e.is_transient(), e);
                translation_failed_message(&e.to_string())
            }
        };
        TranslateResponse { translation }
    }
}
