use async_trait::async_trait;

use crate::error::UpstreamError;

/// File name sent to the provider when the upload has none. It only serves
/// as a format hint.
pub const DEFAULT_AUDIO_FILE_NAME: &str = "audio.webm";

/// An uploaded audio blob, held in memory for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    pub file_name: String,
}

impl AudioClip {
    pub fn new(bytes: Vec<u8>, file_name: Option<String>) -> Self {
        let file_name = file_name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_AUDIO_FILE_NAME.to_string());
        Self { bytes, file_name }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// MIME type guessed from the file extension.
    pub fn mime_type(&self) -> &'static str {
        let ext = self
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "webm" => "audio/webm",
            "ogg" | "oga" => "audio/ogg",
            "wav" => "audio/wav",
            "mp3" | "mpga" | "mpeg" => "audio/mpeg",
            "m4a" => "audio/mp4",
            "mp4" => "video/mp4",
            "flac" => "audio/flac",
            _ => "application/octet-stream",
        }
    }
}

/// Speech-to-text capability
#[async_trait]
pub trait ASRInterface: Send + Sync {
    /// Transcribe a clip, decoding it as `language` (ISO-639-1).
    async fn transcribe(&self, clip: &AudioClip, language: &str) -> Result<String, UpstreamError>;
}
