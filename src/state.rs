use std::sync::Arc;

use crate::asr::{ASRInterface, OpenAIWhisperASR};
use crate::config::Config;
use crate::handlers::{TranscriptionHandler, TranslationHandler};
use crate::llm::OpenAICompatibleLLM;
use crate::openai_service::OpenAIServiceClient;
use crate::translate::{LLMTranslator, TranslateInterface};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub transcription: Arc<TranscriptionHandler>,
    pub translation: Arc<TranslationHandler>,
}

impl AppState {
    /// Build the state with real provider clients sharing one connection pool.
    pub fn new(config: Config) -> Self {
        let openai = &config.openai_config;
        let service = Arc::new(OpenAIServiceClient::from_config(openai));

        let asr = Arc::new(OpenAIWhisperASR::new(
            openai.transcription_model.clone(),
            service.clone(),
        ));
        let llm = Arc::new(OpenAICompatibleLLM::new(service));
        let translator = Arc::new(LLMTranslator::new(
            llm,
            openai.chat_model.clone(),
            openai.temperature,
        ));

        Self::with_clients(config, asr, translator)
    }

    /// Build the state around caller-supplied capability clients.
    pub fn with_clients(
        config: Config,
        asr: Arc<dyn ASRInterface>,
        translator: Arc<dyn TranslateInterface>,
    ) -> Self {
        let transcription = Arc::new(TranscriptionHandler::new(
            asr,
            config.openai_config.transcription_language.clone(),
        ));
        let translation = Arc::new(TranslationHandler::new(translator));

        Self {
            config,
            transcription,
            translation,
        }
    }
}
