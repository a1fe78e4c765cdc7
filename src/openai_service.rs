use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use reqwest::{multipart::Form, Client, RequestBuilder};
use tracing::debug;

use crate::config::OpenAIConfig;
use crate::error::UpstreamError;

/// Thin HTTP client for an OpenAI-compatible REST API.
///
/// Shared by the speech-to-text and chat adapters so that both reuse a
/// single connection pool and the same credential.
#[derive(Debug, Clone)]
pub struct OpenAIServiceClient {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptionResponse {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatChoiceMessage {
    pub content: Option<String>,
}

impl OpenAIServiceClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url, api_key)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config(config: &OpenAIConfig) -> Self {
        Self::new(config.base_url.clone(), config.api_key.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        form: Form,
    ) -> Result<T, UpstreamError> {
        let request = self.client.post(self.url(endpoint)).multipart(form);
        self.send(request).await
    }

    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T, UpstreamError> {
        let request = self.client.post(self.url(endpoint)).json(body);
        self.send(request).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, UpstreamError> {
        let response = request.bearer_auth(&self.api_key).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            debug!("Provider returned {}: {}", status, body);
            return Err(UpstreamError::from_status(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            UpstreamError::Unavailable(format!("unexpected response body: {}", e))
        })
    }
}
