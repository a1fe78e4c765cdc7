use thiserror::Error;

/// Failure kinds reported by the remote AI provider clients.
///
/// Handlers turn these into the string shapes the HTTP API returns; the
/// kind itself is kept so callers can tell a transient outage from a
/// request the provider will never accept.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UpstreamError {
    /// The request could not be assembled locally.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Transport failure, 429/5xx, or a response body we could not use.
    #[error("upstream unavailable: {0}")]
    Unavailable(String),

    /// The provider answered with a non-retryable error status.
    #[error("upstream rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },
}

impl UpstreamError {
    pub fn is_transient(&self) -> bool {
        matches!(self, UpstreamError::Unavailable(_))
    }

    /// Short tag used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::InvalidInput(_) => "invalid_input",
            UpstreamError::Unavailable(_) => "upstream_unavailable",
            UpstreamError::Rejected { .. } => "upstream_rejected",
        }
    }

    /// Classify a non-success HTTP status from the provider.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = provider_message(body);
        if status == 429 || status >= 500 {
            UpstreamError::Unavailable(format!("status {}: {}", status, message))
        } else {
            UpstreamError::Rejected { status, message }
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return UpstreamError::from_status(status.as_u16(), &err.to_string());
        }
        if err.is_builder() {
            return UpstreamError::InvalidInput(err.to_string());
        }
        UpstreamError::Unavailable(err.to_string())
    }
}

/// Pull `error.message` out of an OpenAI-style error body, falling back to
/// the raw body text.
fn provider_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(|m| m.to_string())
        })
        .unwrap_or_else(|| body.trim().to_string())
}
