use async_trait::async_trait;

use crate::error::UpstreamError;

/// English-to-Chinese translation capability
#[async_trait]
pub trait TranslateInterface: Send + Sync {
    /// Translate `text`, returning the provider output untouched.
    async fn translate(&self, text: &str) -> Result<String, UpstreamError>;
}
