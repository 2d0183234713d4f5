//! Text generation collaborator

use async_trait::async_trait;
use thiserror::Error;

use crate::message::ChatMessage;
use crate::types::{LLMChunk, LLMConfig, LLMFeature, LLMResponse};

pub type LLMStream = Box<dyn futures::Stream<Item = Result<LLMChunk, LLMError>> + Unpin + Send>;

/// External text generation provider.
///
/// The router only ever sends a single user message per call and reads
/// `LLMResponse::content` back; everything else is provider business.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        config: Option<&LLMConfig>,
    ) -> Result<LLMResponse, LLMError>;

    async fn complete_stream(
        &self,
        messages: &[ChatMessage],
        config: Option<&LLMConfig>,
    ) -> Result<LLMStream, LLMError>;

    fn provider_name(&self) -> &str;

    /// Streaming handlers fall back to `complete` when this is false for
    /// [`LLMFeature::Streaming`].
    fn supports(&self, feature: LLMFeature) -> bool;
}

#[derive(Debug, Clone, Error)]
pub enum LLMError {
    #[error("API error: {message}")]
    API {
        message: String,
        status: Option<u16>,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Rate limit exceeded: {retry_after:?}")]
    RateLimit {
        retry_after: Option<std::time::Duration>,
    },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl LLMError {
    /// Whether a caller-side retry has a chance of succeeding
    pub fn is_retryable(&self) -> bool {
        match self {
            LLMError::Network(_) | LLMError::RateLimit { .. } => true,
            LLMError::API { status, .. } => matches!(status, Some(s) if *s >= 500),
            _ => false,
        }
    }
}
