//! Capability interfaces for the external AI providers. The
//! orchestrator never talks to a concrete provider directly, so
//! deterministic test doubles plug in at this seam.

use async_trait::async_trait;
use thiserror::Error;

/// Token usage reported by the provider for a single call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProviderUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl ProviderUsage {
    pub fn total(&self) -> u32 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

/// Raw structured-extraction reply: the model's text plus its usage.
#[derive(Debug, Clone)]
pub struct ProviderReply {
    pub text: String,
    pub usage: ProviderUsage,
}

#[derive(Debug, Clone)]
pub struct EmbeddingReply {
    pub vector: Vec<f32>,
    pub usage: ProviderUsage,
}

/// Provider failures, classified for the retry policy: transient
/// failures are retryable, rejections are not.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// Timeout, rate limit, 5xx, or network fault. Subject to retry.
    /// Carries any usage the provider reported before failing, so cost
    /// incurred by failed attempts is still accounted for.
    #[error("transient provider failure: {message}")]
    Transient {
        message: String,
        usage: ProviderUsage,
    },

    /// Explicit non-retryable rejection, e.g. a malformed request.
    #[error("provider rejected the request (status {status}): {message}")]
    Rejected { status: u16, message: String },
}

impl ProviderError {
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient {
            message: message.into(),
            usage: ProviderUsage::default(),
        }
    }
}

/// Language-model structured extraction.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, system: &str, prompt: &str) -> Result<ProviderReply, ProviderError>;

    /// Model identifier, reported in the response envelope.
    fn model(&self) -> &str;
}

/// Embedding generation. A single external call, out of core logic.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<EmbeddingReply, ProviderError>;

    fn model(&self) -> &str;
}
