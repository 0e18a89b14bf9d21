//! OpenAI-compatible embeddings client. One vector per call; the
//! orchestrator decides whether embedding runs at all.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ai::provider::{Embedder, EmbeddingReply, ProviderError, ProviderUsage};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const EMBEDDING_MODEL: &str = "text-embedding-ada-002";

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
    usage: EmbeddingUsage,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingUsage {
    prompt_tokens: u32,
}

pub struct OpenAiEmbedder {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAiEmbedder {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self> {
        anyhow::ensure!(!api_key.trim().is_empty(), "missing OpenAI API key");
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            endpoint: format!("{DEFAULT_BASE_URL}/embeddings"),
            api_key,
            model: EMBEDDING_MODEL.to_string(),
        })
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<EmbeddingReply, ProviderError> {
        // Provider guidance: newlines degrade embedding quality.
        let input = text.replace('\n', " ");
        let request = EmbeddingRequest {
            model: &self.model,
            input: vec![&input],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::transient(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::transient(format!("status {status}: {body}")));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Rejected {
                status: status.as_u16(),
                message: body,
            });
        }

        let mut parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::transient(format!("unreadable reply body: {e}")))?;

        let vector = match parsed.data.pop() {
            Some(data) => data.embedding,
            None => {
                return Err(ProviderError::transient(
                    "embedding reply had no data".to_string(),
                ))
            }
        };

        Ok(EmbeddingReply {
            vector,
            usage: ProviderUsage {
                input_tokens: parsed.usage.prompt_tokens,
                output_tokens: 0,
            },
        })
    }

    fn model(&self) -> &str {
        &self.model
    }
}
