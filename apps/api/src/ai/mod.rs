//! Extraction orchestrator: converts normalized resume text into a
//! `StructuredResume` via one externally-delegated language-model call,
//! with admission control, retry/backoff, one bounded repair re-prompt,
//! and token accounting around that call. All post-processing (duration
//! math, fresher detection) is local and deterministic.

pub mod anthropic;
pub mod openai;
pub mod prompts;
pub mod provider;
pub mod retry;

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::errors::ErrorKind;
use crate::models::document::NormalizedText;
use crate::models::resume::{StructuredResume, TokenMetrics, WorkHistoryEntry};
use crate::resume::duration;

use provider::{Embedder, Extractor, ProviderError, ProviderReply, ProviderUsage};
use retry::{RetrySchedule, RetryState};

#[derive(Debug, Error)]
pub enum AiError {
    /// The provider explicitly refused the request; retrying is futile.
    #[error("provider rejected the extraction request: {0}")]
    Rejected(String),

    /// The reply failed schema parsing twice (initial + repair).
    #[error("extraction reply failed schema parsing: {0}")]
    Malformed(String),

    /// Transient failures exhausted the retry budget.
    #[error("extraction unavailable after {attempts} attempt(s): {message}")]
    Unavailable { attempts: u32, message: String },
}

impl AiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AiError::Rejected(_) => ErrorKind::ExtractionRejected,
            AiError::Malformed(_) => ErrorKind::ExtractionMalformed,
            AiError::Unavailable { .. } => ErrorKind::ExtractionUnavailable,
        }
    }
}

/// Orchestrator settings, lifted out of `Config` so tests can construct
/// a service without touching the environment.
#[derive(Debug, Clone)]
pub struct AiSettings {
    pub max_retries: u32,
    pub base_backoff: Duration,
    pub call_timeout: Duration,
    pub max_concurrent_calls: usize,
    pub max_input_chars: usize,
    pub fresher_threshold_months: u32,
}

impl From<&Config> for AiSettings {
    fn from(config: &Config) -> Self {
        Self {
            max_retries: config.max_retries,
            base_backoff: Duration::from_secs(1),
            call_timeout: config.request_timeout,
            max_concurrent_calls: config.max_concurrent_extractions,
            max_input_chars: config.max_input_chars,
            fresher_threshold_months: config.fresher_threshold_months,
        }
    }
}

/// What the model is asked for: the `StructuredResume` fields minus the
/// derived ones. Lenient defaults so a missing array is an empty array,
/// not a parse failure.
#[derive(Debug, Deserialize)]
struct RawExtraction {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    emails: Vec<String>,
    #[serde(default)]
    phone_numbers: Vec<String>,
    #[serde(default)]
    skills: Vec<String>,
    #[serde(default)]
    work_history: Vec<RawWorkEntry>,
}

#[derive(Debug, Deserialize)]
struct RawWorkEntry {
    #[serde(default)]
    employer: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    start: Option<String>,
    #[serde(default)]
    end: Option<String>,
    #[serde(default)]
    duration: Option<String>,
}

/// The single entry point for all language-model calls in the service.
pub struct AiService {
    extractor: Arc<dyn Extractor>,
    embedder: Option<Arc<dyn Embedder>>,
    /// Process-wide admission gate: bounds concurrent outbound provider
    /// calls regardless of how many requests are in flight.
    gate: Semaphore,
    schedule: RetrySchedule,
    call_timeout: Duration,
    max_input_chars: usize,
    fresher_threshold_months: u32,
}

impl AiService {
    pub fn new(
        extractor: Arc<dyn Extractor>,
        embedder: Option<Arc<dyn Embedder>>,
        settings: AiSettings,
    ) -> Self {
        Self {
            extractor,
            embedder,
            gate: Semaphore::new(settings.max_concurrent_calls.max(1)),
            schedule: RetrySchedule::new(settings.max_retries, settings.base_backoff),
            call_timeout: settings.call_timeout,
            max_input_chars: settings.max_input_chars,
            fresher_threshold_months: settings.fresher_threshold_months,
        }
    }

    pub fn extraction_model(&self) -> String {
        self.extractor.model().to_string()
    }

    pub fn embedding_model(&self) -> Option<String> {
        self.embedder.as_ref().map(|e| e.model().to_string())
    }

    /// Runs the full extraction call: truncate, prompt, retry, parse
    /// with one repair re-prompt, then deterministic post-processing.
    pub async fn extract_resume(
        &self,
        input: &NormalizedText,
        metrics: &mut TokenMetrics,
        process_id: Uuid,
    ) -> Result<StructuredResume, AiError> {
        let (text, truncated) = self.truncate(&input.text);
        if truncated {
            warn!(
                %process_id,
                limit = self.max_input_chars,
                "input text exceeds budget, truncated before extraction"
            );
        }

        let prompt = prompts::extraction_prompt(text);
        let reply = self.call_extract(&prompt, metrics).await?;

        let raw = match parse_reply(&reply.text) {
            Ok(raw) => raw,
            Err(first_error) => {
                debug!(%process_id, "schema parse failed, issuing repair re-prompt: {first_error}");
                let repair = prompts::repair_prompt(&reply.text, &first_error);
                let repaired = self.call_extract(&repair, metrics).await?;
                parse_reply(&repaired.text).map_err(AiError::Malformed)?
            }
        };

        Ok(self.post_process(raw, Utc::now().date_naive()))
    }

    /// Generates an embedding for the text, if an embedder is
    /// configured. `Ok(None)` means embedding is disabled.
    pub async fn embed(
        &self,
        text: &str,
        metrics: &mut TokenMetrics,
    ) -> Result<Option<Vec<f32>>, AiError> {
        let Some(embedder) = self.embedder.as_ref() else {
            debug!("embedding generation is disabled");
            return Ok(None);
        };

        let reply = self
            .with_retry(
                || embedder.embed(text),
                |usage| metrics.add_embedding(usage.total()),
            )
            .await?;
        metrics.add_embedding(reply.usage.total());
        Ok(Some(reply.vector))
    }

    async fn call_extract(
        &self,
        prompt: &str,
        metrics: &mut TokenMetrics,
    ) -> Result<ProviderReply, AiError> {
        let reply = self
            .with_retry(
                || self.extractor.extract(prompts::EXTRACTION_SYSTEM, prompt),
                |usage| metrics.add_extraction(usage.total()),
            )
            .await?;
        metrics.add_extraction(reply.usage.total());
        Ok(reply)
    }

    /// Drives the retry state machine around one provider operation.
    /// `record_usage` is invoked for usage reported by failed attempts;
    /// the successful reply's usage is the caller's to record.
    async fn with_retry<T, Fut>(
        &self,
        mut op: impl FnMut() -> Fut,
        mut record_usage: impl FnMut(ProviderUsage),
    ) -> Result<T, AiError>
    where
        Fut: std::future::Future<Output = Result<T, ProviderError>>,
    {
        let mut state = self.schedule.start();
        let mut last_message = String::from("no attempt made");

        loop {
            state = match state {
                RetryState::Idle => self.schedule.start(),
                RetryState::Attempting { attempt } => {
                    let _permit = self.gate.acquire().await.map_err(|_| {
                        AiError::Unavailable {
                            attempts: attempt,
                            message: "admission gate closed".to_string(),
                        }
                    })?;
                    match tokio::time::timeout(self.call_timeout, op()).await {
                        Ok(Ok(value)) => return Ok(value),
                        Ok(Err(ProviderError::Rejected { status, message })) => {
                            return Err(AiError::Rejected(format!("status {status}: {message}")))
                        }
                        Ok(Err(ProviderError::Transient { message, usage })) => {
                            warn!(attempt, "transient provider failure: {message}");
                            record_usage(usage);
                            last_message = message;
                            self.schedule.after_transient_failure(attempt)
                        }
                        Err(_) => {
                            warn!(attempt, "provider call timed out");
                            last_message = format!("timed out after {:?}", self.call_timeout);
                            self.schedule.after_transient_failure(attempt)
                        }
                    }
                }
                RetryState::Backoff {
                    next_attempt,
                    delay,
                } => {
                    tokio::time::sleep(delay).await;
                    RetryState::Attempting {
                        attempt: next_attempt,
                    }
                }
                RetryState::Failed => {
                    return Err(AiError::Unavailable {
                        attempts: self.schedule.max_attempts,
                        message: last_message,
                    })
                }
            };
        }
    }

    /// Char-boundary-safe truncation to the configured input budget.
    fn truncate<'a>(&self, text: &'a str) -> (&'a str, bool) {
        match text.char_indices().nth(self.max_input_chars) {
            Some((byte_index, _)) => (&text[..byte_index], true),
            None => (text, false),
        }
    }

    /// Local, deterministic post-processing. The derived fields are
    /// always recomputed here; anything the model might have injected
    /// for them is ignored by the schema.
    fn post_process(&self, raw: RawExtraction, today: NaiveDate) -> StructuredResume {
        let name = raw
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty() && n.to_lowercase() != "not available");

        let work_history: Vec<WorkHistoryEntry> = raw
            .work_history
            .into_iter()
            .map(|entry| {
                let months =
                    duration::span_months(entry.start.as_deref(), entry.end.as_deref(), today);
                WorkHistoryEntry {
                    employer: entry.employer,
                    title: entry.title,
                    start: entry.start,
                    end: entry.end,
                    duration_text: entry.duration,
                    months,
                }
            })
            .collect();

        let total_experience_in_months: u32 = work_history.iter().map(|e| e.months).sum();
        let is_fresher = work_history.is_empty()
            || total_experience_in_months < self.fresher_threshold_months;

        StructuredResume {
            name,
            emails: dedupe_preserving_order(raw.emails),
            phone_numbers: dedupe_preserving_order(raw.phone_numbers),
            skills: dedupe_preserving_order(raw.skills),
            work_history,
            total_experience_in_months,
            is_fresher,
            // Hyperlinks come from the document, not the model; the
            // pipeline fills them in.
            hyperlinks: Vec::new(),
        }
    }
}

fn dedupe_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let trimmed = item.trim().to_string();
        if !trimmed.is_empty() && !out.contains(&trimmed) {
            out.push(trimmed);
        }
    }
    out
}

/// Parses a model reply into the raw schema. Strips code fences first;
/// if direct parsing fails, falls back to the outermost brace span
/// before giving up.
fn parse_reply(text: &str) -> Result<RawExtraction, String> {
    let text = strip_json_fences(text);
    match serde_json::from_str(text) {
        Ok(raw) => Ok(raw),
        Err(direct_error) => {
            let start = text.find('{');
            let end = text.rfind('}');
            if let (Some(start), Some(end)) = (start, end) {
                if start < end {
                    if let Ok(raw) = serde_json::from_str(&text[start..=end]) {
                        return Ok(raw);
                    }
                }
            }
            Err(direct_error.to_string())
        }
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
