use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ErrorKind;

/// One employment span as reported by the model, with the month count
/// we derived locally from its period strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkHistoryEntry {
    pub employer: Option<String>,
    pub title: Option<String>,
    /// Free-text start of the period, e.g. "Jan 2020" or "2020-01".
    pub start: Option<String>,
    /// Free-text end of the period; "Present" and friends mean current.
    pub end: Option<String>,
    /// Raw duration text as it appeared in the resume, if any.
    pub duration_text: Option<String>,
    /// Months covered by this entry. Derived from `start`/`end`; zero
    /// when the period could not be parsed.
    pub months: u32,
}

/// The output contract of the extraction pipeline.
///
/// `total_experience_in_months` and `is_fresher` are always recomputed
/// locally from the parsed work history; a value the model injects
/// directly is never trusted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StructuredResume {
    pub name: Option<String>,
    /// Deduplicated, in extraction order.
    pub emails: Vec<String>,
    pub phone_numbers: Vec<String>,
    /// Insertion order = extraction order.
    pub skills: Vec<String>,
    pub work_history: Vec<WorkHistoryEntry>,
    pub total_experience_in_months: u32,
    pub is_fresher: bool,
    /// URLs found in the document (annotations + plain text), not asked
    /// of the model.
    pub hyperlinks: Vec<String>,
}

/// Token usage accumulated over one request. Never persisted beyond the
/// response; failed attempts that reported usage still count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenMetrics {
    pub extraction_tokens: u32,
    pub embedding_tokens: u32,
}

impl TokenMetrics {
    pub fn add_extraction(&mut self, tokens: u32) {
        self.extraction_tokens = self.extraction_tokens.saturating_add(tokens);
    }

    pub fn add_embedding(&mut self, tokens: u32) {
        self.embedding_tokens = self.embedding_tokens.saturating_add(tokens);
    }
}

/// Models that served this request, for caller-side cost attribution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelsUsed {
    pub extraction: Option<String>,
    pub embedding: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
}

/// The response envelope returned to the caller for every parse
/// request, success or failure. Either `structured_data` is the full
/// post-processed structure or `error` dominates, never both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseResponse {
    pub status: bool,
    pub process_id: Uuid,
    /// Wall-clock seconds spent processing this request.
    pub processing_time: f64,
    pub structured_data: Option<StructuredResume>,
    pub embeddings: Option<Vec<f32>>,
    pub token_metrics: TokenMetrics,
    pub models_used: ModelsUsed,
    pub error: Option<ErrorBody>,
}

impl ParseResponse {
    pub fn success(
        process_id: Uuid,
        processing_time: f64,
        structured_data: StructuredResume,
        embeddings: Option<Vec<f32>>,
        token_metrics: TokenMetrics,
        models_used: ModelsUsed,
    ) -> Self {
        Self {
            status: true,
            process_id,
            processing_time,
            structured_data: Some(structured_data),
            embeddings,
            token_metrics,
            models_used,
            error: None,
        }
    }

    pub fn failure(
        process_id: Uuid,
        processing_time: f64,
        kind: ErrorKind,
        message: String,
        token_metrics: TokenMetrics,
    ) -> Self {
        Self {
            status: false,
            process_id,
            processing_time,
            structured_data: None,
            embeddings: None,
            token_metrics,
            models_used: ModelsUsed::default(),
            error: Some(ErrorBody {
                kind: kind.as_code().to_string(),
                message,
            }),
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error
            .as_ref()
            .and_then(|e| ErrorKind::from_code(&e.kind))
    }
}
