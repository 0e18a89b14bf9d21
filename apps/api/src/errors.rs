use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// The pipeline error taxonomy. Each kind maps to a stable wire code
/// and an HTTP status so callers can distinguish user error from
/// provider failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unparseable PDF, a user error.
    MalformedDocument,
    /// Upload is not a PDF.
    UnsupportedMediaType,
    /// Upload exceeds the configured maximum size.
    PayloadTooLarge,
    /// Validator verdict was false, not a server fault.
    NotAResume,
    /// Provider rejected the request outright (non-retryable).
    ExtractionRejected,
    /// Provider reply failed schema parsing twice (initial + repair).
    ExtractionMalformed,
    /// Transient provider failures exhausted the retry budget.
    ExtractionUnavailable,
    /// Caller aborted the request.
    Cancelled,
}

impl ErrorKind {
    pub fn as_code(&self) -> &'static str {
        match self {
            ErrorKind::MalformedDocument => "MALFORMED_DOCUMENT",
            ErrorKind::UnsupportedMediaType => "UNSUPPORTED_MEDIA_TYPE",
            ErrorKind::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ErrorKind::NotAResume => "NOT_A_RESUME",
            ErrorKind::ExtractionRejected => "EXTRACTION_REJECTED",
            ErrorKind::ExtractionMalformed => "EXTRACTION_MALFORMED",
            ErrorKind::ExtractionUnavailable => "EXTRACTION_UNAVAILABLE",
            ErrorKind::Cancelled => "CANCELLED",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "MALFORMED_DOCUMENT" => Some(ErrorKind::MalformedDocument),
            "UNSUPPORTED_MEDIA_TYPE" => Some(ErrorKind::UnsupportedMediaType),
            "PAYLOAD_TOO_LARGE" => Some(ErrorKind::PayloadTooLarge),
            "NOT_A_RESUME" => Some(ErrorKind::NotAResume),
            "EXTRACTION_REJECTED" => Some(ErrorKind::ExtractionRejected),
            "EXTRACTION_MALFORMED" => Some(ErrorKind::ExtractionMalformed),
            "EXTRACTION_UNAVAILABLE" => Some(ErrorKind::ExtractionUnavailable),
            "CANCELLED" => Some(ErrorKind::Cancelled),
            _ => None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ErrorKind::MalformedDocument => StatusCode::BAD_REQUEST,
            ErrorKind::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ErrorKind::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ErrorKind::NotAResume => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::ExtractionRejected => StatusCode::BAD_GATEWAY,
            ErrorKind::ExtractionMalformed => StatusCode::BAD_GATEWAY,
            ErrorKind::ExtractionUnavailable => StatusCode::BAD_GATEWAY,
            // The caller is gone; the status is only ever logged.
            ErrorKind::Cancelled => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A terminal pipeline failure: taxonomy kind plus a human-readable
/// message. The process id is attached by the response envelope.
#[derive(Debug, Clone, Error)]
#[error("{}: {message}", kind.as_code())]
pub struct PipelineError {
    pub kind: ErrorKind,
    pub message: String,
}

impl PipelineError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn malformed_document(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedDocument, message)
    }

    pub fn not_a_resume(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotAResume, message)
    }
}

/// Boundary-level error type for route handlers: failures that occur
/// before a pipeline run produces an envelope (multipart decoding,
/// internal faults). Implements `IntoResponse` so handlers can return
/// `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
