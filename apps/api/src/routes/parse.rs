//! POST /api/v1/resume/parse
//!
//! Multipart upload boundary. Media-type and size prechecks run here,
//! before any parsing; everything past them is the pipeline's job. All
//! outcomes, precheck failures included, ship the same response
//! envelope keyed by process id.

use std::time::Instant;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use crate::errors::{AppError, ErrorKind};
use crate::models::resume::{ParseResponse, TokenMetrics};
use crate::state::AppState;

const PDF_MAGIC: &[u8] = b"%PDF";

struct Upload {
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Bytes,
}

pub async fn handle_parse(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let process_id = Uuid::new_v4();
    let started = Instant::now();

    let upload = read_file_field(&mut multipart).await?;
    info!(
        %process_id,
        file_name = upload.file_name.as_deref().unwrap_or("<unnamed>"),
        size = upload.bytes.len(),
        "upload received"
    );

    if let Some(kind) = precheck(&upload, state.config.max_file_size) {
        let message = match kind {
            ErrorKind::UnsupportedMediaType => "only PDF uploads are accepted".to_string(),
            ErrorKind::PayloadTooLarge => format!(
                "upload of {} bytes exceeds the {} byte limit",
                upload.bytes.len(),
                state.config.max_file_size
            ),
            _ => kind.as_code().to_string(),
        };
        let envelope = ParseResponse::failure(
            process_id,
            started.elapsed().as_secs_f64(),
            kind,
            message,
            TokenMetrics::default(),
        );
        return Ok((kind.status(), Json(envelope)).into_response());
    }

    let response = state.pipeline.run(&upload.bytes, process_id).await;
    let status = response
        .error_kind()
        .map(|k| k.status())
        .unwrap_or(StatusCode::OK);

    Ok((status, Json(response)).into_response())
}

/// Pulls the `file` field out of the multipart stream. Decoding faults
/// and a missing field are boundary errors, not pipeline outcomes.
async fn read_file_field(multipart: &mut Multipart) -> Result<Upload, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("failed to read upload: {e}")))?;

        return Ok(Upload {
            file_name,
            content_type,
            bytes,
        });
    }

    Err(AppError::BadRequest(
        "multipart field 'file' is required".to_string(),
    ))
}

/// Order matters: media type is checked before size, so a 50 MB zip is
/// reported as the wrong type, not as too large.
fn precheck(upload: &Upload, max_file_size: usize) -> Option<ErrorKind> {
    if !is_pdf_upload(
        upload.file_name.as_deref(),
        upload.content_type.as_deref(),
        &upload.bytes,
    ) {
        return Some(ErrorKind::UnsupportedMediaType);
    }
    if upload.bytes.len() > max_file_size {
        return Some(ErrorKind::PayloadTooLarge);
    }
    None
}

/// A PDF claim (extension or content type) backed by the `%PDF` magic.
fn is_pdf_upload(file_name: Option<&str>, content_type: Option<&str>, bytes: &[u8]) -> bool {
    let claims_pdf = file_name
        .map(|n| n.to_lowercase().ends_with(".pdf"))
        .unwrap_or(false)
        || content_type
            .map(|c| c.to_lowercase().contains("pdf"))
            .unwrap_or(false);

    claims_pdf && bytes.starts_with(PDF_MAGIC)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: Option<&str>, content_type: Option<&str>, bytes: &[u8]) -> Upload {
        Upload {
            file_name: name.map(str::to_string),
            content_type: content_type.map(str::to_string),
            bytes: Bytes::copy_from_slice(bytes),
        }
    }

    #[test]
    fn test_pdf_by_extension_and_magic_accepted() {
        let u = upload(Some("resume.pdf"), None, b"%PDF-1.7 ...");
        assert_eq!(precheck(&u, 1024), None);
    }

    #[test]
    fn test_pdf_by_content_type_and_magic_accepted() {
        let u = upload(Some("resume"), Some("application/pdf"), b"%PDF-1.4");
        assert_eq!(precheck(&u, 1024), None);
    }

    #[test]
    fn test_docx_rejected_as_unsupported() {
        let u = upload(Some("resume.docx"), None, b"PK\x03\x04");
        assert_eq!(precheck(&u, 1024), Some(ErrorKind::UnsupportedMediaType));
    }

    #[test]
    fn test_pdf_extension_without_magic_rejected() {
        let u = upload(Some("resume.pdf"), None, b"<html>not a pdf</html>");
        assert_eq!(precheck(&u, 1024), Some(ErrorKind::UnsupportedMediaType));
    }

    #[test]
    fn test_oversize_rejected_after_media_type() {
        let big = [b"%PDF".as_slice(), &vec![0u8; 2048]].concat();
        let u = upload(Some("resume.pdf"), None, &big);
        assert_eq!(precheck(&u, 1024), Some(ErrorKind::PayloadTooLarge));

        // Wrong type wins over wrong size.
        let big_zip = [b"PK\x03\x04".as_slice(), &vec![0u8; 2048]].concat();
        let u = upload(Some("resume.zip"), None, &big_zip);
        assert_eq!(precheck(&u, 1024), Some(ErrorKind::UnsupportedMediaType));
    }
}
