//! OCR fallback for image-based pages.
//!
//! Uses the system `pdftoppm` (Poppler) and `tesseract` binaries via a
//! scratch directory. Both are optional at runtime: a missing binary
//! degrades the page to its native (empty) text instead of failing the
//! document.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::TempDir;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

use crate::models::document::OcrText;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("OCR backend unavailable: {0}")]
    Unavailable(String),

    #[error("OCR failed: {0}")]
    Failed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Capability interface for optical character recognition of one
/// document page. Implementations must be safe to call concurrently.
#[async_trait]
pub trait Recognizer: Send + Sync {
    /// Recovers text for the page at `page_index` (0-based) of the
    /// given PDF. Confidence in the result is advisory only.
    async fn recognize(&self, pdf_bytes: &[u8], page_index: usize) -> Result<OcrText, OcrError>;
}

/// Production recognizer driving `pdftoppm` + `tesseract`.
pub struct TesseractRecognizer {
    language: String,
    render_dpi: u32,
}

impl TesseractRecognizer {
    pub fn new() -> Self {
        Self {
            language: "eng".to_string(),
            render_dpi: 300,
        }
    }

    /// Renders a single page to PNG inside the scratch dir and returns
    /// the image path.
    async fn render_page(
        &self,
        pdf_path: &Path,
        page_number: u32,
        out_dir: &Path,
    ) -> Result<PathBuf, OcrError> {
        let page_arg = page_number.to_string();
        let prefix = out_dir.join("page");

        let status = Command::new("pdftoppm")
            .args(["-png", "-r", &self.render_dpi.to_string()])
            .args(["-f", &page_arg, "-l", &page_arg])
            .arg(pdf_path)
            .arg(&prefix)
            .status()
            .await;

        match status {
            Ok(s) if s.success() => find_page_image(out_dir, page_number).ok_or_else(|| {
                OcrError::Failed(format!("no image produced for page {page_number}"))
            }),
            Ok(_) => Err(OcrError::Failed(
                "pdftoppm failed to render the page".to_string(),
            )),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(OcrError::Unavailable(
                "pdftoppm not found (install poppler-utils)".to_string(),
            )),
            Err(e) => Err(OcrError::Io(e)),
        }
    }

    async fn run_tesseract(&self, image_path: &Path) -> Result<String, OcrError> {
        let output = Command::new("tesseract")
            .arg(image_path)
            .arg("stdout")
            .args(["-l", &self.language])
            .output()
            .await;

        match output {
            Ok(out) if out.status.success() => Ok(String::from_utf8_lossy(&out.stdout).into_owned()),
            Ok(out) => Err(OcrError::Failed(format!(
                "tesseract failed: {}",
                String::from_utf8_lossy(&out.stderr)
            ))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(OcrError::Unavailable(
                "tesseract not found (install tesseract-ocr)".to_string(),
            )),
            Err(e) => Err(OcrError::Io(e)),
        }
    }
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Recognizer for TesseractRecognizer {
    async fn recognize(&self, pdf_bytes: &[u8], page_index: usize) -> Result<OcrText, OcrError> {
        let scratch = TempDir::new()?;
        let pdf_path = scratch.path().join("document.pdf");
        tokio::fs::write(&pdf_path, pdf_bytes).await?;

        // pdftoppm pages are 1-based.
        let page_number = page_index as u32 + 1;
        let image_path = self
            .render_page(&pdf_path, page_number, scratch.path())
            .await?;
        let text = self.run_tesseract(&image_path).await?;

        debug!(
            page = page_index,
            chars = text.len(),
            "OCR recovered text"
        );

        Ok(OcrText {
            text,
            // The plain-text tesseract invocation reports no word
            // confidences; leave it advisory-absent.
            confidence: None,
        })
    }
}

/// pdftoppm zero-pads page numbers in output names depending on the
/// document's page count; probe the plausible widths.
fn find_page_image(dir: &Path, page_number: u32) -> Option<PathBuf> {
    for width in [1usize, 2, 3, 4] {
        let candidate = dir.join(format!("page-{page_number:0width$}.png"));
        if candidate.exists() {
            return Some(candidate);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_page_image_probes_padding_widths() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("page-03.png"), b"png").unwrap();
        let found = find_page_image(dir.path(), 3).unwrap();
        assert!(found.ends_with("page-03.png"));
        assert!(find_page_image(dir.path(), 4).is_none());
    }
}
