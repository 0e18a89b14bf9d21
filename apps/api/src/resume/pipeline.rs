//! Pipeline controller: drives one upload through extraction, OCR
//! fallback, normalization, the resume-validity gate, structured
//! extraction, and optional embedding, and always folds the outcome
//! into a `ParseResponse` envelope.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::ai::AiService;
use crate::config::Config;
use crate::errors::PipelineError;
use crate::models::resume::{ModelsUsed, ParseResponse, StructuredResume, TokenMetrics};
use crate::ocr::{OcrError, Recognizer};
use crate::pdf::{extract_document, PdfOptions};
use crate::resume::{normalizer, validator};

pub struct Pipeline {
    config: Config,
    ai: AiService,
    recognizer: Option<Arc<dyn Recognizer>>,
}

impl Pipeline {
    pub fn new(config: Config, ai: AiService, recognizer: Option<Arc<dyn Recognizer>>) -> Self {
        Self {
            config,
            ai,
            recognizer,
        }
    }

    /// Processes one uploaded PDF end to end. Never fails at the type
    /// level: every outcome, success or pipeline error, becomes an
    /// envelope carrying the process id, elapsed time and token usage.
    pub async fn run(&self, bytes: &[u8], process_id: Uuid) -> ParseResponse {
        let started = Instant::now();
        let mut metrics = TokenMetrics::default();

        match self.process(bytes, process_id, &mut metrics).await {
            Ok((resume, embeddings)) => {
                let elapsed = started.elapsed().as_secs_f64();
                info!(
                    %process_id,
                    processing_time = elapsed,
                    extraction_tokens = metrics.extraction_tokens,
                    "parse succeeded"
                );
                ParseResponse::success(
                    process_id,
                    elapsed,
                    resume,
                    embeddings,
                    metrics,
                    ModelsUsed {
                        extraction: Some(self.ai.extraction_model()),
                        embedding: self.ai.embedding_model(),
                    },
                )
            }
            Err(e) => {
                let elapsed = started.elapsed().as_secs_f64();
                warn!(%process_id, kind = e.kind.as_code(), "parse failed: {}", e.message);
                ParseResponse::failure(process_id, elapsed, e.kind, e.message, metrics)
            }
        }
    }

    async fn process(
        &self,
        bytes: &[u8],
        process_id: Uuid,
        metrics: &mut TokenMetrics,
    ) -> Result<(StructuredResume, Option<Vec<f32>>), PipelineError> {
        let options = PdfOptions {
            extract_tables: self.config.enable_table_extraction,
            extract_links: self.config.enable_link_extraction,
        };
        let mut document = extract_document(bytes, &options)
            .map_err(|e| PipelineError::malformed_document(e.to_string()))?;

        debug!(%process_id, pages = document.page_count, "document extracted");

        if self.config.enable_ocr {
            self.recover_image_pages(bytes, &mut document.pages, process_id)
                .await;
        }

        let normalized =
            normalizer::normalize(&document.pages, self.config.enable_link_extraction);

        let verdict = validator::validate(&normalized);
        if !verdict.is_resume {
            return Err(PipelineError::not_a_resume(verdict.rationale));
        }
        debug!(%process_id, score = verdict.score, "validity gate passed");

        let mut resume = self
            .ai
            .extract_resume(&normalized, metrics, process_id)
            .await
            .map_err(|e| PipelineError::new(e.kind(), e.to_string()))?;
        resume.hyperlinks = normalized.hyperlinks.clone();

        let embeddings = if self.config.generate_embeddings {
            match self.ai.embed(&normalized.text, metrics).await {
                Ok(vector) => vector,
                // Embedding is enrichment, not contract: the structured
                // result still ships without it.
                Err(e) => {
                    warn!(%process_id, "embedding generation failed, continuing: {e}");
                    None
                }
            }
        } else {
            None
        };

        Ok((resume, embeddings))
    }

    /// Runs the OCR fallback over pages that have images but next to no
    /// native text. Every failure mode degrades the page rather than
    /// failing the document; the OCR timeout is enforced per page.
    async fn recover_image_pages(
        &self,
        bytes: &[u8],
        pages: &mut [crate::models::document::Page],
        process_id: Uuid,
    ) {
        let Some(recognizer) = self.recognizer.as_ref() else {
            return;
        };

        for page in pages.iter_mut() {
            if !page.needs_ocr(self.config.min_native_chars) {
                continue;
            }

            match tokio::time::timeout(
                self.config.ocr_timeout,
                recognizer.recognize(bytes, page.index),
            )
            .await
            {
                Ok(Ok(ocr)) => {
                    debug!(%process_id, page = page.index, "OCR recovered page text");
                    page.ocr = Some(ocr);
                }
                Ok(Err(OcrError::Unavailable(reason))) => {
                    debug!(%process_id, page = page.index, "OCR unavailable, degrading: {reason}");
                    page.degraded = true;
                }
                Ok(Err(e)) => {
                    warn!(%process_id, page = page.index, "OCR failed, degrading: {e}");
                    page.degraded = true;
                }
                Err(_) => {
                    warn!(
                        %process_id,
                        page = page.index,
                        timeout = ?self.config.ocr_timeout,
                        "OCR timed out, degrading"
                    );
                    page.degraded = true;
                }
            }
        }
    }
}
