use serde::{Deserialize, Serialize};

/// A table detected on a page: a grid of cell strings plus the span of
/// text lines it was recovered from, so the normalizer can re-render it
/// in place instead of duplicating the raw lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageTable {
    /// First text line (0-based, within the page) covered by the table.
    pub start_line: usize,
    /// Last text line covered by the table (inclusive).
    pub end_line: usize,
    pub rows: Vec<Vec<String>>,
}

impl PageTable {
    /// Renders the table as pipe-joined rows, one row per line.
    pub fn render(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.join("|"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// An embedded image found in a page's XObject resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageImage {
    pub name: String,
    pub width: i64,
    pub height: i64,
}

/// A link annotation target with its anchor text, when the annotation
/// carries one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLink {
    pub url: String,
    pub anchor: Option<String>,
}

/// Text recovered for a page by OCR. Confidence is advisory only; no
/// content is ever discarded based on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrText {
    pub text: String,
    pub confidence: Option<f32>,
}

/// One page of an uploaded document, as produced by the content
/// extractor and (optionally) enriched by the OCR fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// 0-based position within the document.
    pub index: usize,
    /// Native text from the PDF content stream. May be empty for
    /// scanned pages.
    pub text: String,
    pub images: Vec<PageImage>,
    pub tables: Vec<PageTable>,
    pub links: Vec<PageLink>,
    pub ocr: Option<OcrText>,
    /// True when the page itself failed to parse and was recorded as
    /// empty rather than aborting the document.
    pub degraded: bool,
}

impl Page {
    pub fn empty(index: usize) -> Self {
        Self {
            index,
            text: String::new(),
            images: Vec::new(),
            tables: Vec::new(),
            links: Vec::new(),
            ocr: None,
            degraded: true,
        }
    }

    /// Native text if present, otherwise whatever OCR recovered.
    pub fn effective_text(&self) -> &str {
        if self.text.trim().is_empty() {
            self.ocr.as_ref().map(|o| o.text.as_str()).unwrap_or("")
        } else {
            &self.text
        }
    }

    /// A page qualifies for OCR only when its native text is below the
    /// minimum-content threshold and it actually contains an image.
    pub fn needs_ocr(&self, min_native_chars: usize) -> bool {
        self.text.trim().chars().count() < min_native_chars && !self.images.is_empty()
    }
}

/// Ordered page records for one uploaded document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedDocument {
    pub page_count: usize,
    pub pages: Vec<Page>,
}

/// Single ordered text stream for a whole document, with table content
/// rendered inline and hyperlinks carried as metadata. This is the unit
/// handed to validation and AI extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedText {
    pub text: String,
    pub hyperlinks: Vec<String>,
}

impl NormalizedText {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Outcome of the resume-validity gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub is_resume: bool,
    pub score: i32,
    pub rationale: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_render_joins_cells_with_pipes() {
        let table = PageTable {
            start_line: 0,
            end_line: 1,
            rows: vec![
                vec!["Skill".to_string(), "Years".to_string()],
                vec!["Rust".to_string(), "4".to_string()],
            ],
        };
        assert_eq!(table.render(), "Skill|Years\nRust|4");
    }

    #[test]
    fn test_needs_ocr_requires_an_image() {
        let mut page = Page::empty(0);
        page.degraded = false;
        assert!(!page.needs_ocr(16));

        page.images.push(PageImage {
            name: "Im0".to_string(),
            width: 612,
            height: 792,
        });
        assert!(page.needs_ocr(16));
    }

    #[test]
    fn test_needs_ocr_skipped_when_native_text_sufficient() {
        let mut page = Page::empty(0);
        page.text = "A page with plenty of extractable native text".to_string();
        page.images.push(PageImage {
            name: "Im0".to_string(),
            width: 100,
            height: 100,
        });
        assert!(!page.needs_ocr(16));
    }

    #[test]
    fn test_effective_text_falls_back_to_ocr() {
        let mut page = Page::empty(2);
        page.ocr = Some(OcrText {
            text: "recovered".to_string(),
            confidence: Some(0.9),
        });
        assert_eq!(page.effective_text(), "recovered");

        page.text = "native".to_string();
        assert_eq!(page.effective_text(), "native");
    }
}
