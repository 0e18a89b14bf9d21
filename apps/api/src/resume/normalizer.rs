//! Text normalizer: merges extractor and OCR output into one ordered
//! text stream per document.
//!
//! Merge order is page order; within a page the native/OCR text comes
//! first with detected tables re-rendered in place of the raw lines
//! they were recovered from, then a placeholder per image that produced
//! no OCR text. The output is deterministic for a given page sequence.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::document::{NormalizedText, Page};
use crate::pdf::links::find_plain_links;

/// Characters allowed to survive cleanup. Everything else becomes a
/// space, matching the original cleaning rule plus the brackets used by
/// the image placeholder.
fn disallowed_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"[^a-zA-Z0-9\s@+./:,\-_|\[\]]").expect("cleanup pattern must compile")
    })
}

fn whitespace_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern must compile"))
}

/// Merges pages into a single normalized text stream plus a
/// deduplicated, sorted hyperlink set.
pub fn normalize(pages: &[Page], harvest_text_links: bool) -> NormalizedText {
    let mut merged = String::new();

    for page in pages {
        let page_text = render_page(page);
        if !page_text.trim().is_empty() {
            merged.push_str(&page_text);
            merged.push('\n');
        }
    }

    let cleaned = clean_text(&merged);

    let mut hyperlinks: Vec<String> = pages
        .iter()
        .flat_map(|p| p.links.iter().map(|l| l.url.clone()))
        .collect();
    if harvest_text_links {
        hyperlinks.extend(find_plain_links(&cleaned));
    }
    hyperlinks.sort();
    hyperlinks.dedup();

    NormalizedText {
        text: cleaned,
        hyperlinks,
    }
}

/// Renders one page: text with tables spliced in at their line spans,
/// then placeholders for images OCR could not read.
fn render_page(page: &Page) -> String {
    let text = page.effective_text();
    let mut out = String::new();

    // Table spans refer to native text lines; when OCR text replaced an
    // empty native page there are no tables to splice.
    let use_tables = !page.text.trim().is_empty() && !page.tables.is_empty();
    if use_tables {
        let lines: Vec<&str> = text.lines().collect();
        let mut idx = 0;
        while idx < lines.len() {
            if let Some(table) = page.tables.iter().find(|t| t.start_line == idx) {
                out.push_str(&table.render());
                out.push('\n');
                idx = table.end_line + 1;
            } else {
                out.push_str(lines[idx]);
                out.push('\n');
                idx += 1;
            }
        }
    } else {
        out.push_str(text);
        out.push('\n');
    }

    let ocr_recovered = page
        .ocr
        .as_ref()
        .map(|o| !o.text.trim().is_empty())
        .unwrap_or(false);
    if !ocr_recovered {
        // An unreadable image must not silently vanish: its absence
        // would look like a missing section.
        for _ in &page.images {
            out.push_str("[image]\n");
        }
    }

    out
}

/// Strips disallowed symbols and collapses all whitespace runs into
/// single spaces.
fn clean_text(text: &str) -> String {
    let stripped = disallowed_pattern().replace_all(text, " ");
    whitespace_pattern()
        .replace_all(&stripped, " ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::{OcrText, PageImage, PageLink, PageTable};

    fn text_page(index: usize, text: &str) -> Page {
        Page {
            index,
            text: text.to_string(),
            images: Vec::new(),
            tables: Vec::new(),
            links: Vec::new(),
            ocr: None,
            degraded: false,
        }
    }

    #[test]
    fn test_pages_merge_in_order() {
        let pages = vec![text_page(0, "first page"), text_page(1, "second page")];
        let out = normalize(&pages, false);
        assert_eq!(out.text, "first page second page");
    }

    #[test]
    fn test_normalization_is_deterministic() {
        let mut page = text_page(0, "Jane Doe\nSkills: Rust");
        page.links.push(PageLink {
            url: "https://github.com/jdoe".to_string(),
            anchor: None,
        });
        let pages = vec![page, text_page(1, "Experience at Initech")];
        let a = normalize(&pages, true);
        let b = normalize(&pages, true);
        assert_eq!(a, b);
    }

    #[test]
    fn test_tables_are_rendered_in_place_not_duplicated() {
        let mut page = text_page(0, "Skills\nRust      4\nPython    6\nEnd");
        page.tables.push(PageTable {
            start_line: 1,
            end_line: 2,
            rows: vec![
                vec!["Rust".to_string(), "4".to_string()],
                vec!["Python".to_string(), "6".to_string()],
            ],
        });
        let out = normalize(&[page], false);
        assert_eq!(out.text, "Skills Rust|4 Python|6 End");
    }

    #[test]
    fn test_image_without_ocr_text_leaves_placeholder() {
        let mut page = text_page(0, "some text");
        page.images.push(PageImage {
            name: "Im0".to_string(),
            width: 10,
            height: 10,
        });
        let out = normalize(&[page], false);
        assert!(out.text.contains("[image]"));
    }

    #[test]
    fn test_ocr_text_replaces_placeholder() {
        let mut page = text_page(0, "");
        page.images.push(PageImage {
            name: "Im0".to_string(),
            width: 10,
            height: 10,
        });
        page.ocr = Some(OcrText {
            text: "recovered scanned text".to_string(),
            confidence: Some(0.8),
        });
        let out = normalize(&[page], false);
        assert!(out.text.contains("recovered scanned text"));
        assert!(!out.text.contains("[image]"));
    }

    #[test]
    fn test_empty_document_yields_empty_text_not_error() {
        let out = normalize(&[], false);
        assert!(out.is_empty());
        assert!(out.hyperlinks.is_empty());
    }

    #[test]
    fn test_hyperlinks_merged_deduped_and_sorted() {
        let mut page = text_page(0, "see github.com/jdoe for code");
        page.links.push(PageLink {
            url: "https://github.com/jdoe".to_string(),
            anchor: None,
        });
        page.links.push(PageLink {
            url: "https://jdoe.dev".to_string(),
            anchor: Some("portfolio".to_string()),
        });
        let out = normalize(&[page], true);
        assert_eq!(
            out.hyperlinks,
            vec![
                "https://github.com/jdoe".to_string(),
                "https://jdoe.dev".to_string(),
            ]
        );
    }

    #[test]
    fn test_disallowed_symbols_are_stripped() {
        let page = text_page(0, "Jane § Doe ™ jane@example.com");
        let out = normalize(&[page], false);
        assert_eq!(out.text, "Jane Doe jane@example.com");
    }
}
