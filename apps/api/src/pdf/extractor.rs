//! Native PDF parsing via `lopdf`: per-page text, embedded image
//! detection, whitespace-aligned table detection, and link annotations.

use lopdf::{Dictionary, Document, Object};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::document::{ExtractedDocument, Page, PageImage, PageLink};
use crate::pdf::links::sanitize_url;
use crate::pdf::tables::detect_tables;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("failed to parse PDF: {0}")]
    Malformed(String),
}

/// Feature switches forwarded from the configuration surface.
#[derive(Debug, Clone, Copy)]
pub struct PdfOptions {
    pub extract_tables: bool,
    pub extract_links: bool,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            extract_tables: true,
            extract_links: true,
        }
    }
}

/// Parses raw PDF bytes into ordered page records.
///
/// Unparseable input fails with `PdfError::Malformed`; a single corrupt
/// page does not: it is recorded as an empty degraded page so the rest
/// of the document still flows through the pipeline.
pub fn extract_document(bytes: &[u8], options: &PdfOptions) -> Result<ExtractedDocument, PdfError> {
    let doc = Document::load_mem(bytes).map_err(|e| PdfError::Malformed(e.to_string()))?;

    let page_map = doc.get_pages();
    let mut pages = Vec::with_capacity(page_map.len());

    for (index, (page_number, page_id)) in page_map.iter().enumerate() {
        match extract_page(&doc, index, *page_number, *page_id, options) {
            Ok(page) => pages.push(page),
            Err(e) => {
                warn!(page = index, "page failed to parse, recording as empty: {e}");
                pages.push(Page::empty(index));
            }
        }
    }

    Ok(ExtractedDocument {
        page_count: pages.len(),
        pages,
    })
}

fn extract_page(
    doc: &Document,
    index: usize,
    page_number: u32,
    page_id: lopdf::ObjectId,
    options: &PdfOptions,
) -> Result<Page, PdfError> {
    let text = doc
        .extract_text(&[page_number])
        .map_err(|e| PdfError::Malformed(e.to_string()))?;

    let page_dict = doc
        .get_dictionary(page_id)
        .map_err(|e| PdfError::Malformed(e.to_string()))?;

    let images = detect_images(doc, page_dict);
    let links = if options.extract_links {
        extract_link_annotations(doc, page_dict)
    } else {
        Vec::new()
    };

    let tables = if options.extract_tables {
        let lines: Vec<&str> = text.lines().collect();
        detect_tables(&lines)
    } else {
        Vec::new()
    };

    debug!(
        page = index,
        chars = text.len(),
        images = images.len(),
        tables = tables.len(),
        links = links.len(),
        "extracted page"
    );

    Ok(Page {
        index,
        text,
        images,
        tables,
        links,
        ocr: None,
        degraded: false,
    })
}

/// Follows reference chains to the concrete object. Bounded so a
/// reference cycle in a hostile file cannot loop forever.
fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    let mut current = obj;
    for _ in 0..8 {
        match current {
            Object::Reference(id) => match doc.get_object(*id) {
                Ok(next) => current = next,
                Err(_) => break,
            },
            _ => break,
        }
    }
    current
}

fn resolve_dict<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    match resolve(doc, obj) {
        Object::Dictionary(d) => Some(d),
        Object::Stream(s) => Some(&s.dict),
        _ => None,
    }
}

fn dict_i64(dict: &Dictionary, key: &[u8]) -> i64 {
    match dict.get(key) {
        Ok(Object::Integer(i)) => *i,
        _ => 0,
    }
}

/// Walks `/Resources -> /XObject` and records every `/Image` stream.
fn detect_images(doc: &Document, page_dict: &Dictionary) -> Vec<PageImage> {
    let mut images = Vec::new();

    let Some(resources) = page_dict
        .get(b"Resources")
        .ok()
        .and_then(|r| resolve_dict(doc, r))
    else {
        return images;
    };
    let Some(xobjects) = resources
        .get(b"XObject")
        .ok()
        .and_then(|x| resolve_dict(doc, x))
    else {
        return images;
    };

    for (name, value) in xobjects.iter() {
        let Some(dict) = resolve_dict(doc, value) else {
            continue;
        };
        let is_image = matches!(dict.get(b"Subtype"), Ok(Object::Name(n)) if n == b"Image");
        if is_image {
            images.push(PageImage {
                name: String::from_utf8_lossy(name).into_owned(),
                width: dict_i64(dict, b"Width"),
                height: dict_i64(dict, b"Height"),
            });
        }
    }

    images
}

/// Extracts `/Annots` entries of subtype `/Link` carrying a `/URI`
/// action. Broken annotations are skipped, never fatal.
fn extract_link_annotations(doc: &Document, page_dict: &Dictionary) -> Vec<PageLink> {
    let mut links = Vec::new();

    let annots: Vec<&Object> = match page_dict.get(b"Annots").map(|a| resolve(doc, a)) {
        Ok(Object::Array(items)) => items.iter().collect(),
        _ => return links,
    };

    for annot in annots {
        let Some(dict) = resolve_dict(doc, annot) else {
            continue;
        };
        let is_link = matches!(dict.get(b"Subtype"), Ok(Object::Name(n)) if n == b"Link");
        if !is_link {
            continue;
        }
        let Some(action) = dict.get(b"A").ok().and_then(|a| resolve_dict(doc, a)) else {
            continue;
        };
        let uri = match action.get(b"URI").map(|u| resolve(doc, u)) {
            Ok(Object::String(bytes, _)) => String::from_utf8_lossy(bytes).into_owned(),
            _ => continue,
        };
        let Some(url) = sanitize_url(&uri) else {
            continue;
        };

        let anchor = match dict.get(b"Contents").map(|c| resolve(doc, c)) {
            Ok(Object::String(bytes, _)) => Some(String::from_utf8_lossy(bytes).into_owned()),
            _ => None,
        };

        links.push(PageLink { url, anchor });
    }

    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::testutil::{build_pdf, TestPage};

    #[test]
    fn test_malformed_bytes_fail_with_malformed() {
        let err = extract_document(b"not a pdf at all", &PdfOptions::default()).unwrap_err();
        assert!(matches!(err, PdfError::Malformed(_)));
    }

    #[test]
    fn test_page_count_matches_pdf() {
        let bytes = build_pdf(&[
            TestPage::text("Jane Doe, Software Engineer"),
            TestPage::text("Experience at Initech"),
        ]);
        let doc = extract_document(&bytes, &PdfOptions::default()).unwrap();
        assert_eq!(doc.page_count, 2);
        assert!(doc.pages[0].text.contains("Jane Doe"));
        assert!(doc.pages[1].text.contains("Initech"));
        assert!(!doc.pages[0].degraded);
    }

    #[test]
    fn test_pages_keep_index_order() {
        let bytes = build_pdf(&[
            TestPage::text("first"),
            TestPage::text("second"),
            TestPage::text("third"),
        ]);
        let doc = extract_document(&bytes, &PdfOptions::default()).unwrap();
        let indices: Vec<usize> = doc.pages.iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_image_xobjects_are_detected() {
        let bytes = build_pdf(&[TestPage::image_only()]);
        let doc = extract_document(&bytes, &PdfOptions::default()).unwrap();
        assert_eq!(doc.pages[0].images.len(), 1);
        assert_eq!(doc.pages[0].images[0].width, 612);
    }

    #[test]
    fn test_link_annotations_are_extracted_and_sanitized() {
        let bytes = build_pdf(&[TestPage::text("links").with_link("github.com/jdoe/")]);
        let doc = extract_document(&bytes, &PdfOptions::default()).unwrap();
        assert_eq!(doc.pages[0].links.len(), 1);
        assert_eq!(doc.pages[0].links[0].url, "https://github.com/jdoe");
    }

    #[test]
    fn test_link_extraction_can_be_disabled() {
        let bytes = build_pdf(&[TestPage::text("links").with_link("github.com/jdoe")]);
        let options = PdfOptions {
            extract_links: false,
            ..Default::default()
        };
        let doc = extract_document(&bytes, &options).unwrap();
        assert!(doc.pages[0].links.is_empty());
    }

    #[test]
    fn test_excluded_link_targets_are_dropped() {
        let bytes = build_pdf(&[TestPage::text("links").with_link("mailto:jdoe@example.com")]);
        let doc = extract_document(&bytes, &PdfOptions::default()).unwrap();
        assert!(doc.pages[0].links.is_empty());
    }
}
