//! Content extractor: native PDF parsing of text, tables, images and
//! link annotations, one `Page` record per document page.

pub mod extractor;
pub mod links;
pub mod tables;

#[cfg(test)]
pub mod testutil;

pub use extractor::{extract_document, PdfError, PdfOptions};
