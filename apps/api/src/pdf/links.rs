//! URL validation and plain-text link harvesting.
//!
//! Resumes bury portfolio and repository links both in annotations and
//! in running text, so both sources feed the same validator before
//! anything reaches the response.

use std::sync::OnceLock;

use regex::Regex;

/// Targets that are never useful as candidate hyperlinks.
const EXCLUDED_FRAGMENTS: &[&str] = &["mailto:", "tel:", "wikipedia.org", "gmail.com"];

fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?:https?://)?(?:www\.)?[a-zA-Z0-9.-]+\.(?:com|ai|org|net|edu|gov|mil|in|info|io|dev|co\.uk)(?:/[a-zA-Z0-9._/-]*)?",
        )
        .expect("url pattern must compile")
    })
}

/// Validates and canonicalizes a raw URL candidate. Returns `None` for
/// excluded targets and strings that do not look like a URL.
pub fn sanitize_url(raw: &str) -> Option<String> {
    let raw = raw.trim().trim_end_matches('/');
    let lower = raw.to_lowercase();
    if EXCLUDED_FRAGMENTS.iter().any(|x| lower.contains(x)) {
        return None;
    }

    let matched = url_pattern().find(raw)?.as_str();
    let url = if matched.starts_with("http://") || matched.starts_with("https://") {
        matched.to_string()
    } else {
        format!("https://{matched}")
    };
    Some(url.trim_end_matches('/').to_string())
}

/// Harvests valid URLs from running text. Order of first appearance is
/// preserved; duplicates are dropped.
pub fn find_plain_links(text: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for m in url_pattern().find_iter(text) {
        if let Some(url) = sanitize_url(m.as_str()) {
            if !seen.contains(&url) {
                seen.push(url);
            }
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_adds_https_scheme() {
        assert_eq!(
            sanitize_url("github.com/jdoe"),
            Some("https://github.com/jdoe".to_string())
        );
    }

    #[test]
    fn test_sanitize_keeps_existing_scheme() {
        assert_eq!(
            sanitize_url("https://linkedin.com/in/jdoe/"),
            Some("https://linkedin.com/in/jdoe".to_string())
        );
    }

    #[test]
    fn test_sanitize_drops_mailto_and_tel() {
        assert_eq!(sanitize_url("mailto:jdoe@example.com"), None);
        assert_eq!(sanitize_url("tel:+15551234567"), None);
    }

    #[test]
    fn test_sanitize_drops_excluded_hosts() {
        assert_eq!(sanitize_url("https://en.wikipedia.org/wiki/Rust"), None);
        assert_eq!(sanitize_url("www.gmail.com"), None);
    }

    #[test]
    fn test_sanitize_rejects_non_urls() {
        assert_eq!(sanitize_url("not a url"), None);
        assert_eq!(sanitize_url(""), None);
    }

    #[test]
    fn test_find_plain_links_dedupes_preserving_order() {
        let text = "See github.com/jdoe and https://jdoe.dev/portfolio, also github.com/jdoe";
        assert_eq!(
            find_plain_links(text),
            vec![
                "https://github.com/jdoe".to_string(),
                "https://jdoe.dev/portfolio".to_string(),
            ]
        );
    }
}
