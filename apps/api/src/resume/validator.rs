//! Resume-validity gate: decides whether a document is plausibly a
//! resume before any extraction cost is incurred.
//!
//! Presence-weighted scoring over fixed structural and keyword signals.
//! An ambiguous document just below threshold yields a false verdict
//! with a rationale string, never an error; the caller maps that to
//! `NotAResume`.

use crate::models::document::{NormalizedText, Verdict};

/// Keywords that indicate resume content. One point each.
const RESUME_KEYWORDS: &[&str] = &[
    "experience",
    "education",
    "skills",
    "qualification",
    "projects",
    "certification",
    "work",
    "employment",
    "job",
    "profile",
    "accomplishment",
    "achievement",
    "responsibility",
    "university",
    "college",
    "degree",
];

/// Markers of common non-resume uploads. Two points off each.
const NON_RESUME_MARKERS: &[&str] = &[
    "invoice",
    "purchase order",
    "receipt",
    "remittance",
    "amount due",
    "bill to",
];

/// Minimum cleaned-text length worth scoring at all.
const MIN_TEXT_CHARS: usize = 150;

/// Signals must sum to at least this for a true verdict.
const PASS_THRESHOLD: i32 = 4;

pub fn validate(input: &NormalizedText) -> Verdict {
    let text = input.text.to_lowercase();

    if text.chars().count() < MIN_TEXT_CHARS {
        return Verdict {
            is_resume: false,
            score: 0,
            rationale: format!(
                "document text too short to score ({} chars, minimum {MIN_TEXT_CHARS})",
                text.chars().count()
            ),
        };
    }

    let keyword_hits: Vec<&str> = RESUME_KEYWORDS
        .iter()
        .copied()
        .filter(|k| text.contains(k))
        .collect();
    let negative_hits: Vec<&str> = NON_RESUME_MARKERS
        .iter()
        .copied()
        .filter(|k| text.contains(k))
        .collect();
    let has_contact = text.contains('@') || input.hyperlinks.iter().any(|l| l.contains("linkedin"));

    let score =
        keyword_hits.len() as i32 + i32::from(has_contact) - 2 * negative_hits.len() as i32;

    if score >= PASS_THRESHOLD {
        Verdict {
            is_resume: true,
            score,
            rationale: format!(
                "matched {} resume keywords{}",
                keyword_hits.len(),
                if has_contact { " and contact marker" } else { "" }
            ),
        }
    } else {
        Verdict {
            is_resume: false,
            score,
            rationale: format!(
                "insufficient resume signals: {} keyword(s), {} non-resume marker(s), score {score} below threshold {PASS_THRESHOLD}",
                keyword_hits.len(),
                negative_hits.len()
            ),
        }
    }
}
