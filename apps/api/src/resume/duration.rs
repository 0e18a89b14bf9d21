//! Deterministic work-history duration parsing. No AI involvement: the
//! model reports free-text period strings and this module alone decides
//! how many months they cover.

use chrono::{Datelike, NaiveDate};

/// End-of-period markers meaning "still employed here".
const CURRENT_MARKERS: &[&str] = &["present", "current", "till date", "ongoing", "now", "today"];

/// Years outside this range are treated as unparseable noise.
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1900..=2100;

/// Parses a free-text period string into the first day of its month.
/// Accepted forms: `2020-01`, `2020-01-15`, `01/2020`, `Jan 2020`,
/// `January 2020`, `2020`. Returns `None` for anything else.
pub fn parse_period(raw: &str) -> Option<NaiveDate> {
    let cleaned = raw
        .trim()
        .replace(['.', ','], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if cleaned.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(&cleaned, "%Y-%m-%d") {
        return in_range(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{cleaned}-01"), "%Y-%m-%d") {
        return in_range(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("01/{cleaned}"), "%d/%m/%Y") {
        return in_range(date);
    }
    for pattern in ["%d %b %Y", "%d %B %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(&format!("01 {cleaned}"), pattern) {
            return in_range(date);
        }
    }
    if let Ok(year) = cleaned.parse::<i32>() {
        if YEAR_RANGE.contains(&year) {
            return NaiveDate::from_ymd_opt(year, 1, 1);
        }
    }

    None
}

fn in_range(date: NaiveDate) -> Option<NaiveDate> {
    YEAR_RANGE.contains(&date.year()).then_some(date)
}

/// Whether an end-period string marks ongoing employment.
pub fn is_current(raw: &str) -> bool {
    let lower = raw.trim().to_lowercase();
    CURRENT_MARKERS.iter().any(|m| lower == *m)
}

/// Whole months between two month-resolution dates, clamped at zero.
pub fn months_between(start: NaiveDate, end: NaiveDate) -> u32 {
    let months =
        (end.year() - start.year()) * 12 + (end.month() as i32 - start.month() as i32);
    months.max(0) as u32
}

/// Months covered by one work-history span. Unparseable or incomplete
/// periods count as zero rather than failing; overlaps across entries
/// are not de-duplicated (conservative default).
pub fn span_months(start: Option<&str>, end: Option<&str>, today: NaiveDate) -> u32 {
    let Some(start_date) = start.and_then(parse_period) else {
        return 0;
    };
    let end_date = match end {
        Some(raw) if is_current(raw) => today,
        Some(raw) => match parse_period(raw) {
            Some(d) => d,
            None => return 0,
        },
        // A missing end with a valid start reads as current employment.
        None => today,
    };
    months_between(start_date, end_date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    #[test]
    fn test_parse_iso_year_month() {
        assert_eq!(parse_period("2020-03"), Some(date(2020, 3)));
    }

    #[test]
    fn test_parse_slash_form() {
        assert_eq!(parse_period("03/2020"), Some(date(2020, 3)));
    }

    #[test]
    fn test_parse_month_names() {
        assert_eq!(parse_period("Jan 2020"), Some(date(2020, 1)));
        assert_eq!(parse_period("January 2020"), Some(date(2020, 1)));
        assert_eq!(parse_period("Sept. 2021"), None); // four-letter abbreviation is noise
        assert_eq!(parse_period("Sep 2021"), Some(date(2021, 9)));
    }

    #[test]
    fn test_parse_bare_year_lands_on_january() {
        assert_eq!(parse_period("2018"), Some(date(2018, 1)));
    }

    #[test]
    fn test_parse_rejects_noise() {
        assert_eq!(parse_period(""), None);
        assert_eq!(parse_period("last summer"), None);
        assert_eq!(parse_period("9999"), None);
    }

    #[test]
    fn test_months_between_clamps_inverted_spans() {
        assert_eq!(months_between(date(2022, 6), date(2020, 1)), 0);
        assert_eq!(months_between(date(2020, 1), date(2022, 6)), 29);
    }

    #[test]
    fn test_span_months_basic() {
        let today = date(2024, 6);
        assert_eq!(span_months(Some("2020-01"), Some("2023-01"), today), 36);
    }

    #[test]
    fn test_span_months_present_resolves_to_today() {
        let today = date(2024, 6);
        assert_eq!(span_months(Some("Jan 2024"), Some("Present"), today), 5);
        assert_eq!(span_months(Some("Jan 2024"), None, today), 5);
    }

    #[test]
    fn test_span_months_unparseable_counts_zero() {
        let today = date(2024, 6);
        assert_eq!(span_months(None, Some("2023-01"), today), 0);
        assert_eq!(span_months(Some("a while ago"), Some("2023-01"), today), 0);
        assert_eq!(span_months(Some("2020-01"), Some("recently"), today), 0);
    }

    #[test]
    fn test_is_current_markers() {
        assert!(is_current("Present"));
        assert!(is_current(" till date "));
        assert!(!is_current("2023-01"));
    }
}
