//! Datetime pattern matching against sampled column values.
//!
//! Matching is deliberately strict: a pattern either parses a value exactly
//! (`chrono::parse_from_str`, no fuzziness) or it does not. Separator
//! normalization runs first so that `2024/05/06` and `2024-05-06` land on the
//! same pattern. A column counts as datetime-like when at least one value
//! parses — real exports mix blanks and malformed cells into otherwise valid
//! date columns, and a partial match is still a match.

use chrono::{NaiveDate, NaiveDateTime};

pub const CANONICAL_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One strict format in the ordered trial list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatetimePattern {
    pub format: String,
    pub has_time: bool,
}

impl DatetimePattern {
    pub fn new(format: &str, has_time: bool) -> Self {
        Self {
            format: format.to_string(),
            has_time,
        }
    }
}

/// The ordered pattern list tried during inference and cleaning.
///
/// Order is contract: the first pattern with any successful parse wins. The
/// slash-separated entries cannot match once separators are normalized; they
/// are retained as configured data so alternate configs may disable
/// normalization without losing coverage.
pub fn default_patterns() -> Vec<DatetimePattern> {
    vec![
        DatetimePattern::new("%d/%m/%Y %H:%M:%S", true),
        DatetimePattern::new("%d/%m/%y %H:%M:%S", true),
        DatetimePattern::new("%d-%m-%Y %H:%M:%S", true),
        DatetimePattern::new("%Y-%m-%d %H:%M:%S", true),
        DatetimePattern::new("%Y%m%d%H%M%S", true),
        DatetimePattern::new("%Y-%m-%d", false),
        DatetimePattern::new("%Y/%m/%d %H:%M:%S", true),
    ]
}

/// Collapses both accepted date separators to `-` before strict parsing.
pub fn normalize_separators(value: &str) -> String {
    value.replace('/', "-")
}

fn parse_with(value: &str, pattern: &DatetimePattern) -> Option<NaiveDateTime> {
    if pattern.has_time {
        NaiveDateTime::parse_from_str(value, &pattern.format).ok()
    } else {
        NaiveDate::parse_from_str(value, &pattern.format)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
    }
}

/// Reports whether any configured pattern plausibly parses the column.
///
/// Tries patterns in order against the normalized values and stops at the
/// first pattern with at least one successful parse.
pub fn matches_any(values: &[Option<String>], patterns: &[DatetimePattern]) -> bool {
    for pattern in patterns {
        let hit = values.iter().any(|value| {
            value
                .as_deref()
                .map(|v| parse_with(&normalize_separators(v.trim()), pattern).is_some())
                .unwrap_or(false)
        });
        if hit {
            log::debug!("datetime pattern '{}' matched", pattern.format);
            return true;
        }
    }
    false
}

/// Rewrites a single cell into the canonical datetime text representation.
///
/// Returns `None` when no pattern parses the value; the cleaning pass stores
/// that as a null marker rather than failing the row.
pub fn canonicalize(value: &str, patterns: &[DatetimePattern]) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let normalized = normalize_separators(trimmed);
    patterns
        .iter()
        .find_map(|pattern| parse_with(&normalized, pattern))
        .map(|parsed| parsed.format(CANONICAL_DATETIME_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(values: &[&str]) -> Vec<Option<String>> {
        values.iter().map(|v| Some(v.to_string())).collect()
    }

    #[test]
    fn matches_standard_datetime_column() {
        let patterns = default_patterns();
        let values = column(&["2024-05-06 14:30:00", "2024-05-07 09:00:00"]);
        assert!(matches_any(&values, &patterns));
    }

    #[test]
    fn slash_separated_values_match_after_normalization() {
        let patterns = default_patterns();
        let values = column(&["2024/05/06 14:30:00"]);
        assert!(matches_any(&values, &patterns));
    }

    #[test]
    fn partial_match_is_sufficient() {
        let patterns = default_patterns();
        let values = vec![
            None,
            Some("not a date".to_string()),
            Some("2024-05-06".to_string()),
        ];
        assert!(matches_any(&values, &patterns));
    }

    #[test]
    fn rejects_plain_text_and_bare_numbers() {
        let patterns = default_patterns();
        assert!(!matches_any(&column(&["hello", "world"]), &patterns));
        assert!(!matches_any(&column(&["123", "456"]), &patterns));
    }

    #[test]
    fn compact_numeric_format_matches() {
        let patterns = default_patterns();
        assert!(matches_any(&column(&["20240506143000"]), &patterns));
    }

    #[test]
    fn canonicalize_renders_single_representation() {
        let patterns = default_patterns();
        assert_eq!(
            canonicalize("06/05/2024 14:30:00", &patterns).as_deref(),
            Some("2024-05-06 14:30:00")
        );
        assert_eq!(
            canonicalize("2024-05-06", &patterns).as_deref(),
            Some("2024-05-06 00:00:00")
        );
        assert_eq!(canonicalize("N/A", &patterns), None);
        assert_eq!(canonicalize("", &patterns), None);
    }
}
