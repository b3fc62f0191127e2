//! Day-of-month extraction.
//!
//! Real cell/text examples:
//!   "16日"        → 16   (day marker)
//!   "16（月）"    → 16   (weekday in parentheses)
//!   "１６日(火)"  → 16   (full-width digits)
//!   "16"          → 16   (bare day cell)
//!   "月曜"        → none

use regex::Regex;
use std::sync::LazyLock;

use crate::markers::{DAY_MARKER, DIGIT, parse_digits};

/// Regex fragment capturing a 1–2 digit day followed by the day marker.
pub(crate) fn marked_day_fragment() -> String {
    format!("({DIGIT}{{1,2}}){DAY_MARKER}")
}

static RE_MARKED_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&marked_day_fragment()).unwrap());

// "16（月）", "16 (Mon)"
static RE_PAREN_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"({DIGIT}{{1,2}})\s*[(（]")).unwrap());

/// Pull a day of month out of a text fragment.
///
/// Tried in order: digits + day marker, digits + opening parenthesis, the
/// whole trimmed text as a bare 1–31 number. The first two forms are not
/// range-checked.
pub fn extract_date(text: &str) -> Option<u8> {
    if text.is_empty() {
        return None;
    }

    if let Some(day) = extract_marked_day(text) {
        return Some(day);
    }

    if let Some(caps) = RE_PAREN_DAY.captures(text) {
        if let Some(day) = caps.get(1).and_then(|m| to_day(m.as_str())) {
            return Some(day);
        }
    }

    let bare = text.trim();
    if bare.chars().count() <= 2 {
        if let Some(n) = parse_digits(bare) {
            if (1..=31).contains(&n) {
                return Some(n as u8);
            }
        }
    }

    None
}

/// Day-marker form only ("16日"). Used where dates are expected to carry
/// the marker: grid date columns and the free-text heuristics.
pub fn extract_marked_day(text: &str) -> Option<u8> {
    RE_MARKED_DAY
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| to_day(m.as_str()))
}

/// Every day-marker occurrence in `text`, in order.
pub fn all_marked_days(text: &str) -> Vec<u8> {
    RE_MARKED_DAY
        .captures_iter(text)
        .filter_map(|c| c.get(1).and_then(|m| to_day(m.as_str())))
        .collect()
}

/// Convert a captured 1–2 digit group to a day number.
pub(crate) fn to_day(digits: &str) -> Option<u8> {
    parse_digits(digits).and_then(|n| u8::try_from(n).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_marker() {
        assert_eq!(extract_date("16日"), Some(16));
        assert_eq!(extract_date("5月16日(月)"), Some(16));
        assert_eq!(extract_date("１６日"), Some(16));
    }

    #[test]
    fn test_parenthesis() {
        assert_eq!(extract_date("16（月）"), Some(16));
        assert_eq!(extract_date("3 (Tue)"), Some(3));
    }

    #[test]
    fn test_bare_number() {
        assert_eq!(extract_date("16"), Some(16));
        assert_eq!(extract_date(" 7 "), Some(7));
        assert_eq!(extract_date("31"), Some(31));
        assert_eq!(extract_date("32"), None);
        assert_eq!(extract_date("0"), None);
        assert_eq!(extract_date("123"), None);
    }

    #[test]
    fn test_no_date() {
        assert_eq!(extract_date("月曜"), None);
        assert_eq!(extract_date(""), None);
        assert_eq!(extract_date("休み"), None);
    }

    #[test]
    fn test_marker_forms_are_not_range_checked() {
        assert_eq!(extract_date("32日"), Some(32));
        assert_eq!(extract_marked_day("99日"), Some(99));
    }

    #[test]
    fn test_marked_day_is_strict() {
        assert_eq!(extract_marked_day("16（月）"), None);
        assert_eq!(extract_marked_day("16"), None);
        assert_eq!(extract_marked_day("16日"), Some(16));
    }

    #[test]
    fn test_all_marked_days() {
        assert_eq!(all_marked_days("1日 早番\n2日 遅番\n１５日"), vec![1, 2, 15]);
        assert!(all_marked_days("なし").is_empty());
    }
}
