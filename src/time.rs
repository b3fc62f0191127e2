//! Time-range extraction.
//!
//! Real cell/text examples:
//!   "10:00-18:00"   → "10:00-18:00"
//!   "9.30 ～ 13.00" → "9.30 ～ 13.00"
//!   "１０：００〜１８：００" → as written
//!   "10時-18時"     → "10:00-18:00"  (hour-only form is normalized)
//!   "休み"          → none
//!
//! The same rules apply to grid cells and to free text.

use regex::Regex;
use std::sync::LazyLock;

use crate::markers::{
    CLOCK_SEPARATOR, DIGIT, HOUR_MARKER, normalize_digits, parse_digits, range_separator_class,
};

/// Regex fragment for the primary `H:MM <sep> H:MM` shape, without capture
/// groups so it can be embedded in larger patterns.
pub(crate) fn time_range_fragment() -> String {
    let sep = range_separator_class();
    format!(
        r"{DIGIT}{{1,2}}{CLOCK_SEPARATOR}{DIGIT}{{2}}\s*{sep}\s*{DIGIT}{{1,2}}{CLOCK_SEPARATOR}{DIGIT}{{2}}"
    )
}

static RE_TIME_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&time_range_fragment()).unwrap());

// Same shape with each clock component captured, for structured parsing.
static RE_CLOCK_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    let sep = range_separator_class();
    Regex::new(&format!(
        r"({DIGIT}{{1,2}}){CLOCK_SEPARATOR}({DIGIT}{{2}})\s*{sep}\s*({DIGIT}{{1,2}}){CLOCK_SEPARATOR}({DIGIT}{{2}})"
    ))
    .unwrap()
});

// "10時-18時"
static RE_HOUR_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    let sep = range_separator_class();
    Regex::new(&format!(
        r"({DIGIT}{{1,2}}){HOUR_MARKER}\s*{sep}\s*({DIGIT}{{1,2}}){HOUR_MARKER}"
    ))
    .unwrap()
});

/// Pull a time range out of a text fragment.
///
/// Returns the matched text verbatim for the `H:MM-H:MM` shape, or a
/// normalized `"H:00-H:00"` for the hour-marker shape.
pub fn extract_time(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }

    if let Some(m) = RE_TIME_RANGE.find(text) {
        return Some(m.as_str().to_string());
    }

    let caps = RE_HOUR_RANGE.captures(text)?;
    let start = normalize_digits(caps.get(1)?.as_str());
    let end = normalize_digits(caps.get(2)?.as_str());
    Some(format!("{start}:00-{end}:00"))
}

/// First `H:MM-H:MM` occurrence only, without the hour-marker fallback.
/// The free-text heuristics search this shape.
pub fn find_time_range(text: &str) -> Option<&str> {
    RE_TIME_RANGE.find(text).map(|m| m.as_str())
}

/// Start and end of a shift as wall-clock values.
///
/// Hours are kept as written, so "22:00-26:00" has an end hour of 26.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockRange {
    pub start_hour: u32,
    pub start_minute: u32,
    pub end_hour: u32,
    pub end_minute: u32,
}

impl ClockRange {
    /// Parse the first `H:MM-H:MM` shape in `text`.
    pub fn parse(text: &str) -> Option<Self> {
        let caps = RE_CLOCK_RANGE.captures(text)?;
        let field = |i: usize| caps.get(i).and_then(|m| parse_digits(m.as_str()));
        let range = ClockRange {
            start_hour: field(1)?,
            start_minute: field(2)?,
            end_hour: field(3)?,
            end_minute: field(4)?,
        };
        (range.start_minute < 60 && range.end_minute < 60).then_some(range)
    }

    /// Minutes past midnight of the start.
    pub fn start_minutes(&self) -> u32 {
        self.start_hour * 60 + self.start_minute
    }

    /// Minutes past midnight of the end, as written.
    pub fn end_minutes(&self) -> u32 {
        self.end_hour * 60 + self.end_minute
    }

    /// The end falls on the following day.
    pub fn crosses_midnight(&self) -> bool {
        self.end_minutes() < self.start_minutes()
    }
}
