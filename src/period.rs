//! Which year and month a schedule covers.
//!
//! The day numbers in a rota are only meaningful with a month attached.
//! File names are tried first ("令和6年5月シフト表.pdf", "R6.5月.pdf"),
//! then the page content ("令和6年5月", "2024年5月", "202405").

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use shift_types::{PageContent, YearMonth};
use std::sync::LazyLock;

use crate::markers::{DIGIT, parse_digits};

/// First Reiwa year is 2019.
const REIWA_EPOCH: i32 = 2018;

// 令和6, 令和 6, R6, Ｒ６, 令和元; the single-letter forms need the digits attached
static RE_ERA_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("(?:令和\\s*|[RＲ])({DIGIT}{{1,2}}|元)")).unwrap());

static RE_WESTERN_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("({DIGIT}{{4}})年")).unwrap());

static RE_MONTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("({DIGIT}{{1,2}})月")).unwrap());

static RE_ERA_YEAR_MONTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "令和\\s*({DIGIT}{{1,2}}|元)\\s*年\\s*({DIGIT}{{1,2}})\\s*月"
    ))
    .unwrap()
});

static RE_YEAR_MONTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "({DIGIT}{{2,4}})\\s*年\\s*({DIGIT}{{1,2}})\\s*月"
    ))
    .unwrap()
});

// 202405, not embedded in a longer number
static RE_COMPACT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^0-9])(20[0-9]{2})(0[1-9]|1[0-2])(?:[^0-9]|$)").unwrap());

fn era_year(n: &str) -> Option<i32> {
    let n = if n == "元" { 1 } else { parse_digits(n)? };
    (n > 0).then(|| REIWA_EPOCH + n as i32)
}

/// Year and month from a file name.
///
/// The year falls back to a guess from `today` when the name carries only
/// a month: a month later than the current one belongs to last year.
pub fn from_file_name(name: &str, today: NaiveDate) -> Option<YearMonth> {
    let month = RE_MONTH
        .captures(name)
        .and_then(|c| parse_digits(c.get(1)?.as_str()))?;

    let year = RE_ERA_YEAR
        .captures(name)
        .and_then(|c| era_year(c.get(1)?.as_str()))
        .or_else(|| {
            RE_WESTERN_YEAR
                .captures(name)
                .and_then(|c| parse_digits(c.get(1)?.as_str()))
                .map(|y| y as i32)
        })
        .unwrap_or_else(|| {
            if month > today.month() {
                today.year() - 1
            } else {
                today.year()
            }
        });

    YearMonth::new(year, month)
}

/// Year and month from page text. The first form that matches wins.
pub fn from_content(text: &str) -> Option<YearMonth> {
    if let Some(caps) = RE_ERA_YEAR_MONTH.captures(text) {
        let year = era_year(caps.get(1)?.as_str());
        let month = parse_digits(caps.get(2)?.as_str());
        if let Some(ym) = year.zip(month).and_then(|(y, m)| YearMonth::new(y, m)) {
            return Some(ym);
        }
    }

    if let Some(caps) = RE_YEAR_MONTH.captures(text) {
        let year = parse_digits(caps.get(1)?.as_str()).map(|y| y as i32);
        let month = parse_digits(caps.get(2)?.as_str());
        let year = year.map(|y| if y < 100 { 2000 + y } else { y });
        if let Some(ym) = year.zip(month).and_then(|(y, m)| YearMonth::new(y, m)) {
            return Some(ym);
        }
    }

    let caps = RE_COMPACT.captures(text)?;
    let year: i32 = caps.get(1)?.as_str().parse().ok()?;
    let month: u32 = caps.get(2)?.as_str().parse().ok()?;
    YearMonth::new(year, month)
}

/// Flatten a page into text for [`from_content`]. Grid cells are joined
/// with spaces, rows with newlines.
pub fn page_text(page: &PageContent) -> String {
    match page {
        PageContent::FlowText { text } => text.clone(),
        PageContent::Grid { rows } => rows
            .iter()
            .map(|row| {
                row.iter()
                    .flatten()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// Where a document's year and month came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    FileName(YearMonth),
    Content(YearMonth),
    Unresolved,
}

impl Resolution {
    pub fn year_month(&self) -> Option<YearMonth> {
        match self {
            Resolution::FileName(ym) | Resolution::Content(ym) => Some(*ym),
            Resolution::Unresolved => None,
        }
    }

    pub fn source(&self) -> &'static str {
        match self {
            Resolution::FileName(_) => "file_name",
            Resolution::Content(_) => "content",
            Resolution::Unresolved => "unresolved",
        }
    }
}

/// File name first, then each page in order.
pub fn resolve(file_name: Option<&str>, pages: &[PageContent], today: NaiveDate) -> Resolution {
    if let Some(ym) = file_name.and_then(|n| from_file_name(n, today)) {
        return Resolution::FileName(ym);
    }
    pages
        .iter()
        .find_map(|p| from_content(&page_text(p)))
        .map_or(Resolution::Unresolved, Resolution::Content)
}
