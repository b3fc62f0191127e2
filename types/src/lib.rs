#![allow(dead_code)]
use serde::{Deserialize, Serialize};

// ── Shift record ─────────────────────────────────────────────────────────

/// One extracted shift: a day of the month and the time text found for it.
///
/// Two records are the same shift when both `date` and `time` are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShiftRecord {
    /// Day of month as written in the document. Plausible, not verified
    /// against a calendar ("32日" yields 32).
    pub date: u8,
    /// Raw matched time-range text, e.g. "10:00～18:00".
    pub time: String,
}

impl ShiftRecord {
    pub fn new(date: u8, time: impl Into<String>) -> Self {
        Self {
            date,
            time: time.into(),
        }
    }

    /// Deduplication key.
    pub fn key(&self) -> (u8, &str) {
        (self.date, self.time.as_str())
    }
}

// ── Decoded page ─────────────────────────────────────────────────────────

/// A single page as produced by the document decoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PageContent {
    /// Table rows, each an ordered list of optional cells.
    Grid { rows: Vec<Vec<Option<String>>> },
    /// Unstructured text; newlines are kept for line-window searches.
    #[serde(rename = "text")]
    FlowText { text: String },
}

impl PageContent {
    pub fn grid<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = Option<String>>,
    {
        PageContent::Grid {
            rows: rows.into_iter().map(|r| r.into_iter().collect()).collect(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        PageContent::FlowText { text: text.into() }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PageContent::Grid { .. } => "grid",
            PageContent::FlowText { .. } => "text",
        }
    }
}

// ── Year / month ─────────────────────────────────────────────────────────

/// The calendar month a schedule document covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    /// 1–12
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// Two-digit month, e.g. "05".
    pub fn month_padded(&self) -> String {
        format!("{:02}", self.month)
    }
}
