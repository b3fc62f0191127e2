//! Shift extraction from pages decoded as running text.
//!
//! Four heuristics run over the whole page and every result is kept:
//!
//!   1. name → date → time   "瓜田さんは16日10:00-18:00勤務"
//!   2. date → name → time   "16日 早番 瓜田 10:00-18:00"
//!   3. positional pairing   every "N日" in the page zipped with every
//!                           time range that follows the name, only when
//!                           the two counts agree
//!   4. line window          a line mentioning the name, plus the lines
//!                           around it, searched for one date and one time
//!
//! They overlap on purpose. Duplicates are removed by the consolidator.

use regex::Regex;
use serde::{Deserialize, Serialize};
use shift_types::ShiftRecord;

use crate::date::{all_marked_days, extract_marked_day, marked_day_fragment, to_day};
use crate::error::ShiftError;
use crate::name::{TargetName, matches};
use crate::observe::{Diagnostic, Observer, Origin};
use crate::time::{find_time_range, time_range_fragment};

// ── Types ────────────────────────────────────────────────────────────

/// Which heuristic produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Heuristic {
    /// name … N日 … time
    NameDateTime,
    /// N日 … name … time
    DateNameTime,
    /// all dates zipped with all name-anchored times
    Positional,
    /// lines around a line that mentions the name
    LineWindow,
}

impl Heuristic {
    pub const ALL: [Heuristic; 4] = [
        Self::NameDateTime,
        Self::DateNameTime,
        Self::Positional,
        Self::LineWindow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NameDateTime => "名前→日付→時間",
            Self::DateNameTime => "日付→名前→時間",
            Self::Positional => "日付×時間",
            Self::LineWindow => "前後行",
        }
    }
}

/// Tunables for the text heuristics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextPolicy {
    /// Lines kept above a name line by the line-window heuristic.
    pub context_lines_before: usize,
    /// Lines kept below a name line by the line-window heuristic.
    pub context_lines_after: usize,
    /// Whether heuristics 1–3 may match across line breaks.
    pub cross_line_patterns: bool,
}

impl TextPolicy {
    pub const CONTEXT_LINES: usize = 3;
}

impl Default for TextPolicy {
    fn default() -> Self {
        Self {
            context_lines_before: Self::CONTEXT_LINES,
            context_lines_after: Self::CONTEXT_LINES,
            cross_line_patterns: true,
        }
    }
}

// ── Scanner ──────────────────────────────────────────────────────────

/// Holds the patterns compiled for one target name.
pub struct TextScanner {
    target: TargetName,
    policy: TextPolicy,
    /// {name}.*?(N)日.*?(time)
    re_name_date_time: Regex,
    /// (N)日.*?{name}.*?(time)
    re_date_name_time: Regex,
    /// {name}.*?(time)
    re_name_time: Regex,
}

impl TextScanner {
    pub fn new(target: &TargetName, policy: &TextPolicy) -> Result<Self, ShiftError> {
        let flags = if policy.cross_line_patterns { "(?s)" } else { "" };
        let name = regex::escape(target.as_str());
        let day = marked_day_fragment();
        let time = time_range_fragment();

        let re_name_date_time = Regex::new(&format!("{flags}{name}.*?{day}.*?({time})"))?;
        let re_date_name_time = Regex::new(&format!("{flags}{day}.*?{name}.*?({time})"))?;
        let re_name_time = Regex::new(&format!("{flags}{name}.*?({time})"))?;

        Ok(TextScanner {
            target: target.clone(),
            policy: policy.clone(),
            re_name_date_time,
            re_date_name_time,
            re_name_time,
        })
    }

    /// Run every heuristic over `text` and concatenate their results in
    /// heuristic order.
    pub fn scan(&self, text: &str, observer: &dyn Observer) -> Vec<ShiftRecord> {
        let mut shifts = Vec::new();
        if text.is_empty() {
            return shifts;
        }

        if !text.contains(self.target.as_str()) {
            let partial = self.target.partial_in(text).map(str::to_string);
            observer.observe(&Diagnostic::NameAbsent { partial });
        }

        for heuristic in Heuristic::ALL {
            let found = match heuristic {
                Heuristic::NameDateTime => self.name_date_time(text),
                Heuristic::DateNameTime => self.date_name_time(text),
                Heuristic::Positional => self.positional(text, observer),
                Heuristic::LineWindow => self.line_window(text),
            };
            for record in found {
                observer.observe(&Diagnostic::Candidate {
                    origin: Origin::Text(heuristic),
                    record: record.clone(),
                });
                shifts.push(record);
            }
        }

        shifts
    }

    /// Heuristic 1: one record per non-overlapping "name … N日 … time".
    pub fn name_date_time(&self, text: &str) -> Vec<ShiftRecord> {
        Self::date_time_pairs(&self.re_name_date_time, text)
    }

    /// Heuristic 2: one record per non-overlapping "N日 … name … time".
    pub fn date_name_time(&self, text: &str) -> Vec<ShiftRecord> {
        Self::date_time_pairs(&self.re_date_name_time, text)
    }

    /// Both patterns capture the day as group 1 and the time as group 2.
    fn date_time_pairs(re: &Regex, text: &str) -> Vec<ShiftRecord> {
        re.captures_iter(text)
            .filter_map(|caps| {
                let date = to_day(caps.get(1)?.as_str())?;
                let time = caps.get(2)?.as_str();
                Some(ShiftRecord::new(date, time))
            })
            .collect()
    }

    /// Heuristic 3: zip every day-marker date in the page with every time
    /// range that follows an occurrence of the name. Emits nothing unless
    /// both lists have the same length.
    pub fn positional(&self, text: &str, observer: &dyn Observer) -> Vec<ShiftRecord> {
        let dates = all_marked_days(text);
        if dates.is_empty() {
            return Vec::new();
        }

        let times: Vec<&str> = self
            .re_name_time
            .captures_iter(text)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
            .collect();

        if dates.len() != times.len() {
            observer.observe(&Diagnostic::PairingSkipped {
                dates: dates.len(),
                times: times.len(),
            });
            return Vec::new();
        }

        dates
            .into_iter()
            .zip(times)
            .map(|(date, time)| ShiftRecord::new(date, time))
            .collect()
    }

    /// Heuristic 4: for each line the name matcher accepts, search the
    /// surrounding lines (clamped to the page) for the first date and the
    /// first time range.
    pub fn line_window(&self, text: &str) -> Vec<ShiftRecord> {
        let lines: Vec<&str> = text.split('\n').collect();
        let mut shifts = Vec::new();

        for (i, line) in lines.iter().enumerate() {
            if !matches(line, &self.target) {
                continue;
            }
            let start = i.saturating_sub(self.policy.context_lines_before);
            let end = (i + self.policy.context_lines_after + 1).min(lines.len());
            let window = lines[start..end].join("\n");

            let date = extract_marked_day(&window);
            let time = find_time_range(&window);
            if let (Some(date), Some(time)) = (date, time) {
                shifts.push(ShiftRecord::new(date, time));
            }
        }

        shifts
    }
}
