//! Shift extraction from pages decoded as tables.
//!
//! Typical layouts:
//!   日付 | 曜日 | 時間        | 名前
//!   16日 | 月   | 10:00-18:00 | 瓜田太郎
//!
//!   日   | 早番         | 遅番
//!   1日  | 瓜田 9:00-13:00 | 佐藤 13:00-18:00
//!
//! Header and column detection are heuristic. When a role cannot be found
//! in the header the policy's positional defaults are used instead.

use serde::{Deserialize, Serialize};
use shift_types::ShiftRecord;

use crate::date::extract_marked_day;
use crate::markers::{
    DATE_HEADER_KEYWORDS, DAY_MARKER, NAME_HEADER_KEYWORDS, TIME_HEADER_KEYWORDS, WEEKDAY_MARKER,
};
use crate::name::{TargetName, cell_matches};
use crate::observe::{Diagnostic, Observer, Origin, RowMatch};
use crate::time::extract_time;

type Row = Vec<Option<String>>;

// ── Policy ───────────────────────────────────────────────────────────

/// Positional fallbacks for tables whose header does not name a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridPolicy {
    pub default_date_column: usize,
    /// Many rotas put the time range in the third column.
    pub default_time_column: usize,
}

impl GridPolicy {
    pub const DEFAULT_DATE_COLUMN: usize = 0;
    pub const DEFAULT_TIME_COLUMN: usize = 2;
}

impl Default for GridPolicy {
    fn default() -> Self {
        Self {
            default_date_column: Self::DEFAULT_DATE_COLUMN,
            default_time_column: Self::DEFAULT_TIME_COLUMN,
        }
    }
}

// ── Column roles ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    Date,
    Time,
    Name,
}

impl ColumnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Time => "time",
            Self::Name => "name",
        }
    }

    /// Classify a header cell. Date keywords are checked first, then time,
    /// then name, so "日時" is a date header.
    pub fn classify(header_cell: &str) -> Option<Self> {
        let has_any = |keywords: &[&str]| keywords.iter().any(|k| header_cell.contains(k));
        if has_any(DATE_HEADER_KEYWORDS) {
            Some(Self::Date)
        } else if has_any(TIME_HEADER_KEYWORDS) {
            Some(Self::Time)
        } else if has_any(NAME_HEADER_KEYWORDS) {
            Some(Self::Name)
        } else {
            None
        }
    }
}

/// Column index per role for one table. Built from the header row and
/// dropped once the table is processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderColumnMap {
    pub date: usize,
    pub time: usize,
    pub name: Option<usize>,
}

/// Index of the header row: the first row with a cell containing the day
/// or weekday marker. Returns `(0, false)` when no row qualifies.
pub fn find_header_row(rows: &[Row]) -> (usize, bool) {
    rows.iter()
        .position(|row| {
            row.iter()
                .flatten()
                .any(|cell| cell.contains(DAY_MARKER) || cell.contains(WEEKDAY_MARKER))
        })
        .map_or((0, false), |i| (i, true))
}

/// Assign column roles from a header row. The first cell classified for a
/// role keeps it; later cells of the same role are ignored.
pub fn map_columns(
    header: &[Option<String>],
    policy: &GridPolicy,
    observer: &dyn Observer,
) -> HeaderColumnMap {
    let mut date = None;
    let mut time = None;
    let mut name = None;

    for (i, cell) in header.iter().enumerate() {
        let Some(cell) = cell.as_deref().filter(|c| !c.trim().is_empty()) else {
            continue;
        };
        let slot = match ColumnRole::classify(cell) {
            Some(ColumnRole::Date) => &mut date,
            Some(ColumnRole::Time) => &mut time,
            Some(ColumnRole::Name) => &mut name,
            None => continue,
        };
        if slot.is_none() {
            *slot = Some(i);
        }
    }

    let report = |role: ColumnRole, index: usize, defaulted: bool| {
        observer.observe(&Diagnostic::Column {
            role,
            index,
            defaulted,
        })
    };

    let date = date.unwrap_or_else(|| {
        report(ColumnRole::Date, policy.default_date_column, true);
        policy.default_date_column
    });
    let time = time.unwrap_or_else(|| {
        report(ColumnRole::Time, policy.default_time_column, true);
        policy.default_time_column
    });
    if let Some(i) = name {
        report(ColumnRole::Name, i, false);
    }

    HeaderColumnMap { date, time, name }
}

fn cell(row: &[Option<String>], index: usize) -> Option<&str> {
    row.get(index).and_then(|c| c.as_deref())
}

/// Extract the target's shifts from a table.
///
/// Rows after the header are matched against the target through the name
/// column when the header has one, then through every cell of the row. A
/// matching row yields a record only when both a day-marker date (from
/// the date column) and a time range (from the time column, else the
/// first cell in the row that has one) are found.
pub fn extract_from_grid(
    rows: &[Row],
    target: &TargetName,
    policy: &GridPolicy,
    observer: &dyn Observer,
) -> Vec<ShiftRecord> {
    let mut shifts = Vec::new();
    if rows.is_empty() {
        return shifts;
    }

    let (header_index, detected) = find_header_row(rows);
    observer.observe(&Diagnostic::HeaderRow {
        index: header_index,
        detected,
    });
    let columns = map_columns(&rows[header_index], policy, observer);

    for (row_index, row) in rows.iter().enumerate().skip(header_index + 1) {
        let in_name_column = columns
            .name
            .is_some_and(|name_col| cell_matches(cell(row, name_col), target));
        let via = if in_name_column {
            Some(RowMatch::NameColumn)
        } else {
            row.iter()
                .any(|c| cell_matches(c.as_deref(), target))
                .then_some(RowMatch::AnyCell)
        };
        let Some(via) = via else {
            continue;
        };
        observer.observe(&Diagnostic::RowMatched { row: row_index, via });

        let date = cell(row, columns.date).and_then(extract_marked_day);
        let time = cell(row, columns.time)
            .and_then(extract_time)
            .or_else(|| row.iter().flatten().find_map(|c| extract_time(c)));

        if let (Some(date), Some(time)) = (date, time) {
            let record = ShiftRecord::new(date, time);
            observer.observe(&Diagnostic::Candidate {
                origin: Origin::Grid,
                record: record.clone(),
            });
            shifts.push(record);
        }
    }

    shifts
}
