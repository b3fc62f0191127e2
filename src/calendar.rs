//! Turning consolidated shifts into dated calendar events.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeDelta, TimeZone, Timelike};
use serde::{Deserialize, Serialize};
use shift_types::{ShiftRecord, YearMonth};

use crate::error::ShiftError;
use crate::time::ClockRange;

const MINUTES_PER_DAY: u32 = 24 * 60;
const SECONDS_PER_HOUR: i32 = 3600;

/// Fields applied to every event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventSettings {
    pub title: String,
    pub location: String,
    /// `{time}` is replaced by the shift's time text.
    pub description_template: String,
    pub utc_offset_hours: i32,
    /// Used when a shift's time text cannot be read as a clock range.
    pub fallback_start: String,
    pub fallback_end: String,
}

impl Default for EventSettings {
    fn default() -> Self {
        Self {
            title: "図書館バイト📚".to_string(),
            location: "図書館".to_string(),
            description_template: "シフト時間: {time}".to_string(),
            utc_offset_hours: 9,
            fallback_start: "10:00".to_string(),
            fallback_end: "12:00".to_string(),
        }
    }
}

impl EventSettings {
    pub fn offset(&self) -> Result<FixedOffset, ShiftError> {
        self.utc_offset_hours
            .checked_mul(SECONDS_PER_HOUR)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                ShiftError::InvalidSettings(format!(
                    "utc_offset_hours {} is out of range",
                    self.utc_offset_hours
                ))
            })
    }

    /// The fallback window as minutes past midnight.
    pub fn fallback_minutes(&self) -> Result<(u32, u32), ShiftError> {
        let start = parse_clock(&self.fallback_start)?;
        let mut end = parse_clock(&self.fallback_end)?;
        if end < start {
            end += MINUTES_PER_DAY;
        }
        Ok((start, end))
    }

    pub fn description(&self, time: &str) -> String {
        self.description_template.replace("{time}", time)
    }
}

fn parse_clock(s: &str) -> Result<u32, ShiftError> {
    let t = NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .map_err(|e| ShiftError::InvalidSettings(format!("clock value {s:?}: {e}")))?;
    Ok(t.hour() * 60 + t.minute())
}

/// One shift placed on the calendar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShiftEvent {
    pub date: NaiveDate,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub title: String,
    pub location: String,
    pub description: String,
}

/// Place `record` in `period`.
///
/// An end earlier than the start moves to the next day, as do hours past
/// 23 ("22:00-26:00"). Time text that does not parse gets the fallback
/// window.
pub fn stamp(
    record: &ShiftRecord,
    period: YearMonth,
    settings: &EventSettings,
) -> Result<ShiftEvent, ShiftError> {
    let date = NaiveDate::from_ymd_opt(period.year, period.month, u32::from(record.date))
        .ok_or(ShiftError::InvalidDay {
            year: period.year,
            month: period.month,
            day: record.date,
        })?;

    let (start_minutes, end_minutes) = match ClockRange::parse(&record.time) {
        Some(range) if range.crosses_midnight() => {
            (range.start_minutes(), range.end_minutes() + MINUTES_PER_DAY)
        }
        Some(range) => (range.start_minutes(), range.end_minutes()),
        None => {
            tracing::debug!(time = %record.time, "unreadable time, using fallback window");
            settings.fallback_minutes()?
        }
    };

    let offset = settings.offset()?;
    let at = |minutes: u32| -> Result<DateTime<FixedOffset>, ShiftError> {
        let local = date.and_time(NaiveTime::MIN) + TimeDelta::minutes(i64::from(minutes));
        offset.from_local_datetime(&local).single().ok_or_else(|| {
            ShiftError::InvalidSettings(format!("{local} has no single instant at {offset}"))
        })
    };

    Ok(ShiftEvent {
        date,
        start: at(start_minutes)?,
        end: at(end_minutes)?,
        title: settings.title.clone(),
        location: settings.location.clone(),
        description: settings.description(&record.time),
    })
}

/// Stamp every record, skipping days that do not exist in `period`.
pub fn stamp_all(
    records: &[ShiftRecord],
    period: YearMonth,
    settings: &EventSettings,
) -> Result<Vec<ShiftEvent>, ShiftError> {
    let mut events = Vec::with_capacity(records.len());
    for record in records {
        match stamp(record, period, settings) {
            Ok(event) => events.push(event),
            Err(e @ ShiftError::InvalidDay { .. }) => {
                tracing::warn!(time = %record.time, "skipping shift: {e}");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(events)
}
