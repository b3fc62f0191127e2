use std::collections::HashSet;

use shift_types::ShiftRecord;

/// Merge the candidates from every strategy and page into the final list.
///
/// Keeps the first occurrence of each `(date, time)` pair and orders the
/// survivors by day number. The sort is stable, so records for the same
/// day stay in the order they were found. An empty result is a normal
/// outcome.
pub fn consolidate(records: impl IntoIterator<Item = ShiftRecord>) -> Vec<ShiftRecord> {
    let mut seen: HashSet<(u8, String)> = HashSet::new();
    let mut unique: Vec<ShiftRecord> = records
        .into_iter()
        .filter(|r| seen.insert((r.date, r.time.clone())))
        .collect();
    unique.sort_by_key(|r| r.date);
    unique
}
