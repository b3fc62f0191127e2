//! Diagnostics reported by the extraction strategies.
//!
//! Observers see every intermediate decision (header row, column roles,
//! matched rows, candidate records). They are for inspection only; the
//! extracted result is the same whichever observer is installed.

use shift_types::ShiftRecord;

use crate::error::PageFault;
use crate::grid::ColumnRole;
use crate::text::Heuristic;

/// Which strategy produced a candidate record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Grid,
    Text(Heuristic),
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Grid => "grid",
            Origin::Text(h) => h.as_str(),
        }
    }
}

/// How a grid row was recognised as belonging to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowMatch {
    NameColumn,
    AnyCell,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    PageStarted { page: usize, kind: &'static str },
    /// `detected` is false when no row carried a marker and row 0 was assumed.
    HeaderRow { index: usize, detected: bool },
    Column { role: ColumnRole, index: usize, defaulted: bool },
    RowMatched { row: usize, via: RowMatch },
    Candidate { origin: Origin, record: ShiftRecord },
    /// The full name is not in the page text; `partial` is the first
    /// two-character slice of it that is.
    NameAbsent { partial: Option<String> },
    /// Positional pairing found different numbers of dates and times.
    PairingSkipped { dates: usize, times: usize },
    PageFault(PageFault),
    Consolidated { found: usize, kept: usize },
}

/// Receives diagnostics. Shared across threads along with the extractor.
pub trait Observer: Send + Sync {
    fn observe(&self, diagnostic: &Diagnostic);
}

impl<F> Observer for F
where
    F: Fn(&Diagnostic) + Send + Sync,
{
    fn observe(&self, diagnostic: &Diagnostic) {
        self(diagnostic)
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl Observer for NullObserver {
    fn observe(&self, _: &Diagnostic) {}
}

/// Forwards diagnostics to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn observe(&self, diagnostic: &Diagnostic) {
        match diagnostic {
            Diagnostic::PageStarted { page, kind } => {
                tracing::debug!(page, kind, "page started");
            }
            Diagnostic::HeaderRow { index, detected } => {
                tracing::debug!(index, detected, "header row");
            }
            Diagnostic::Column {
                role,
                index,
                defaulted,
            } => {
                tracing::debug!(role = role.as_str(), index, defaulted, "column role");
            }
            Diagnostic::RowMatched { row, via } => {
                tracing::debug!(row, via = ?via, "row matches target");
            }
            Diagnostic::Candidate { origin, record } => {
                tracing::debug!(
                    origin = origin.as_str(),
                    date = record.date,
                    time = %record.time,
                    "candidate shift"
                );
            }
            Diagnostic::NameAbsent { partial } => {
                tracing::debug!(partial = ?partial, "target name not in page text");
            }
            Diagnostic::PairingSkipped { dates, times } => {
                tracing::debug!(dates, times, "positional pairing skipped");
            }
            Diagnostic::PageFault(fault) => {
                tracing::warn!(page = fault.page(), "{fault}");
            }
            Diagnostic::Consolidated { found, kept } => {
                tracing::info!(found, kept, "shifts consolidated");
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Keeps every diagnostic for later assertions.
    #[derive(Default)]
    pub(crate) struct Recorder(pub Mutex<Vec<Diagnostic>>);

    impl Observer for Recorder {
        fn observe(&self, diagnostic: &Diagnostic) {
            self.0.lock().unwrap().push(diagnostic.clone());
        }
    }

    impl Recorder {
        pub(crate) fn candidates(&self) -> Vec<(Origin, ShiftRecord)> {
            self.0
                .lock()
                .unwrap()
                .iter()
                .filter_map(|d| match d {
                    Diagnostic::Candidate { origin, record } => Some((*origin, record.clone())),
                    _ => None,
                })
                .collect()
        }
    }

    #[test]
    fn test_closure_observer() {
        let seen = AtomicUsize::new(0);
        let counter = |_: &Diagnostic| {
            seen.fetch_add(1, Ordering::Relaxed);
        };
        counter.observe(&Diagnostic::HeaderRow {
            index: 0,
            detected: true,
        });
        NullObserver.observe(&Diagnostic::HeaderRow {
            index: 0,
            detected: true,
        });
        assert_eq!(seen.load(Ordering::Relaxed), 1);
    }
}
