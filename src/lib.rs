//! Find one person's shifts in decoded Japanese work-schedule documents.
//!
//! Pages arrive either as grids (rows of cells) or as flow text. Grids are
//! read through their header row; text goes through four overlapping
//! pattern heuristics. The per-page candidates are deduplicated and sorted
//! by day.

pub mod calendar;
pub mod config;
pub mod consolidate;
pub mod date;
pub mod document;
pub mod engine;
pub mod error;
pub mod grid;
pub mod markers;
pub mod name;
pub mod observe;
pub mod period;
pub mod text;
pub mod time;

pub use engine::{Extraction, ShiftExtractor, extract_shifts};
pub use error::{PageFault, ShiftError};
pub use name::TargetName;
pub use shift_types::{PageContent, ShiftRecord, YearMonth};
