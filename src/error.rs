use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced to callers of the library.
///
/// Heuristic mismatches are never errors; they contribute nothing.
#[derive(Error, Debug)]
pub enum ShiftError {
    #[error("target name must not be empty")]
    EmptyTargetName,

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported document type: {0}")]
    UnsupportedDocument(PathBuf),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("cannot build pattern for target name: {0}")]
    Pattern(#[from] regex::Error),

    #[error("day {day} does not exist in {year}-{month:02}")]
    InvalidDay { year: i32, month: u32, day: u8 },
}

/// A page that could not contribute to the result.
///
/// Recorded alongside the shifts from the other pages; never aborts the
/// document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PageFault {
    /// The decoder could not produce content for this page.
    #[error("page {page}: could not be decoded: {reason}")]
    Undecodable { page: usize, reason: String },

    /// Content was produced but does not have a known page shape.
    #[error("page {page}: malformed content: {reason}")]
    Malformed { page: usize, reason: String },
}

impl PageFault {
    pub fn page(&self) -> usize {
        match self {
            PageFault::Undecodable { page, .. } | PageFault::Malformed { page, .. } => *page,
        }
    }
}
