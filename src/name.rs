use std::fmt;

use crate::error::ShiftError;

/// The person whose shifts are being searched for.
///
/// Trimmed and guaranteed non-blank. The two-character slices used by the loose
/// match are computed once here rather than per comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetName {
    name: String,
    parts: Vec<String>,
}

impl TargetName {
    pub fn new(name: impl Into<String>) -> Result<Self, ShiftError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ShiftError::EmptyTargetName);
        }
        let chars: Vec<char> = name.chars().collect();
        let parts = chars.windows(2).map(|w| w.iter().collect()).collect();
        Ok(Self { name, parts })
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// Every contiguous two-character slice of the name, in order.
    /// Empty for a one-character name.
    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// First two-character slice of the name that occurs in `text`.
    pub fn partial_in<'a>(&'a self, text: &str) -> Option<&'a str> {
        self.parts
            .iter()
            .find(|p| text.contains(p.as_str()))
            .map(String::as_str)
    }
}

impl fmt::Display for TargetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Does `candidate` refer to the target person?
///
/// True on an exact match after trimming, on containment of the whole
/// name, or on containment of any two-character slice of the name. The
/// last rule tolerates OCR noise, honorifics and partial table entries;
/// short or common names will over-match.
pub fn matches(candidate: &str, target: &TargetName) -> bool {
    if candidate.is_empty() {
        return false;
    }
    if candidate.trim() == target.as_str() {
        return true;
    }
    if candidate.contains(target.as_str()) {
        return true;
    }
    target.partial_in(candidate).is_some()
}

/// [`matches`] over an optional table cell.
pub fn cell_matches(cell: Option<&str>, target: &TargetName) -> bool {
    cell.is_some_and(|c| matches(c, target))
}
