//! Loading decoded schedule documents from disk.
//!
//! Two formats:
//!   *.json  `{"file_name": "令和6年5月.pdf", "pages": [{"kind": "grid", ...}, ...]}`
//!   *.txt   plain text, one page per form-feed-separated chunk
//!
//! Each JSON page is decoded on its own, so one bad page only costs that
//! page.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use shift_types::PageContent;
use walkdir::WalkDir;

use crate::error::{PageFault, ShiftError};

const PAGE_BREAK: char = '\x0c';

/// A loaded document, pages numbered from 1.
#[derive(Debug)]
pub struct Document {
    pub source: PathBuf,
    /// Name of the original upload, used for year/month resolution.
    pub file_name: Option<String>,
    pub pages: Vec<Result<PageContent, PageFault>>,
}

impl Document {
    /// The declared upload name, else the file name on disk.
    pub fn display_name(&self) -> Option<&str> {
        self.file_name
            .as_deref()
            .or_else(|| self.source.file_name().and_then(|n| n.to_str()))
    }

    /// Pages that decoded.
    pub fn decoded_pages(&self) -> Vec<PageContent> {
        self.pages.iter().filter_map(|p| p.as_ref().ok()).cloned().collect()
    }
}

#[derive(Deserialize)]
struct RawDocument {
    #[serde(default)]
    file_name: Option<String>,
    pages: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Text,
}

fn format_of(path: &Path) -> Option<Format> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Some(Format::Json),
        Some("txt") => Some(Format::Text),
        _ => None,
    }
}

pub fn is_supported(path: &Path) -> bool {
    format_of(path).is_some()
}

/// Read and decode one document.
pub fn load(path: &Path) -> Result<Document, ShiftError> {
    let format =
        format_of(path).ok_or_else(|| ShiftError::UnsupportedDocument(path.to_path_buf()))?;
    let content = std::fs::read_to_string(path).map_err(|source| ShiftError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    match format {
        Format::Json => parse_json(path, &content),
        Format::Text => Ok(parse_text(path, &content)),
    }
}

/// Decode the JSON form. Only a top level that is not a page list is an
/// error; individual pages become faults.
pub fn parse_json(path: &Path, content: &str) -> Result<Document, ShiftError> {
    let raw: RawDocument = serde_json::from_str(content).map_err(|source| ShiftError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    let pages = raw
        .pages
        .into_iter()
        .enumerate()
        .map(|(i, value)| {
            serde_json::from_value::<PageContent>(value).map_err(|e| PageFault::Malformed {
                page: i + 1,
                reason: e.to_string(),
            })
        })
        .collect();

    Ok(Document {
        source: path.to_path_buf(),
        file_name: raw.file_name,
        pages,
    })
}

/// Split plain text into flow-text pages on form feeds.
pub fn parse_text(path: &Path, content: &str) -> Document {
    let pages = content
        .split(PAGE_BREAK)
        .map(|chunk| Ok(PageContent::text(chunk)))
        .collect();
    Document {
        source: path.to_path_buf(),
        file_name: None,
        pages,
    }
}

/// Documents under `root`: the file itself, or every supported file in
/// the directory tree, sorted by path.
pub fn discover(root: &Path) -> Result<Vec<PathBuf>, ShiftError> {
    if root.is_file() {
        return if is_supported(root) {
            Ok(vec![root.to_path_buf()])
        } else {
            Err(ShiftError::UnsupportedDocument(root.to_path_buf()))
        };
    }
    if !root.exists() {
        return Err(ShiftError::Io {
            path: root.to_path_buf(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        });
    }

    let mut paths: Vec<PathBuf> = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| is_supported(p))
        .collect();
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_json_pages_decode_independently() {
        let json = r#"{
            "file_name": "令和6年5月シフト表.pdf",
            "pages": [
                {"kind": "grid", "rows": [["日付", "時間", "名前"], ["16日", "10:00-18:00", "瓜田"]]},
                {"kind": "table", "rows": []},
                {"kind": "text", "text": "瓜田 20日 9:00-13:00"}
            ]
        }"#;
        let doc = parse_json(Path::new("may.json"), json).unwrap();
        assert_eq!(doc.display_name(), Some("令和6年5月シフト表.pdf"));
        assert_eq!(doc.pages.len(), 3);
        assert!(matches!(doc.pages[0], Ok(PageContent::Grid { .. })));
        assert!(matches!(doc.pages[1], Err(PageFault::Malformed { page: 2, .. })));
        assert_eq!(doc.pages[2], Ok(PageContent::text("瓜田 20日 9:00-13:00")));
        assert_eq!(doc.decoded_pages().len(), 2);
    }

    #[test]
    fn test_bad_top_level_is_an_error() {
        let err = parse_json(Path::new("x.json"), "[1, 2]").unwrap_err();
        assert!(matches!(err, ShiftError::Decode { .. }));
    }

    #[test]
    fn test_text_pages_split_on_form_feed() {
        let doc = parse_text(Path::new("dir/5月.txt"), "瓜田 1日\x0c瓜田 2日");
        assert_eq!(
            doc.pages,
            vec![Ok(PageContent::text("瓜田 1日")), Ok(PageContent::text("瓜田 2日"))]
        );
        assert_eq!(doc.display_name(), Some("5月.txt"));
    }

    #[test]
    fn test_load_and_discover() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("b");
        fs::create_dir(&nested).unwrap();
        fs::write(dir.path().join("a.txt"), "瓜田 1日 9:00-13:00").unwrap();
        fs::write(nested.join("c.json"), r#"{"pages": []}"#).unwrap();
        fs::write(dir.path().join("notes.md"), "ignored").unwrap();

        let found = discover(dir.path()).unwrap();
        assert_eq!(found, vec![dir.path().join("a.txt"), nested.join("c.json")]);

        let doc = load(&found[0]).unwrap();
        assert_eq!(doc.pages.len(), 1);
        let doc = load(&found[1]).unwrap();
        assert!(doc.pages.is_empty());
        assert_eq!(doc.file_name, None);
    }

    #[test]
    fn test_load_errors() {
        let dir = TempDir::new().unwrap();
        let md = dir.path().join("notes.md");
        fs::write(&md, "x").unwrap();
        assert!(matches!(load(&md), Err(ShiftError::UnsupportedDocument(_))));
        assert!(matches!(discover(&md), Err(ShiftError::UnsupportedDocument(_))));

        let missing = dir.path().join("missing.json");
        assert!(matches!(load(&missing), Err(ShiftError::Io { .. })));
        assert!(matches!(discover(&missing), Err(ShiftError::Io { .. })));
    }
}
