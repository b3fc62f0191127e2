//! Per-document driver.
//!
//! Pages are processed one at a time, in order. A grid page goes through
//! the grid strategy only; a text page goes through the four text
//! heuristics. Candidates from all pages are consolidated once at the end.

use std::borrow::Borrow;

use serde::Serialize;
use shift_types::{PageContent, ShiftRecord};

use crate::consolidate::consolidate;
use crate::error::{PageFault, ShiftError};
use crate::grid::{GridPolicy, extract_from_grid};
use crate::name::TargetName;
use crate::observe::{Diagnostic, Observer, TracingObserver};
use crate::text::{TextPolicy, TextScanner};

/// Result of one document.
///
/// `shifts` empty with `faults` empty means the name has no shifts in the
/// document. Faults never discard shifts found on other pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Extraction {
    pub shifts: Vec<ShiftRecord>,
    #[serde(serialize_with = "faults_as_strings")]
    pub faults: Vec<PageFault>,
    /// Pages seen, including faulty ones.
    pub pages: usize,
}

fn faults_as_strings<S: serde::Serializer>(
    faults: &[PageFault],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(faults.iter().map(|f| f.to_string()))
}

impl Extraction {
    /// A document-level failure: nothing could be decoded.
    pub fn failed(fault: PageFault) -> Self {
        Self {
            shifts: Vec::new(),
            faults: vec![fault],
            pages: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.shifts.is_empty()
    }

    /// Every page was processed.
    pub fn is_complete(&self) -> bool {
        self.faults.is_empty()
    }
}

/// Extracts one person's shifts from decoded documents.
pub struct ShiftExtractor<'o> {
    target: TargetName,
    grid_policy: GridPolicy,
    text: TextScanner,
    observer: &'o dyn Observer,
}

impl ShiftExtractor<'static> {
    /// Extractor reporting diagnostics to `tracing`.
    pub fn new(
        target: TargetName,
        grid_policy: GridPolicy,
        text_policy: &TextPolicy,
    ) -> Result<Self, ShiftError> {
        let text = TextScanner::new(&target, text_policy)?;
        Ok(ShiftExtractor {
            target,
            grid_policy,
            text,
            observer: &TracingObserver,
        })
    }
}

impl<'o> ShiftExtractor<'o> {
    /// Replace the diagnostics observer.
    pub fn with_observer<'a>(self, observer: &'a dyn Observer) -> ShiftExtractor<'a> {
        ShiftExtractor {
            target: self.target,
            grid_policy: self.grid_policy,
            text: self.text,
            observer,
        }
    }

    pub fn target(&self) -> &TargetName {
        &self.target
    }

    /// Unconsolidated candidates from a single page.
    pub fn extract_page(&self, page_number: usize, page: &PageContent) -> Vec<ShiftRecord> {
        self.observer.observe(&Diagnostic::PageStarted {
            page: page_number,
            kind: page.kind(),
        });
        match page {
            PageContent::Grid { rows } => {
                extract_from_grid(rows, &self.target, &self.grid_policy, self.observer)
            }
            PageContent::FlowText { text } => self.text.scan(text, self.observer),
        }
    }

    /// Process pages as they arrive and consolidate the result.
    ///
    /// Page numbers count from 1 in iteration order. A faulty page is
    /// recorded and skipped.
    pub fn extract<I, P>(&self, pages: I) -> Extraction
    where
        I: IntoIterator<Item = Result<P, PageFault>>,
        P: Borrow<PageContent>,
    {
        let mut candidates = Vec::new();
        let mut faults = Vec::new();
        let mut count = 0;

        for (i, page) in pages.into_iter().enumerate() {
            count += 1;
            match page {
                Ok(page) => candidates.extend(self.extract_page(i + 1, page.borrow())),
                Err(fault) => {
                    self.observer.observe(&Diagnostic::PageFault(fault.clone()));
                    faults.push(fault);
                }
            }
        }

        let found = candidates.len();
        let shifts = consolidate(candidates);
        self.observer.observe(&Diagnostic::Consolidated {
            found,
            kept: shifts.len(),
        });

        Extraction {
            shifts,
            faults,
            pages: count,
        }
    }

    /// [`extract`](Self::extract) over pages that are already decoded.
    pub fn extract_document(&self, pages: &[PageContent]) -> Extraction {
        self.extract(pages.iter().map(Ok))
    }
}

/// Shifts for `target` in `pages`, with default policies.
pub fn extract_shifts(pages: &[PageContent], target: &str) -> Result<Extraction, ShiftError> {
    let target = TargetName::new(target)?;
    let extractor = ShiftExtractor::new(target, GridPolicy::default(), &TextPolicy::default())?;
    Ok(extractor.extract_document(pages))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observe::NullObserver;
    use crate::observe::tests::Recorder;

    fn grid(rows: &[&[&str]]) -> PageContent {
        PageContent::grid(rows.iter().map(|r| {
            r.iter()
                .map(|c| (!c.is_empty()).then(|| c.to_string()))
                .collect::<Vec<_>>()
        }))
    }

    fn scenario_a() -> PageContent {
        grid(&[
            &["日付", "曜日", "時間", "名前"],
            &["16日", "月", "10:00-18:00", "瓜田太郎"],
        ])
    }

    fn extractor(name: &str) -> ShiftExtractor<'static> {
        ShiftExtractor::new(
            TargetName::new(name).unwrap(),
            GridPolicy::default(),
            &TextPolicy::default(),
        )
        .unwrap()
        .with_observer(&NullObserver)
    }

    #[test]
    fn test_scenario_a_grid() {
        let out = extract_shifts(&[scenario_a()], "瓜田").unwrap();
        assert_eq!(out.shifts, vec![ShiftRecord::new(16, "10:00-18:00")]);
        assert!(out.is_complete());
        assert_eq!(out.pages, 1);
    }

    #[test]
    fn test_scenario_b_text_is_deduplicated() {
        let out = extract_shifts(&[PageContent::text("瓜田さんは16日10:00-18:00勤務")], "瓜田")
            .unwrap();
        assert_eq!(out.shifts, vec![ShiftRecord::new(16, "10:00-18:00")]);
    }

    #[test]
    fn test_scenario_c_no_match_is_not_an_error() {
        let out = extract_shifts(&[scenario_a()], "佐藤").unwrap();
        assert!(out.is_empty());
        assert!(out.is_complete());
    }

    #[test]
    fn test_empty_name_is_an_error() {
        assert!(matches!(
            extract_shifts(&[scenario_a()], ""),
            Err(ShiftError::EmptyTargetName)
        ));
    }

    #[test]
    fn test_grid_page_never_runs_text_heuristics() {
        // The name cell carries a full "N日 time" phrase that the text
        // heuristics would pick up; the grid date column says 16日.
        let page = grid(&[
            &["日付", "時間", "名前"],
            &["16日", "10:00-18:00", "瓜田 20日 9:00-12:00"],
        ]);
        let recorder = Recorder::default();
        let ex = extractor("瓜田").with_observer(&recorder);
        let out = ex.extract_document(&[page]);
        assert_eq!(out.shifts, vec![ShiftRecord::new(16, "10:00-18:00")]);
        assert!(
            recorder
                .candidates()
                .iter()
                .all(|(origin, _)| *origin == crate::observe::Origin::Grid)
        );
    }

    #[test]
    fn test_pages_merge_sort_and_dedupe() {
        let pages = vec![
            PageContent::text("瓜田 20日 9:00-13:00"),
            scenario_a(),
            grid(&[
                &["日付", "曜日", "時間", "名前"],
                &["9日", "木", "13:00-17:00", "瓜田"],
                &["16日", "月", "10:00-18:00", "瓜田"],
            ]),
        ];
        let out = extractor("瓜田").extract_document(&pages);
        assert_eq!(
            out.shifts,
            vec![
                ShiftRecord::new(9, "13:00-17:00"),
                ShiftRecord::new(16, "10:00-18:00"),
                ShiftRecord::new(20, "9:00-13:00"),
            ]
        );
        assert_eq!(out.pages, 3);
    }

    #[test]
    fn test_fault_keeps_other_pages() {
        let pages: Vec<Result<PageContent, PageFault>> = vec![
            Ok(scenario_a()),
            Err(PageFault::Undecodable {
                page: 2,
                reason: "corrupt stream".into(),
            }),
            Ok(PageContent::text("瓜田 20日 9:00-13:00")),
        ];
        let recorder = Recorder::default();
        let ex = extractor("瓜田").with_observer(&recorder);
        let out = ex.extract(pages);
        assert_eq!(out.shifts.len(), 2);
        assert_eq!(out.faults.len(), 1);
        assert_eq!(out.faults[0].page(), 2);
        assert!(!out.is_complete());
        let seen = recorder.0.lock().unwrap();
        assert!(seen.iter().any(|d| matches!(d, Diagnostic::PageFault(_))));
        assert!(seen.contains(&Diagnostic::Consolidated { found: 4, kept: 2 }));
    }

    #[test]
    fn test_extractor_is_shared_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ShiftExtractor<'static>>();

        let recorder = Recorder::default();
        let ex = extractor("瓜田").with_observer(&recorder);
        let documents = [
            vec![scenario_a()],
            vec![PageContent::text("瓜田 20日 9:00-13:00")],
        ];
        let results: Vec<Extraction> = std::thread::scope(|s| {
            let handles: Vec<_> = documents
                .iter()
                .map(|pages| {
                    let ex = &ex;
                    s.spawn(move || ex.extract_document(pages))
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(results[0].shifts, vec![ShiftRecord::new(16, "10:00-18:00")]);
        assert_eq!(results[1].shifts, vec![ShiftRecord::new(20, "9:00-13:00")]);
        let consolidated = recorder
            .0
            .lock()
            .unwrap()
            .iter()
            .filter(|d| matches!(d, Diagnostic::Consolidated { .. }))
            .count();
        assert_eq!(consolidated, 2);
    }

    #[test]
    fn test_failed_document() {
        let out = Extraction::failed(PageFault::Undecodable {
            page: 0,
            reason: "not a PDF".into(),
        });
        assert!(out.is_empty());
        assert!(!out.is_complete());
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["faults"][0], "page 0: could not be decoded: not a PDF");
    }

    #[test]
    fn test_empty_grid_page_contributes_nothing() {
        let out = extractor("瓜田").extract_document(&[PageContent::Grid { rows: vec![] }]);
        assert!(out.is_empty());
        assert!(out.is_complete());
    }
}
