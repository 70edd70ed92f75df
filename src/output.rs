//! Run results: per-page records and the final summary.

use crate::error::PageFailure;
use std::path::PathBuf;

/// Outcome of one page's trip through the pipeline.
///
/// The page number is attached at creation and is the sole ordering key
/// everywhere downstream; position is never re-derived from discovery order.
#[derive(Debug, Clone)]
pub struct PageRecord {
    /// 1-based page number within the source document.
    pub number: u32,

    /// Where the transcribed text was staged, if the page succeeded.
    pub text_path: Option<PathBuf>,

    /// Why the page failed, if it did. Failed pages are skipped in the merge
    /// and leave no placeholder.
    pub error: Option<PageFailure>,
}

impl PageRecord {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Result of a full pipeline run.
///
/// Returned even when some pages failed; check [`RunOutcome::failed`] for
/// partial-failure detection.
#[derive(Debug)]
pub struct RunOutcome {
    /// Path of the merged artifact.
    pub merged_path: PathBuf,

    /// Pages whose transcription was attempted.
    pub attempted: usize,

    /// Pages that produced text.
    pub succeeded: usize,

    /// Pages that failed (resize or transcription).
    pub failed: usize,

    /// Per-page records, ordered by page number.
    pub pages: Vec<PageRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn succeeded_reflects_error_presence() {
        let ok = PageRecord {
            number: 1,
            text_path: Some(PathBuf::from("text/page_1.txt")),
            error: None,
        };
        let bad = PageRecord {
            number: 2,
            text_path: None,
            error: Some(PageFailure::Timeout { secs: 5 }),
        };
        assert!(ok.succeeded());
        assert!(!bad.succeeded());
    }
}
