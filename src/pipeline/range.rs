//! Page-range validation and resolution.
//!
//! Requested bounds are 1-based and inclusive; `0` on either side means
//! "unbounded in that direction". Validation happens strictly before
//! resolution so an out-of-range bound is reported as the user typed it,
//! not after it has been silently replaced by a default.

use crate::error::{Pdf2TextError, RangeBound};

/// A resolved, validated page range. Both bounds are 1-based, inclusive,
/// and `start <= end` holds by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
}

impl PageRange {
    /// Validate the requested bounds against `total` pages, then resolve
    /// open (`0`) bounds to the natural ones.
    ///
    /// Each bound is checked independently so the error names exactly the
    /// bound the user got wrong and the valid range.
    pub fn resolve(start: u32, end: u32, total: u32) -> Result<Self, Pdf2TextError> {
        check_bound(RangeBound::Start, start, total)?;
        check_bound(RangeBound::End, end, total)?;

        let start = if start == 0 { 1 } else { start };
        let end = if end == 0 { total } else { end };

        if start > end {
            return Err(Pdf2TextError::InvertedPageRange { start, end });
        }

        Ok(Self { start, end })
    }

    /// Number of pages in the range.
    pub fn len(&self) -> u32 {
        self.end - self.start + 1
    }

    pub fn is_empty(&self) -> bool {
        false // start <= end holds by construction
    }

    /// Page numbers in increasing order.
    pub fn pages(&self) -> impl Iterator<Item = u32> {
        self.start..=self.end
    }
}

fn check_bound(bound: RangeBound, value: u32, total: u32) -> Result<(), Pdf2TextError> {
    if value != 0 && (value < 1 || value > total) {
        return Err(Pdf2TextError::PageBoundOutOfRange {
            bound,
            value,
            total,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_bounds_resolve_to_natural_ones() {
        assert_eq!(PageRange::resolve(0, 0, 7).unwrap(), PageRange { start: 1, end: 7 });
        assert_eq!(PageRange::resolve(0, 4, 7).unwrap(), PageRange { start: 1, end: 4 });
        assert_eq!(PageRange::resolve(3, 0, 7).unwrap(), PageRange { start: 3, end: 7 });
    }

    #[test]
    fn explicit_bounds_pass_through() {
        let r = PageRange::resolve(2, 5, 10).unwrap();
        assert_eq!(r, PageRange { start: 2, end: 5 });
        assert_eq!(r.len(), 4);
        assert_eq!(r.pages().collect::<Vec<_>>(), vec![2, 3, 4, 5]);
    }

    #[test]
    fn full_single_page_document() {
        let r = PageRange::resolve(0, 0, 1).unwrap();
        assert_eq!(r, PageRange { start: 1, end: 1 });
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn start_past_the_document_names_the_start_bound() {
        let err = PageRange::resolve(9, 0, 5).unwrap_err();
        match err {
            Pdf2TextError::PageBoundOutOfRange { bound, value, total } => {
                assert_eq!(bound, RangeBound::Start);
                assert_eq!(value, 9);
                assert_eq!(total, 5);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn end_past_the_document_names_the_end_bound() {
        let err = PageRange::resolve(0, 6, 5).unwrap_err();
        match err {
            Pdf2TextError::PageBoundOutOfRange { bound, value, .. } => {
                assert_eq!(bound, RangeBound::End);
                assert_eq!(value, 6);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn validation_happens_before_resolution() {
        // end=6 is invalid even though start=0 would resolve fine
        assert!(PageRange::resolve(0, 6, 5).is_err());
        // both invalid: start is reported first
        match PageRange::resolve(9, 12, 5).unwrap_err() {
            Pdf2TextError::PageBoundOutOfRange { bound, .. } => {
                assert_eq!(bound, RangeBound::Start)
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn inverted_range_is_rejected_after_resolution() {
        let err = PageRange::resolve(4, 2, 5).unwrap_err();
        assert!(matches!(
            err,
            Pdf2TextError::InvertedPageRange { start: 4, end: 2 }
        ));
    }
}
