//! Progress-event trait for per-page run events.
//!
//! Inject an [`Arc<dyn RunProgress>`] via
//! [`crate::config::RunConfigBuilder::progress`] to receive events as the
//! pipeline works through each stage. Callers can forward them to a terminal
//! progress bar, a channel, or a log sink without the library knowing how the
//! host application communicates. All methods default to no-ops so
//! implementations only override what they care about.

use std::sync::Arc;

/// Called by the pipeline as it renders, resizes, and transcribes pages.
///
/// Pages are processed strictly in increasing page-number order, so events
/// for page N always precede events for page N+1. Implementations must still
/// be `Send + Sync`: the trait object is shared with blocking tasks.
pub trait RunProgress: Send + Sync {
    /// All pages of the selected range have been rasterised.
    fn on_render_complete(&self, first_page: u32, last_page: u32) {
        let _ = (first_page, last_page);
    }

    /// One staged image was resized (`done` of `total`).
    fn on_resize(&self, page: u32, done: usize, total: usize) {
        let _ = (page, done, total);
    }

    /// A page's transcription request is about to be sent.
    fn on_page_start(&self, page: u32, done: usize, total: usize) {
        let _ = (page, done, total);
    }

    /// A page transcribed successfully (`text_len` bytes of text).
    fn on_page_complete(&self, page: u32, done: usize, total: usize, text_len: usize) {
        let _ = (page, done, total, text_len);
    }

    /// A page failed; the run continues with the next page.
    fn on_page_failed(&self, page: u32, done: usize, total: usize, error: &str) {
        let _ = (page, done, total, error);
    }
}

/// No-op implementation used when no progress sink is configured.
pub struct NoopProgress;

impl RunProgress for NoopProgress {}

/// Convenience alias matching the type stored in [`crate::config::RunConfig`].
pub type ProgressSink = Arc<dyn RunProgress>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        completes: AtomicUsize,
        failures: AtomicUsize,
    }

    impl RunProgress for Counting {
        fn on_page_complete(&self, _page: u32, _done: usize, _total: usize, _len: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }
        fn on_page_failed(&self, _page: u32, _done: usize, _total: usize, _error: &str) {
            self.failures.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_does_not_panic() {
        let p = NoopProgress;
        p.on_render_complete(1, 3);
        p.on_resize(1, 1, 3);
        p.on_page_start(1, 0, 3);
        p.on_page_complete(1, 1, 3, 42);
        p.on_page_failed(2, 2, 3, "boom");
    }

    #[test]
    fn overridden_methods_receive_events() {
        let c = Counting {
            completes: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
        };
        c.on_page_start(1, 0, 2);
        c.on_page_complete(1, 1, 2, 10);
        c.on_page_failed(2, 2, 2, "timeout");
        assert_eq!(c.completes.load(Ordering::SeqCst), 1);
        assert_eq!(c.failures.load(Ordering::SeqCst), 1);
    }
}
