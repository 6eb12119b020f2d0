//! Progress-callback trait and cancellation token for extraction jobs.
//!
//! Pass an `&dyn ExtractionProgress` to [`crate::Extractor::extract_blocking`]
//! (or a [`ProgressCallback`] to the async wrappers) to receive events as
//! the pipeline works through the pages. The batch CLI forwards them to an
//! indicatif bar, the terminal UI to the shared job status it redraws.
//!
//! # Example
//!
//! ```rust
//! use ocr_extract::ExtractionProgress;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! struct Counter(AtomicUsize);
//!
//! impl ExtractionProgress for Counter {
//!     fn on_page_complete(&self, completed: usize, total: usize, _page_num: usize, _chars: usize) {
//!         self.0.store(completed, Ordering::SeqCst);
//!         eprintln!("Progress: {completed}/{total} pages processed.");
//!     }
//! }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Called by the extraction pipeline as it processes each page.
///
/// Pages are processed strictly in order on one thread, so callbacks never
/// overlap for a single job. Implementations must still be `Send + Sync`
/// because the job itself may run on a worker thread.
pub trait ExtractionProgress: Send + Sync {
    /// Called once before the first page is rendered.
    ///
    /// # Arguments
    /// * `total_pages`: number of units that will be processed (1 for images)
    fn on_job_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called just before a page is handed to the OCR engine.
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called after each unit of work.
    ///
    /// # Arguments
    /// * `completed`: units done so far, 1..=total
    /// * `total`    : units in this job
    /// * `page_num` : 1-indexed page number of the unit just finished
    /// * `chars`    : length of the recognised text for this page
    fn on_page_complete(&self, completed: usize, total: usize, page_num: usize, chars: usize) {
        let _ = (completed, total, page_num, chars);
    }

    /// Called once after the last page has been recognised.
    fn on_job_complete(&self, total_pages: usize) {
        let _ = total_pages;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgress;

impl ExtractionProgress for NoopProgress {}

/// Shared progress callback, as stored by the async entry points.
pub type ProgressCallback = Arc<dyn ExtractionProgress>;

/// Scale `completed / total` to a whole percentage for a 0–100 gauge.
pub fn percent(completed: usize, total: usize) -> u16 {
    if total == 0 {
        return 0;
    }
    ((completed.min(total) * 100) / total) as u16
}

/// Cooperative cancellation flag, checked between pages.
///
/// Cloning shares the flag; cancelling any clone cancels them all.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct TrackingProgress {
        started_total: AtomicUsize,
        starts: AtomicUsize,
        last_completed: AtomicUsize,
        finished: AtomicUsize,
    }

    impl ExtractionProgress for TrackingProgress {
        fn on_job_start(&self, total_pages: usize) {
            self.started_total.store(total_pages, Ordering::SeqCst);
        }

        fn on_page_start(&self, _page_num: usize, _total_pages: usize) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_page_complete(&self, completed: usize, _total: usize, _page_num: usize, _chars: usize) {
            self.last_completed.store(completed, Ordering::SeqCst);
        }

        fn on_job_complete(&self, total_pages: usize) {
            self.finished.store(total_pages, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_progress_does_not_panic() {
        let cb = NoopProgress;
        cb.on_job_start(5);
        cb.on_page_start(1, 5);
        cb.on_page_complete(1, 5, 1, 42);
        cb.on_job_complete(5);
    }

    #[test]
    fn tracking_progress_receives_events() {
        let tracker = TrackingProgress {
            started_total: AtomicUsize::new(0),
            starts: AtomicUsize::new(0),
            last_completed: AtomicUsize::new(0),
            finished: AtomicUsize::new(0),
        };

        tracker.on_job_start(2);
        tracker.on_page_start(1, 2);
        tracker.on_page_complete(1, 2, 1, 10);
        tracker.on_page_start(2, 2);
        tracker.on_page_complete(2, 2, 2, 20);
        tracker.on_job_complete(2);

        assert_eq!(tracker.started_total.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.last_completed.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.finished.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn percent_scales_to_gauge() {
        assert_eq!(percent(0, 4), 0);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(3, 3), 100);
        assert_eq!(percent(5, 3), 100);
        assert_eq!(percent(0, 0), 0);
    }

    #[test]
    fn cancel_token_is_shared_between_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!token.is_cancelled());
        clone.cancel();
        assert!(token.is_cancelled());
    }
}
