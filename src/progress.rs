//! Progress-callback trait for per-document scan events.
//!
//! Pass an [`Arc<dyn ScanProgressCallback>`] to
//! [`crate::scorer::PScorer::with_progress`] to be told as each document of
//! a batch is read. The CLI uses it to drive a progress bar; library callers
//! can forward events anywhere without the scorer knowing how.
//!
//! # Example
//!
//! ```rust
//! use pscore::ScanProgressCallback;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! struct CountingCallback {
//!     values: AtomicUsize,
//! }
//!
//! impl ScanProgressCallback for CountingCallback {
//!     fn on_document_complete(&self, index: usize, total: usize, value_count: usize) {
//!         self.values.fetch_add(value_count, Ordering::SeqCst);
//!         eprintln!("document {}/{}: {} p-values", index, total, value_count);
//!     }
//! }
//! ```

use std::sync::Arc;

/// Called by the scorer as it processes each document.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Documents are processed one at a time, in order.
pub trait ScanProgressCallback: Send + Sync {
    /// Called once before the first document is opened.
    fn on_scan_start(&self, total_documents: usize) {
        let _ = total_documents;
    }

    /// Called just before a document is opened.
    ///
    /// # Arguments
    /// * `index`   : 1-indexed position in the batch
    /// * `total`   : number of documents in the batch
    /// * `document`: identifier as given by the caller
    fn on_document_start(&self, index: usize, total: usize, document: &str) {
        let _ = (index, total, document);
    }

    /// Called when a document was read and all its matches normalised.
    fn on_document_complete(&self, index: usize, total: usize, value_count: usize) {
        let _ = (index, total, value_count);
    }

    /// Called when a document could not be read; it contributes no values.
    fn on_document_error(&self, index: usize, total: usize, error: &str) {
        let _ = (index, total, error);
    }

    /// Called once after the last document.
    ///
    /// # Arguments
    /// * `total_documents`: documents in the batch
    /// * `total_values`   : values collected across the batch, before
    ///   significance filtering
    fn on_scan_complete(&self, total_documents: usize, total_values: usize) {
        let _ = (total_documents, total_values);
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// Useful where a callback value is required; a scorer without
/// [`crate::scorer::PScorer::with_progress`] simply fires no events.
pub struct NoopProgressCallback;

impl ScanProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in the scorer.
pub type ProgressCallback = Arc<dyn ScanProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        starts: AtomicUsize,
        completes: AtomicUsize,
        errors: AtomicUsize,
        values: AtomicUsize,
    }

    impl ScanProgressCallback for TrackingCallback {
        fn on_document_start(&self, _index: usize, _total: usize, _document: &str) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_document_complete(&self, _index: usize, _total: usize, value_count: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
            self.values.fetch_add(value_count, Ordering::SeqCst);
        }

        fn on_document_error(&self, _index: usize, _total: usize, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_scan_start(2);
        cb.on_document_start(1, 2, "a.pdf");
        cb.on_document_complete(1, 2, 7);
        cb.on_document_error(2, 2, "unreadable");
        cb.on_scan_complete(2, 7);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_document_start(1, 2, "a.pdf");
        tracker.on_document_complete(1, 2, 4);
        tracker.on_document_start(2, 2, "b.pdf");
        tracker.on_document_error(2, 2, "could not read document");

        assert_eq!(tracker.starts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.values.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_scan_start(1);
        cb.on_document_complete(1, 1, 0);
    }
}
