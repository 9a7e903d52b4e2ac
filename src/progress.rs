//! Progress-callback trait for analysis events.
//!
//! Inject an [`Arc<dyn AnalysisProgressCallback>`] via
//! [`crate::config::AnalysisConfigBuilder::progress_callback`] to receive
//! events as the orchestrator extracts each chunk and generates the report.
//! The library never prints; the CLI turns these events into a progress bar.
//!
//! # Example
//!
//! ```rust
//! use exec_summary_analyzer::{AnalysisConfig, AnalysisProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct DroppedChunks(AtomicUsize);
//!
//! impl AnalysisProgressCallback for DroppedChunks {
//!     fn on_chunk_error(&self, chunk: usize, total: usize, error: String) {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("chunk {chunk}/{total} dropped: {error}");
//!     }
//! }
//!
//! let config = AnalysisConfig::builder()
//!     .progress_callback(Arc::new(DroppedChunks(AtomicUsize::new(0))))
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the orchestrator as it moves through an analysis.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Chunk numbers are 1-indexed.
pub trait AnalysisProgressCallback: Send + Sync {
    /// Called once the document has been chunked.
    ///
    /// # Arguments
    /// * `total_chunks`: number of chunks that will be sent for extraction
    fn on_analysis_start(&self, total_chunks: usize) {
        let _ = total_chunks;
    }

    /// Called just before the extraction request for a chunk is sent.
    fn on_chunk_start(&self, chunk: usize, total_chunks: usize) {
        let _ = (chunk, total_chunks);
    }

    /// Called when a chunk produced a usable extraction result.
    ///
    /// # Arguments
    /// * `fields_found`: fields the reply answered with real content
    fn on_chunk_complete(&self, chunk: usize, total_chunks: usize, fields_found: usize) {
        let _ = (chunk, total_chunks, fields_found);
    }

    /// Called when a chunk was dropped.
    fn on_chunk_error(&self, chunk: usize, total_chunks: usize, error: String) {
        let _ = (chunk, total_chunks, error);
    }

    /// Called before the report-generation request is sent.
    fn on_report_start(&self) {}

    /// Called once the report has been generated and parsed.
    ///
    /// # Arguments
    /// * `succeeded_chunks`: chunks whose extraction was merged
    /// * `total_chunks`    : chunks attempted
    fn on_analysis_complete(&self, succeeded_chunks: usize, total_chunks: usize) {
        let _ = (succeeded_chunks, total_chunks);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl AnalysisProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::AnalysisConfig`].
pub type ProgressCallback = Arc<dyn AnalysisProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        started_total: AtomicUsize,
        starts: AtomicUsize,
        completes: AtomicUsize,
        errors: AtomicUsize,
        reports: AtomicUsize,
        succeeded: AtomicUsize,
    }

    impl AnalysisProgressCallback for TrackingCallback {
        fn on_analysis_start(&self, total_chunks: usize) {
            self.started_total.store(total_chunks, Ordering::SeqCst);
        }

        fn on_chunk_start(&self, _chunk: usize, _total: usize) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_chunk_complete(&self, _chunk: usize, _total: usize, _fields: usize) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_chunk_error(&self, _chunk: usize, _total: usize, _error: String) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }

        fn on_report_start(&self) {
            self.reports.fetch_add(1, Ordering::SeqCst);
        }

        fn on_analysis_complete(&self, succeeded: usize, _total: usize) {
            self.succeeded.store(succeeded, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_analysis_start(3);
        cb.on_chunk_start(1, 3);
        cb.on_chunk_complete(1, 3, 7);
        cb.on_chunk_error(2, 3, "bad json".to_string());
        cb.on_report_start();
        cb.on_analysis_complete(1, 3);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();

        tracker.on_analysis_start(3);
        tracker.on_chunk_start(1, 3);
        tracker.on_chunk_complete(1, 3, 11);
        tracker.on_chunk_start(2, 3);
        tracker.on_chunk_error(2, 3, "timeout".to_string());
        tracker.on_chunk_start(3, 3);
        tracker.on_chunk_complete(3, 3, 4);
        tracker.on_report_start();
        tracker.on_analysis_complete(2, 3);

        assert_eq!(tracker.started_total.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.starts.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.reports.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.succeeded.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_analysis_start(1);
        cb.on_chunk_start(1, 1);
    }
}
