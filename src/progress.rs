//! Progress-callback trait for per-record batch events.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::config::GenerationConfigBuilder::progress_callback`] to
//! receive real-time events as the batch processes each record.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point:
//! callers can forward events to a channel, a WebSocket, a database
//! record, or a terminal progress bar — without the library knowing
//! anything about how the host application communicates. The trait is
//! `Send + Sync` because records are processed concurrently by multiple
//! workers.

use std::path::Path;
use std::sync::Arc;

/// Called by the batch orchestrator as it processes each record.
///
/// All methods have default no-op implementations so callers only
/// override what they care about.
///
/// # Thread safety
///
/// With `concurrency > 1`, `on_record_start`, `on_record_complete`, and
/// `on_record_error` may be called concurrently from different worker
/// threads. Implementations must protect shared mutable state.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once before any record is processed.
    fn on_batch_start(&self, total_records: usize) {
        let _ = total_records;
    }

    /// Called just before a record enters the pipeline.
    ///
    /// `index` is 1-based, matching the `{index}` filename placeholder.
    fn on_record_start(&self, index: usize, total_records: usize) {
        let _ = (index, total_records);
    }

    /// Called when a record's document was written successfully.
    fn on_record_complete(&self, index: usize, total_records: usize, path: &Path) {
        let _ = (index, total_records, path);
    }

    /// Called when a record failed; the batch continues with the next.
    fn on_record_error(&self, index: usize, total_records: usize, error: &str) {
        let _ = (index, total_records, error);
    }

    /// Called once after all records have been attempted.
    fn on_batch_complete(&self, total_records: usize, generated: usize) {
        let _ = (total_records, generated);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in
/// [`crate::config::GenerationConfig`].
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;
