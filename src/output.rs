//! Result types returned by the batch orchestrator.

use crate::error::RecordError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Outcome of one record's trip through the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordResult {
    /// 1-based batch position, matching the `{index}` filename
    /// placeholder and the positions used in log messages.
    pub index: usize,

    /// The file name derived from the filename pattern for this record.
    pub filename: String,

    /// Absolute path of the written document; `None` when the record
    /// failed.
    pub path: Option<PathBuf>,

    /// Wall-clock time spent on this record, in milliseconds.
    pub duration_ms: u64,

    /// The per-record failure, if any. `None` means `path` is set.
    pub error: Option<RecordError>,
}

/// Aggregate statistics for one batch run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchStats {
    /// Records submitted.
    pub total_records: usize,
    /// Records that produced an output file.
    pub generated: usize,
    /// Records that failed and were skipped.
    pub failed: usize,
    /// Rendering-engine sessions launched across all workers. Stays at
    /// the worker count (or below) when sessions are reused as intended.
    pub engine_launches: usize,
    /// End-to-end batch duration in milliseconds.
    pub total_duration_ms: u64,
}

/// Everything a batch run produced.
///
/// A batch "succeeds" even when individual records fail; callers decide
/// how to treat partial results. [`BatchOutput::is_total_failure`] is
/// the signal that a non-empty input produced nothing at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutput {
    /// Paths of successfully produced documents, in record order. May be
    /// shorter than the input list.
    pub files: Vec<PathBuf>,

    /// Per-record outcomes, in record order, failures included.
    pub records: Vec<RecordResult>,

    /// Aggregate statistics.
    pub stats: BatchStats,
}

impl BatchOutput {
    /// True when a non-empty batch produced no output at all. The caller
    /// must decide how to report this; the orchestrator does not treat
    /// it as an error by itself.
    pub fn is_total_failure(&self) -> bool {
        self.stats.total_records > 0 && self.files.is_empty()
    }
}
