//! Error types for the merge2pdf library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`MergeError`] — **Fatal**: the generation cannot proceed at all
//!   (forbidden template construct, rendering engine missing, bad config).
//!   Returned as `Err(MergeError)` from the top-level entry points.
//!
//! * [`RecordError`] — **Non-fatal**: a single record failed (template
//!   evaluation error, per-document timeout) but all other records are
//!   fine. Stored inside [`crate::output::RecordResult`] so callers can
//!   inspect partial success rather than losing the whole batch to one
//!   bad record.
//!
//! The separation lets callers decide their own tolerance: abort on the
//! first record failure, log and continue, or collect all errors for a
//! post-run report.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the merge2pdf library.
///
/// Record-level failures use [`RecordError`] and are stored in
/// [`crate::output::RecordResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum MergeError {
    // ── Template errors ───────────────────────────────────────────────────
    /// The template contains a construct that could escape the
    /// data-substitution sandbox. Raised before any engine invocation;
    /// never retried.
    #[error(
        "Template contains a forbidden construct: {pattern}\n\
         Cross-template directives and reflection-style attribute access\n\
         are not allowed in mail-merge templates."
    )]
    SandboxViolation { pattern: String },

    /// The template is not syntactically valid.
    #[error("Template failed to compile: {detail}")]
    TemplateParse { detail: String },

    /// The template compiled but evaluation against a record failed.
    #[error("Template evaluation failed: {detail}")]
    TemplateRender { detail: String },

    // ── Engine errors ─────────────────────────────────────────────────────
    /// The rendering engine could not start for a worker. Fatal to the
    /// whole batch: it indicates a systemic problem (missing browser
    /// binary, missing shared libraries), not bad record data.
    #[error(
        "Rendering engine failed to start: {detail}\n\
         Check that a Chrome or Chromium binary is installed and reachable,\n\
         or point the config at one with `chrome_binary`."
    )]
    EngineUnavailable { detail: String },

    /// Document content failed to reach a ready state within the bound.
    #[error("Content failed to reach a ready state within {secs}s: {detail}")]
    RenderTimeout { secs: u64, detail: String },

    /// The engine rejected the page or the print command itself failed.
    #[error("Rasterisation failed: {detail}")]
    RasterizeFailed { detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Rasterisation reported success but no file materialised — an
    /// internal-consistency error.
    #[error("Rasterisation reported success but no output materialised at '{path}'")]
    OutputMissing { path: PathBuf },

    /// Could not create or write an output file or directory.
    #[error("Failed to write output '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single record.
///
/// Stored alongside [`crate::output::RecordResult`] when a record fails.
/// The overall batch continues; the failed record simply produces no
/// output file.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum RecordError {
    /// Template evaluation failed for this record's data.
    #[error("Record {index}: template evaluation failed: {detail}")]
    RenderFailed { index: usize, detail: String },

    /// The engine failed to rasterise this record's document.
    #[error("Record {index}: rasterisation failed: {detail}")]
    RasterizeFailed { index: usize, detail: String },

    /// The document did not reach a ready state within the bound.
    #[error("Record {index}: content load timed out after {secs}s")]
    Timeout { index: usize, secs: u64 },
}
