//! Batch orchestration: drive an ordered list of records through the
//! pipeline with per-record failure isolation and guaranteed engine
//! teardown.
//!
//! ## Failure policy
//!
//! One bad record never aborts the batch: its error is logged with the
//! record's position, recorded in the output, and the loop moves on.
//! Two failures are different in kind and abort the whole run instead:
//! a sandbox violation (the template is shared, so every record would
//! fail the same way — and it must fail *before* any engine starts) and
//! an engine that cannot launch (a systemic problem, not bad data).
//!
//! ## Teardown guarantee
//!
//! Every worker tears its session down when its loop ends, and
//! [`crate::engine::Worker`] repeats the teardown on `Drop`, so even a
//! panicking record leaves no engine process behind.

use crate::config::GenerationConfig;
use crate::engine::Worker;
use crate::error::{MergeError, RecordError};
use crate::output::{BatchOutput, BatchStats, RecordResult};
use crate::pipeline::{filename, render};
use crate::template::{Record, Template};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Generate one PDF per record.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `template`   — shared template, stylesheet, and decorative assets
/// * `records`    — ordered records; each yields at most one document
/// * `output_dir` — directory the PDFs are written into (created if
///   missing)
/// * `config`     — generation configuration, including the filename
///   pattern
///
/// # Returns
/// `Ok(BatchOutput)` even when individual records failed — check
/// `output.stats.failed` or [`BatchOutput::is_total_failure`].
///
/// # Errors
/// Returns `Err(MergeError)` only for batch-fatal conditions:
/// - the template contains a forbidden construct (checked before any
///   engine invocation)
/// - the rendering engine cannot start
/// - the output directory cannot be created
pub async fn generate_batch(
    template: &Template,
    records: Vec<Record>,
    output_dir: impl AsRef<Path>,
    config: &GenerationConfig,
) -> Result<BatchOutput, MergeError> {
    let total_start = Instant::now();
    let total = records.len();
    let output_dir = output_dir.as_ref().to_path_buf();
    info!("Starting batch: {} records → {}", total, output_dir.display());

    // ── Step 1: Sandbox scan, before any engine invocation ───────────────
    render::scan_template(&template.content)?;

    // ── Step 2: Ensure the output directory exists ───────────────────────
    tokio::fs::create_dir_all(&output_dir)
        .await
        .map_err(|e| MergeError::OutputWriteFailed {
            path: output_dir.clone(),
            source: e,
        })?;

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    // ── Step 3: Fan out over a bounded worker pool ───────────────────────
    // Workers pull from a shared queue; each exclusively owns the engine
    // session it launches lazily on its first record.
    let queue: Arc<Mutex<VecDeque<(usize, Record)>>> = Arc::new(Mutex::new(
        records
            .into_iter()
            .enumerate()
            .map(|(i, r)| (i + 1, r))
            .collect(),
    ));
    let results: Arc<Mutex<Vec<RecordResult>>> = Arc::new(Mutex::new(Vec::with_capacity(total)));
    let launches = Arc::new(AtomicUsize::new(0));

    let worker_count = config.concurrency.min(total);
    let mut handles = Vec::with_capacity(worker_count);
    for worker_id in 0..worker_count {
        let template = template.clone();
        let config = config.clone();
        let queue = Arc::clone(&queue);
        let results = Arc::clone(&results);
        let launches = Arc::clone(&launches);
        let output_dir = output_dir.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            worker_loop(
                worker_id, &template, &output_dir, &config, total, &queue, &results, &launches,
            )
        }));
    }

    // ── Step 4: Join workers; a fatal engine error aborts the batch ──────
    let mut fatal: Option<MergeError> = None;
    for handle in futures::future::join_all(handles).await {
        match handle {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!("Worker aborted: {e}");
                fatal.get_or_insert(e);
            }
            Err(join_err) => {
                fatal.get_or_insert(MergeError::Internal(format!(
                    "worker panicked: {join_err}"
                )));
            }
        }
    }
    if let Some(e) = fatal {
        return Err(e);
    }

    // ── Step 5: Collect results in record order ──────────────────────────
    let mut records_out = match Arc::try_unwrap(results) {
        Ok(m) => m.into_inner().unwrap_or_else(PoisonError::into_inner),
        Err(arc) => arc.lock().unwrap_or_else(PoisonError::into_inner).clone(),
    };
    records_out.sort_by_key(|r| r.index);

    let files: Vec<PathBuf> = records_out.iter().filter_map(|r| r.path.clone()).collect();
    let generated = files.len();
    let failed = records_out.iter().filter(|r| r.error.is_some()).count();

    // ── Step 6: Stats ────────────────────────────────────────────────────
    let stats = BatchStats {
        total_records: total,
        generated,
        failed,
        engine_launches: launches.load(Ordering::SeqCst),
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Batch complete: {}/{} documents, {}ms total",
        generated, total, stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(total, generated);
    }

    Ok(BatchOutput {
        files,
        records: records_out,
        stats,
    })
}

/// Synchronous wrapper around [`generate_batch`].
///
/// Creates a temporary tokio runtime internally.
pub fn generate_batch_sync(
    template: &Template,
    records: Vec<Record>,
    output_dir: impl AsRef<Path>,
    config: &GenerationConfig,
) -> Result<BatchOutput, MergeError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| MergeError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(generate_batch(template, records, output_dir, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// How a single record's processing ended, from the worker's viewpoint.
enum RecordFailure {
    /// Systemic problem; the worker stops and the batch fails.
    Fatal(MergeError),
    /// This record is bad; log it and continue with the next.
    Skip(RecordError),
}

/// One worker's life: pull records until the queue is dry, then tear the
/// session down. Runs on a blocking thread because the engine protocol
/// is synchronous.
#[allow(clippy::too_many_arguments)]
fn worker_loop(
    id: usize,
    template: &Template,
    output_dir: &Path,
    config: &GenerationConfig,
    total: usize,
    queue: &Mutex<VecDeque<(usize, Record)>>,
    results: &Mutex<Vec<RecordResult>>,
    launches: &AtomicUsize,
) -> Result<(), MergeError> {
    let mut worker = Worker::new(id, config.clone());

    let outcome = loop {
        let next = queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        let Some((index, record)) = next else {
            break Ok(());
        };

        if let Some(ref cb) = config.progress_callback {
            cb.on_record_start(index, total);
        }

        let start = Instant::now();
        let name = filename::filename_from_pattern(&config.filename_pattern, &record, Some(index));
        let dest = output_dir.join(&name);

        match process_record(&mut worker, template, &record, index, &dest, config) {
            Ok(path) => {
                debug!("[worker {id}] record {index} → {}", path.display());
                if let Some(ref cb) = config.progress_callback {
                    cb.on_record_complete(index, total, &path);
                }
                push_result(
                    results,
                    RecordResult {
                        index,
                        filename: name,
                        path: Some(path),
                        duration_ms: start.elapsed().as_millis() as u64,
                        error: None,
                    },
                );
            }
            Err(RecordFailure::Skip(err)) => {
                warn!("[worker {id}] record {index} failed: {err}");
                if let Some(ref cb) = config.progress_callback {
                    cb.on_record_error(index, total, &err.to_string());
                }
                push_result(
                    results,
                    RecordResult {
                        index,
                        filename: name,
                        path: None,
                        duration_ms: start.elapsed().as_millis() as u64,
                        error: Some(err),
                    },
                );
            }
            Err(RecordFailure::Fatal(e)) => {
                // Hand the record back; another worker whose engine did
                // start may still process it.
                queue
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push_front((index, record));
                break Err(e);
            }
        }
    };

    launches.fetch_add(worker.launch_count(), Ordering::SeqCst);
    worker.teardown();
    outcome
}

/// Run one record through normalise → render → rasterise.
fn process_record(
    worker: &mut Worker,
    template: &Template,
    record: &Record,
    index: usize,
    dest: &Path,
    config: &GenerationConfig,
) -> Result<PathBuf, RecordFailure> {
    let html = render::render_document(template, record, config).map_err(|e| match e {
        fatal @ MergeError::SandboxViolation { .. } => RecordFailure::Fatal(fatal),
        other => RecordFailure::Skip(RecordError::RenderFailed {
            index,
            detail: other.to_string(),
        }),
    })?;

    worker.rasterize(&html, dest).map_err(|e| match e {
        fatal @ MergeError::EngineUnavailable { .. } => RecordFailure::Fatal(fatal),
        MergeError::RenderTimeout { secs, .. } => {
            RecordFailure::Skip(RecordError::Timeout { index, secs })
        }
        other => RecordFailure::Skip(RecordError::RasterizeFailed {
            index,
            detail: other.to_string(),
        }),
    })
}

fn push_result(results: &Mutex<Vec<RecordResult>>, result: RecordResult) {
    results
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(result);
}
