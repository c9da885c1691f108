//! Integration tests for the engine-free pipeline stages.
//!
//! Everything here runs without a Chrome binary: filename derivation,
//! timestamp normalisation, sandboxed rendering, and the batch paths
//! that fail before any engine session is launched. Engine-dependent
//! behaviour (session reuse, real PDF output) lives in `tests/e2e.rs`.

use merge2pdf::{
    filename_from_pattern, generate_batch_sync, normalize_record, render_document,
    BatchProgressCallback, GenerationConfig, MergeError, ProgressCallback, Record, Template,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn record(pairs: &[(&str, serde_json::Value)]) -> Record {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

// ── Filename pattern engine ──────────────────────────────────────────────────

#[test]
fn filename_scenario_invoice() {
    let r = record(&[("client", json!("Acme"))]);
    assert_eq!(
        filename_from_pattern("invoice_{client}_{index}", &r, Some(3)),
        "invoice_Acme_3.pdf"
    );
}

#[test]
fn filename_empty_pattern_defaults() {
    let r = record(&[("client", json!("Acme"))]);
    assert_eq!(filename_from_pattern("", &r, None), "document.pdf");
}

#[test]
fn filename_is_deterministic_and_safe() {
    let r = record(&[("who", json!("A/B\\C:D*E?F\"G<H>I|J\tK"))]);
    let first = filename_from_pattern("out {who}", &r, Some(1));
    let second = filename_from_pattern("out {who}", &r, Some(1));
    assert_eq!(first, second);
    assert!(first.ends_with(".pdf"));
    for ch in ['<', '>', ':', '"', '/', '\\', '|', '?', '*'] {
        assert!(!first.contains(ch), "{first:?} contains {ch:?}");
    }
    assert!(first.chars().all(|c| !c.is_control()));
}

// ── Timestamp normalisation ──────────────────────────────────────────────────

#[test]
fn seconds_and_millis_epochs_agree() {
    let r = record(&[
        ("secs", json!(1_700_000_000)),
        ("millis", json!(1_700_000_000_000i64)),
    ]);
    let n = normalize_record(&r, "%d/%m/%Y");
    assert!(n["secs"].is_string());
    assert_eq!(n["secs"], n["millis"]);
}

#[test]
fn normalisation_is_idempotent() {
    let r = record(&[
        ("date", json!(1_700_000_000)),
        ("amount", json!(1234.5)),
        ("vip", json!(true)),
    ]);
    let once = normalize_record(&r, "%d/%m/%Y");
    let twice = normalize_record(&once, "%d/%m/%Y");
    assert_eq!(once, twice);
    assert_eq!(twice["amount"], json!(1234.5));
    assert_eq!(twice["vip"], json!(true));
}

// ── Template sandbox renderer ────────────────────────────────────────────────

#[test]
fn forbidden_directive_fails_with_sandbox_violation() {
    let template = Template::new(r#"{% include "c/passwd" %}"#);
    let r = record(&[]);
    let err = render_document(&template, &r, &GenerationConfig::default()).unwrap_err();
    assert!(matches!(err, MergeError::SandboxViolation { .. }), "got: {err:?}");
}

#[test]
fn record_values_cannot_inject_markup() {
    let template = Template::new("<p>{{ payload }}</p>");
    let r = record(&[("payload", json!("<img src=x onerror=alert(1)>"))]);
    let html = render_document(&template, &r, &GenerationConfig::default()).unwrap();
    assert!(!html.contains("<img src=x"), "unescaped payload in output");
}

#[test]
fn placeholderless_template_renders_identically_for_all_records() {
    let template = Template::new("<p>Same text for everyone.</p>");
    let config = GenerationConfig::default();
    let a = render_document(&template, &record(&[("x", json!(1))]), &config).unwrap();
    let b = render_document(&template, &record(&[("y", json!("z"))]), &config).unwrap();
    assert_eq!(a, b);
    assert!(a.contains("<p>Same text for everyone.</p>"));
}

// ── Batch orchestration (paths that never reach the engine) ──────────────────

struct CountingCallback {
    started: AtomicUsize,
    errored: AtomicUsize,
    batch_completes: AtomicUsize,
}

impl BatchProgressCallback for CountingCallback {
    fn on_record_start(&self, _index: usize, _total: usize) {
        self.started.fetch_add(1, Ordering::SeqCst);
    }
    fn on_record_error(&self, _index: usize, _total: usize, _error: &str) {
        self.errored.fetch_add(1, Ordering::SeqCst);
    }
    fn on_batch_complete(&self, _total: usize, _generated: usize) {
        self.batch_completes.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn batch_rejects_forbidden_template_before_engine_start() {
    let dir = tempfile::tempdir().unwrap();
    let template = Template::new(r#"{% extends "base" %}"#);
    let records = vec![record(&[("a", json!(1))])];

    let err = generate_batch_sync(&template, records, dir.path(), &GenerationConfig::default())
        .unwrap_err();
    assert!(matches!(err, MergeError::SandboxViolation { .. }));
}

#[test]
fn batch_isolates_render_failures_without_launching_engine() {
    let dir = tempfile::tempdir().unwrap();
    // Every record is missing `name`, so evaluation fails before any
    // rasterisation is attempted — no engine session ever launches.
    let template = Template::new("<p>{{ name }}</p>");
    let records: Vec<Record> = (0..5).map(|i| record(&[("other", json!(i))])).collect();

    let callback = Arc::new(CountingCallback {
        started: AtomicUsize::new(0),
        errored: AtomicUsize::new(0),
        batch_completes: AtomicUsize::new(0),
    });
    let config = GenerationConfig::builder()
        .concurrency(2)
        .progress_callback(Arc::clone(&callback) as ProgressCallback)
        .build()
        .unwrap();

    let output = generate_batch_sync(&template, records, dir.path(), &config).unwrap();

    assert!(output.files.is_empty());
    assert!(output.is_total_failure());
    assert_eq!(output.stats.total_records, 5);
    assert_eq!(output.stats.failed, 5);
    assert_eq!(output.stats.engine_launches, 0);
    assert_eq!(output.records.len(), 5);
    // Results come back in record order regardless of worker interleaving.
    let indices: Vec<usize> = output.records.iter().map(|r| r.index).collect();
    assert_eq!(indices, vec![1, 2, 3, 4, 5]);
    assert!(output.records.iter().all(|r| r.error.is_some()));

    assert_eq!(callback.started.load(Ordering::SeqCst), 5);
    assert_eq!(callback.errored.load(Ordering::SeqCst), 5);
    assert_eq!(callback.batch_completes.load(Ordering::SeqCst), 1);
}

#[test]
fn empty_batch_is_ok_and_not_total_failure() {
    let dir = tempfile::tempdir().unwrap();
    let template = Template::new("<p>{{ name }}</p>");
    let output =
        generate_batch_sync(&template, Vec::new(), dir.path(), &GenerationConfig::default())
            .unwrap();
    assert!(output.files.is_empty());
    assert!(!output.is_total_failure());
    assert_eq!(output.stats.engine_launches, 0);
}

#[test]
fn batch_derives_filenames_from_record_fields() {
    let dir = tempfile::tempdir().unwrap();
    let template = Template::new("<p>{{ missing }}</p>");
    let records = vec![record(&[("client", json!("Acme"))])];
    let config = GenerationConfig::builder()
        .filename_pattern("invoice_{client}_{index}")
        .build()
        .unwrap();

    // Render fails (missing variable), but the derived name is still
    // reported in the per-record result.
    let output = generate_batch_sync(&template, records, dir.path(), &config).unwrap();
    assert_eq!(output.records[0].filename, "invoice_Acme_1.pdf");
    assert!(output.records[0].path.is_none());
}
