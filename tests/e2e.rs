//! End-to-end integration tests for merge2pdf.
//!
//! These tests launch a real headless Chrome/Chromium binary and print
//! real PDFs. They are gated behind the `E2E_ENABLED` environment
//! variable so they do not run in CI unless explicitly requested.
//!
//! Run with:
//!   E2E_ENABLED=1 cargo test --test e2e -- --nocapture
//!
//! To restrict to a specific test:
//!   E2E_ENABLED=1 cargo test --test e2e session_is_reused -- --nocapture

use merge2pdf::{
    generate_batch, render_document, GenerationConfig, Record, Template, Worker,
};
use serde_json::json;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Skip this test unless E2E_ENABLED is set.
macro_rules! e2e_skip_unless_ready {
    () => {
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
    };
}

fn record(pairs: &[(&str, serde_json::Value)]) -> Record {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

/// Assert the file at `path` is a non-empty PDF.
fn assert_is_pdf(path: &std::path::Path, context: &str) {
    let bytes = std::fs::read(path)
        .unwrap_or_else(|e| panic!("[{context}] failed to read {}: {e}", path.display()));
    assert!(!bytes.is_empty(), "[{context}] PDF is empty");
    assert_eq!(&bytes[..4], b"%PDF", "[{context}] missing PDF magic bytes");
    println!("[{context}] ✓  {} bytes at {}", bytes.len(), path.display());
}

// ── Session lifecycle ────────────────────────────────────────────────────────

#[test]
fn session_is_reused_across_documents() {
    e2e_skip_unless_ready!();
    let dir = tempfile::tempdir().unwrap();
    let config = GenerationConfig::default();

    let template = Template::new("<p>Hello {{ name }}</p>");
    let html_a = render_document(&template, &record(&[("name", json!("one"))]), &config).unwrap();
    let html_b = render_document(&template, &record(&[("name", json!("two"))]), &config).unwrap();

    let mut worker = Worker::new(0, config);
    assert_eq!(worker.launch_count(), 0, "no lazy launch before first use");

    let a = worker.rasterize(&html_a, dir.path().join("a.pdf")).unwrap();
    let b = worker.rasterize(&html_b, dir.path().join("b.pdf")).unwrap();

    // One engine startup amortised across both documents.
    assert_eq!(worker.launch_count(), 1);
    assert_is_pdf(&a, "reuse/a");
    assert_is_pdf(&b, "reuse/b");

    worker.teardown();
    assert_eq!(worker.launch_count(), 1, "teardown does not relaunch");
}

#[test]
fn rasterize_writes_nonempty_a4_pdf() {
    e2e_skip_unless_ready!();
    let dir = tempfile::tempdir().unwrap();
    let config = GenerationConfig::default();

    let mut template = Template::new("<h1>Title</h1><p>Body with {{ date }}</p>");
    template.service_name = Some("Office of Examples\nRoom 12".into());
    let html =
        render_document(&template, &record(&[("date", json!(1_700_000_000))]), &config).unwrap();

    let mut worker = Worker::new(0, config);
    let path = worker
        .rasterize(&html, dir.path().join("nested/dir/out.pdf"))
        .unwrap();
    assert_is_pdf(&path, "a4");
}

// ── Batch behaviour ──────────────────────────────────────────────────────────

#[tokio::test]
async fn batch_isolates_one_bad_record() {
    e2e_skip_unless_ready!();
    let dir = tempfile::tempdir().unwrap();
    let template = Template::new("<p>Dear {{ name }}</p>");

    // Record 3 is missing `name`; its template evaluation throws and the
    // batch continues.
    let records: Vec<Record> = vec![
        record(&[("name", json!("Ada"))]),
        record(&[("name", json!("Blaise"))]),
        record(&[("wrong_field", json!("Carl"))]),
        record(&[("name", json!("Dana"))]),
        record(&[("name", json!("Emmy"))]),
    ];

    let config = GenerationConfig::builder()
        .concurrency(1)
        .filename_pattern("letter_{index}")
        .build()
        .unwrap();

    let output = generate_batch(&template, records, dir.path(), &config)
        .await
        .unwrap();

    assert_eq!(output.files.len(), 4);
    assert_eq!(output.stats.generated, 4);
    assert_eq!(output.stats.failed, 1);
    // One worker, one session, reused across all records, torn down once.
    assert_eq!(output.stats.engine_launches, 1);

    assert!(output.records[2].error.is_some(), "record 3 should fail");
    for result in output.records.iter().filter(|r| r.error.is_none()) {
        assert_is_pdf(result.path.as_deref().unwrap(), "batch");
    }
}

#[tokio::test]
async fn concurrent_batch_launches_at_most_one_session_per_worker() {
    e2e_skip_unless_ready!();
    let dir = tempfile::tempdir().unwrap();
    let template = Template::new("<p>{{ n }}</p>");
    let records: Vec<Record> = (0..6).map(|i| record(&[("n", json!(i))])).collect();

    let config = GenerationConfig::builder()
        .concurrency(2)
        .filename_pattern("doc_{n}")
        .build()
        .unwrap();

    let output = generate_batch(&template, records, dir.path(), &config)
        .await
        .unwrap();

    assert_eq!(output.stats.generated, 6);
    assert!(
        output.stats.engine_launches <= 2,
        "6 documents across 2 workers must not launch more than 2 sessions, got {}",
        output.stats.engine_launches
    );
}

#[test]
fn missing_engine_binary_is_fatal() {
    e2e_skip_unless_ready!();
    let config = GenerationConfig::builder()
        .chrome_binary("/definitely/not/a/browser")
        .build()
        .unwrap();

    let mut worker = Worker::new(0, config);
    let err = worker
        .rasterize("<html><body>x</body></html>", "/tmp/never.pdf")
        .unwrap_err();
    assert!(
        matches!(err, merge2pdf::MergeError::EngineUnavailable { .. }),
        "got: {err:?}"
    );
    assert_eq!(worker.launch_count(), 0, "failed launch must not count");
}
