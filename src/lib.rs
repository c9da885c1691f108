//! # merge2pdf
//!
//! Mail-merge document generation: render a user-authored template
//! against one or many structured records and produce one finished PDF
//! per record.
//!
//! ## Why this crate?
//!
//! Mass document generation has a deceptive shape: the substitution is
//! trivial, and everything around it is not. Templates come from
//! untrusted users and must not escape the data-substitution context;
//! tabular data sources deliver dates as bare epoch numbers; output
//! names must be derived from record fields without producing illegal
//! or colliding paths; and the headless rendering engine that turns
//! HTML into print-faithful PDF costs seconds to start, so its sessions
//! must be pooled, reused, and reliably torn down. This crate owns that
//! whole pipeline.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Records
//!  │
//!  ├─ 1. Normalize  epoch-timestamp fields → localised date strings
//!  ├─ 2. Render     sandboxed template evaluation, auto-escaped,
//!  │                assembled with header / signature / embedded fonts
//!  ├─ 3. Rasterize  one worker-owned Chrome session prints A4 PDFs
//!  ├─ 4. Name       {field}/{index} pattern → safe output file name
//!  └─ 5. Collect    per-record failure isolation + guaranteed teardown
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use merge2pdf::{generate_batch, GenerationConfig, Record, Template};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let template = Template::new("<p>Dear {{ name }}, see you on {{ date }}.</p>");
//!     let records: Vec<Record> = serde_json::from_str(
//!         r#"[{"name": "Ada", "date": 1700000000}, {"name": "Blaise", "date": 1700086400}]"#,
//!     )?;
//!
//!     let config = GenerationConfig::builder()
//!         .filename_pattern("letter_{name}_{index}")
//!         .build()?;
//!
//!     let output = generate_batch(&template, records, "./out", &config).await?;
//!     for path in &output.files {
//!         println!("{}", path.display());
//!     }
//!     eprintln!("{}/{} documents generated", output.stats.generated, output.stats.total_records);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `merge2pdf` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library to avoid pulling in
//! CLI-only deps:
//! ```toml
//! merge2pdf = { version = "0.3", default-features = false }
//! ```
//!
//! ## Runtime requirement
//!
//! Rasterisation drives a headless Chrome or Chromium binary. If none
//! is discoverable, point [`GenerationConfig`] at one with
//! `chrome_binary`. Rendering markup with [`render_document`] needs no
//! browser at all.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod config;
pub mod engine;
pub mod error;
pub mod fonts;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod stylesheet;
pub mod template;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::{generate_batch, generate_batch_sync};
pub use config::{GenerationConfig, GenerationConfigBuilder};
pub use engine::Worker;
pub use error::{MergeError, RecordError};
pub use fonts::{FontAsset, FontCatalog};
pub use output::{BatchOutput, BatchStats, RecordResult};
pub use pipeline::filename::filename_from_pattern;
pub use pipeline::normalize::normalize_record;
pub use pipeline::render::render_document;
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
pub use template::{Record, Template};
