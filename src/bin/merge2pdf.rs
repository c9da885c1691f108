//! CLI binary for merge2pdf.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `GenerationConfig`, loads the template and records from JSON files,
//! and prints results.

use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use merge2pdf::{
    generate_batch, BatchProgressCallback, FontAsset, FontCatalog, GenerationConfig,
    ProgressCallback, Record, Template,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one live bar plus a log line per record.
/// Works correctly when records complete out-of-order (concurrent mode).
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} records  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");
        bar.set_style(style);
        bar.set_prefix("Generating");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_records: usize) {
        self.bar.set_length(total_records as u64);
    }

    fn on_record_complete(&self, index: usize, total: usize, path: &Path) {
        self.bar.println(format!(
            "  {} Record {:>3}/{:<3}  {}",
            green("✓"),
            index,
            total,
            dim(&path.display().to_string()),
        ));
        self.bar.inc(1);
    }

    fn on_record_error(&self, index: usize, total: usize, error: &str) {
        self.bar.println(format!(
            "  {} Record {:>3}/{:<3}  {}",
            red("✗"),
            index,
            total,
            red(error),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, _total: usize, _generated: usize) {
        self.bar.finish_and_clear();
    }
}

// ── CLI definition ───────────────────────────────────────────────────────────

/// Render a document template against a list of records and produce one
/// PDF per record.
#[derive(Parser, Debug)]
#[command(name = "merge2pdf", version, about)]
struct Cli {
    /// Template JSON file (content, css, logo, signature, service_name)
    #[arg(short, long, value_name = "FILE")]
    template: PathBuf,

    /// Records JSON file: an array of flat field→value objects
    #[arg(short, long, value_name = "FILE")]
    records: PathBuf,

    /// Output directory for the generated PDFs
    #[arg(short, long, value_name = "DIR", default_value = "./out")]
    out: PathBuf,

    /// Filename pattern with {field} and {index} placeholders
    #[arg(short, long, value_name = "PATTERN", default_value = "document_{index}")]
    pattern: String,

    /// Number of parallel workers (one engine session each)
    #[arg(short = 'j', long, default_value_t = 2)]
    concurrency: usize,

    /// Per-document content-load timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Directory of font files (woff2/woff/ttf/otf) to embed
    #[arg(long, value_name = "DIR")]
    fonts: Option<PathBuf>,

    /// Explicit Chrome/Chromium binary
    #[arg(long, value_name = "PATH", env = "CHROME_PATH")]
    chrome: Option<PathBuf>,

    /// Suppress the progress bar
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let template: Template = {
        let raw = std::fs::read_to_string(&cli.template)
            .with_context(|| format!("reading template file {}", cli.template.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("parsing template file {}", cli.template.display()))?
    };

    let records: Vec<Record> = {
        let raw = std::fs::read_to_string(&cli.records)
            .with_context(|| format!("reading records file {}", cli.records.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("parsing records file {}", cli.records.display()))?
    };
    if records.is_empty() {
        bail!("records file {} contains no records", cli.records.display());
    }

    let fonts = match &cli.fonts {
        Some(dir) => load_fonts(dir)?,
        None => FontCatalog::empty(),
    };

    let mut builder = GenerationConfig::builder()
        .concurrency(cli.concurrency)
        .load_timeout_secs(cli.timeout)
        .filename_pattern(cli.pattern.as_str())
        .fonts(fonts);
    if let Some(chrome) = &cli.chrome {
        builder = builder.chrome_binary(chrome.clone());
    }
    if !cli.quiet {
        builder = builder.progress_callback(CliProgressCallback::new() as ProgressCallback);
    }
    let config = builder.build()?;

    let total = records.len();
    eprintln!(
        "{}",
        bold(&format!(
            "Generating {total} documents → {}",
            cli.out.display()
        ))
    );

    let output = generate_batch(&template, records, &cli.out, &config).await?;

    eprintln!(
        "{} {}/{} documents generated in {:.1}s ({} engine launch{})",
        if output.stats.failed == 0 {
            green("✓")
        } else {
            red("!")
        },
        output.stats.generated,
        output.stats.total_records,
        output.stats.total_duration_ms as f64 / 1000.0,
        output.stats.engine_launches,
        if output.stats.engine_launches == 1 { "" } else { "es" },
    );

    for record in output.records.iter().filter(|r| r.error.is_some()) {
        if let Some(ref err) = record.error {
            eprintln!("  {} {}", red("✗"), err);
        }
    }

    if output.is_total_failure() {
        bail!("no documents were generated");
    }
    Ok(())
}

/// Load every font file in `dir` into a catalog. Family comes from the
/// file-name stem before the first '-'; "bold" and "italic" in the stem
/// select weight and style, e.g. `Marianne-Bold.woff2`.
fn load_fonts(dir: &Path) -> Result<FontCatalog> {
    let mut assets = Vec::new();
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("reading font dir {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        let mime = match ext.to_ascii_lowercase().as_str() {
            "woff2" => "font/woff2",
            "woff" => "font/woff",
            "otf" => "font/otf",
            "ttf" => "font/ttf",
            _ => continue,
        };
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("font")
            .to_string();
        let family = stem.split('-').next().unwrap_or(&stem).to_string();
        let lower = stem.to_ascii_lowercase();
        let data = std::fs::read(&path)
            .with_context(|| format!("reading font file {}", path.display()))?;

        let mut asset = FontAsset::new(family, if lower.contains("bold") { 700 } else { 400 }, mime, data);
        asset.italic = lower.contains("italic");
        assets.push(asset);
    }
    if assets.is_empty() {
        bail!("no font files found in {}", dir.display());
    }
    Ok(FontCatalog::build(&assets))
}
