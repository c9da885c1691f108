//! Configuration for document generation.
//!
//! All generation behaviour is controlled through [`GenerationConfig`],
//! built via its [`GenerationConfigBuilder`]. Keeping every knob in one
//! struct makes it trivial to share configs across workers and to diff
//! two runs to understand why their outputs differ.

use crate::error::MergeError;
use crate::fonts::FontCatalog;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Default Chrome launch arguments, matching what container deployments
/// need to run the engine headless without special privileges.
pub const DEFAULT_CHROME_ARGS: &[&str] = &["--disable-dev-shm-usage", "--disable-gpu"];

/// Configuration for a generation run.
///
/// Built via [`GenerationConfig::builder()`] or
/// [`GenerationConfig::default()`].
///
/// # Example
/// ```rust
/// use merge2pdf::GenerationConfig;
///
/// let config = GenerationConfig::builder()
///     .concurrency(4)
///     .filename_pattern("invoice_{client}_{index}")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct GenerationConfig {
    /// Number of parallel workers, each owning one engine session.
    /// Default: 2.
    ///
    /// Each worker keeps a headless browser process alive for the whole
    /// batch, so the useful ceiling is memory-bound, not CPU-bound.
    pub concurrency: usize,

    /// Seconds to wait for a document's structural DOM to become ready
    /// before failing the render as a timeout. Default: 30.
    pub load_timeout_secs: u64,

    /// Fixed delay after fonts report ready, letting asynchronous layout
    /// (web-font swap) stabilise before printing. Default: 500 ms.
    pub settle_delay_ms: u64,

    /// strftime-style format for normalised timestamp fields.
    /// Default: `"%d/%m/%Y"`.
    pub date_format: String,

    /// Output naming pattern with `{field}` and `{index}` placeholders.
    /// Default: `"document_{index}"`.
    pub filename_pattern: String,

    /// Explicit Chrome/Chromium binary. `None` lets the engine discover
    /// one on the usual paths.
    pub chrome_binary: Option<PathBuf>,

    /// Extra engine launch arguments, appended to
    /// [`DEFAULT_CHROME_ARGS`].
    pub chrome_args: Vec<String>,

    /// Embedded fonts, built once and shared read-only by all workers.
    pub fonts: Arc<FontCatalog>,

    /// Optional per-record progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            concurrency: 2,
            load_timeout_secs: 30,
            settle_delay_ms: 500,
            date_format: "%d/%m/%Y".to_string(),
            filename_pattern: "document_{index}".to_string(),
            chrome_binary: None,
            chrome_args: Vec::new(),
            fonts: Arc::new(FontCatalog::empty()),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("concurrency", &self.concurrency)
            .field("load_timeout_secs", &self.load_timeout_secs)
            .field("settle_delay_ms", &self.settle_delay_ms)
            .field("date_format", &self.date_format)
            .field("filename_pattern", &self.filename_pattern)
            .field("chrome_binary", &self.chrome_binary)
            .field("chrome_args", &self.chrome_args)
            .field("fonts", &if self.fonts.is_empty() { "<empty>" } else { "<catalog>" })
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn BatchProgressCallback>"),
            )
            .finish()
    }
}

impl GenerationConfig {
    /// Create a new builder for `GenerationConfig`.
    pub fn builder() -> GenerationConfigBuilder {
        GenerationConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`GenerationConfig`].
#[derive(Debug)]
pub struct GenerationConfigBuilder {
    config: GenerationConfig,
}

impl GenerationConfigBuilder {
    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn load_timeout_secs(mut self, secs: u64) -> Self {
        self.config.load_timeout_secs = secs.max(1);
        self
    }

    pub fn settle_delay_ms(mut self, ms: u64) -> Self {
        self.config.settle_delay_ms = ms;
        self
    }

    pub fn date_format(mut self, fmt: impl Into<String>) -> Self {
        self.config.date_format = fmt.into();
        self
    }

    pub fn filename_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.filename_pattern = pattern.into();
        self
    }

    pub fn chrome_binary(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.chrome_binary = Some(path.into());
        self
    }

    pub fn chrome_arg(mut self, arg: impl Into<String>) -> Self {
        self.config.chrome_args.push(arg.into());
        self
    }

    pub fn fonts(mut self, catalog: FontCatalog) -> Self {
        self.config.fonts = Arc::new(catalog);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<GenerationConfig, MergeError> {
        let c = &self.config;
        if c.concurrency == 0 {
            return Err(MergeError::InvalidConfig("concurrency must be ≥ 1".into()));
        }
        if c.settle_delay_ms > 10_000 {
            return Err(MergeError::InvalidConfig(format!(
                "settle delay must be ≤ 10000 ms, got {}",
                c.settle_delay_ms
            )));
        }
        if c.date_format.is_empty() {
            return Err(MergeError::InvalidConfig("date format must not be empty".into()));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_contract() {
        let c = GenerationConfig::default();
        assert_eq!(c.concurrency, 2);
        assert_eq!(c.load_timeout_secs, 30);
        assert_eq!(c.settle_delay_ms, 500);
        assert_eq!(c.date_format, "%d/%m/%Y");
        assert_eq!(c.filename_pattern, "document_{index}");
    }

    #[test]
    fn concurrency_clamps_to_one() {
        let c = GenerationConfig::builder().concurrency(0).build().unwrap();
        assert_eq!(c.concurrency, 1);
    }

    #[test]
    fn excessive_settle_delay_rejected() {
        let result = GenerationConfig::builder().settle_delay_ms(60_000).build();
        assert!(matches!(result, Err(MergeError::InvalidConfig(_))));
    }

    #[test]
    fn empty_date_format_rejected() {
        let result = GenerationConfig::builder().date_format("").build();
        assert!(result.is_err());
    }

    #[test]
    fn debug_hides_callback() {
        let c = GenerationConfig::default();
        let s = format!("{c:?}");
        assert!(s.contains("filename_pattern"));
        assert!(!s.contains("dyn BatchProgressCallback") || s.contains("None"));
    }
}
