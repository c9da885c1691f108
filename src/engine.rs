//! Worker-owned rendering-engine sessions.
//!
//! ## Why explicit ownership?
//!
//! Engine startup costs seconds; documents cost milliseconds. A
//! [`Worker`] therefore owns exactly one [`EngineSession`] as a field,
//! launches it lazily on first use, and reuses it for every document it
//! processes. Ownership as a field — rather than ambient thread-local
//! state — makes session lifetime explicit: no two workers can ever
//! share a session, and teardown is tied to a value you can see.
//!
//! ## Teardown discipline
//!
//! Cleanup is best-effort and runs after the primary work is already
//! done, so failures are logged and never raised. Each release step is
//! guarded independently: a browsing context that refuses to close must
//! not prevent the engine process itself from being terminated.
//! [`Worker`] also tears down on `Drop`, so a panicking work loop still
//! releases its engine.

use crate::config::{GenerationConfig, DEFAULT_CHROME_ARGS};
use crate::error::MergeError;
use crate::pipeline::rasterize;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Keep pooled engine processes alive through gaps between documents;
/// the engine would otherwise retire an idle process mid-batch.
const IDLE_TIMEOUT_SECS: u64 = 300;

/// One isolated rendering-engine session: a headless browser process
/// plus its control connection, exclusively owned by a single worker.
pub struct EngineSession {
    browser: Browser,
}

impl EngineSession {
    /// Start the engine. Failure here is fatal — it means the runtime
    /// dependency is missing or broken, not that a document is bad.
    fn launch(config: &GenerationConfig) -> Result<Self, MergeError> {
        let mut arg_strings: Vec<String> =
            DEFAULT_CHROME_ARGS.iter().map(|s| s.to_string()).collect();
        arg_strings.extend(config.chrome_args.iter().cloned());
        let args: Vec<&OsStr> = arg_strings.iter().map(|s| OsStr::new(s.as_str())).collect();

        let options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false)
            .args(args)
            .path(config.chrome_binary.clone())
            .idle_browser_timeout(Duration::from_secs(IDLE_TIMEOUT_SECS))
            .build()
            .map_err(|e| MergeError::EngineUnavailable {
                detail: format!("invalid launch options: {e}"),
            })?;

        let browser = Browser::new(options).map_err(|e| MergeError::EngineUnavailable {
            detail: format!("{e:#}"),
        })?;

        Ok(Self { browser })
    }

    /// Open a fresh page in this session. One page per document; the
    /// rasteriser closes it when the document is done.
    pub(crate) fn new_page(&self) -> Result<Arc<Tab>, MergeError> {
        self.browser
            .new_tab()
            .map_err(|e| MergeError::RasterizeFailed {
                detail: format!("failed to open page: {e:#}"),
            })
    }

    /// Release the session: browsing contexts first, then the engine
    /// process and its controller. Each step is guarded; errors are
    /// logged, never raised.
    fn shutdown(self) {
        match self.browser.get_tabs().lock() {
            Ok(tabs) => {
                for tab in tabs.iter() {
                    if let Err(e) = tab.close(true) {
                        warn!("Session teardown: failed to close page: {e:#}");
                    }
                }
            }
            Err(_) => warn!("Session teardown: page registry poisoned, skipping page close"),
        }
        // Dropping the handle terminates the engine process and then the
        // controller transport.
        drop(self.browser);
    }
}

/// A pool participant: processes records one at a time, exclusively
/// owning the engine session it lazily launches on first use.
pub struct Worker {
    id: usize,
    config: GenerationConfig,
    session: Option<EngineSession>,
    launches: usize,
}

impl Worker {
    /// Create a worker. No engine starts until the first document asks
    /// for a session.
    pub fn new(id: usize, config: GenerationConfig) -> Self {
        Self {
            id,
            config,
            session: None,
            launches: 0,
        }
    }

    /// Acquire this worker's session, launching it on first use and
    /// reusing it afterwards.
    pub fn session(&mut self) -> Result<&EngineSession, MergeError> {
        if self.session.is_none() {
            info!("[worker {}] launching rendering-engine session", self.id);
            let session = EngineSession::launch(&self.config)?;
            self.launches += 1;
            self.session = Some(session);
        }
        self.session
            .as_ref()
            .ok_or_else(|| MergeError::Internal("session initialisation failed".into()))
    }

    /// Rasterise assembled markup to a PDF at `dest` using this
    /// worker's session.
    pub fn rasterize(&mut self, html: &str, dest: impl AsRef<Path>) -> Result<PathBuf, MergeError> {
        let dest = dest.as_ref().to_path_buf();
        let config = self.config.clone();
        let session = self.session()?;
        rasterize::print_pdf(session, html, &dest, &config)
    }

    /// How many engine sessions this worker has launched. Stays at 1
    /// across any number of documents when reuse works as intended.
    pub fn launch_count(&self) -> usize {
        self.launches
    }

    /// Tear the session down now. Safe to call repeatedly; a worker
    /// without a session is a no-op.
    pub fn teardown(&mut self) {
        if let Some(session) = self.session.take() {
            info!("[worker {}] tearing down rendering-engine session", self.id);
            session.shutdown();
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_worker_has_no_session() {
        let w = Worker::new(0, GenerationConfig::default());
        assert_eq!(w.launch_count(), 0);
    }

    #[test]
    fn teardown_without_session_is_noop() {
        let mut w = Worker::new(1, GenerationConfig::default());
        w.teardown();
        w.teardown();
        assert_eq!(w.launch_count(), 0);
    }

    #[test]
    fn drop_without_session_does_not_panic() {
        let w = Worker::new(2, GenerationConfig::default());
        drop(w);
    }
}
