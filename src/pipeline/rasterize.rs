//! PDF rasterisation: assembled markup → one PDF file via a worker's
//! engine session.
//!
//! ## Why a `data:` URL?
//!
//! The engine needs a navigable origin for the document, and serving it
//! over loopback would drag in a whole HTTP layer. A base64 `data:` URL
//! carries the complete self-contained document (fonts and images are
//! already inlined) in a single navigation with nothing to fetch.
//!
//! ## Readiness sequence
//!
//! Navigation resolves at structural-DOM readiness, which is too early
//! for web fonts: printing at that moment captures fallback glyphs. So
//! the rasteriser waits for the font registry to settle, then applies a
//! short fixed delay for asynchronous layout (font swap) to stabilise
//! before issuing the print command.

use crate::config::GenerationConfig;
use crate::engine::EngineSession;
use crate::error::MergeError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::Tab;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// A4 paper, in inches, as the print command expects.
const A4_WIDTH_IN: f64 = 8.27;
const A4_HEIGHT_IN: f64 = 11.69;

/// Closes the page when dropped, so the session releases it on success,
/// failure, and panic alike.
struct PageGuard(Arc<Tab>);

impl Drop for PageGuard {
    fn drop(&mut self) {
        if let Err(e) = self.0.close(true) {
            tracing::warn!("Failed to close page after rasterisation: {e:#}");
        }
    }
}

/// Rasterise one assembled document to a single PDF at `dest`.
///
/// Postcondition: on `Ok`, the destination file exists and is
/// non-empty; absence after an apparently successful print is reported
/// as [`MergeError::OutputMissing`].
pub fn print_pdf(
    session: &EngineSession,
    html: &str,
    dest: &Path,
    config: &GenerationConfig,
) -> Result<PathBuf, MergeError> {
    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| MergeError::OutputWriteFailed {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }

    let page = session.new_page()?;
    let _guard = PageGuard(Arc::clone(&page));

    page.set_default_timeout(Duration::from_secs(config.load_timeout_secs));

    let payload = format!("data:text/html;base64,{}", STANDARD.encode(html));
    page.navigate_to(&payload)
        .map_err(|e| MergeError::RasterizeFailed {
            detail: format!("{e:#}"),
        })?;
    page.wait_until_navigated()
        .map_err(|e| MergeError::RenderTimeout {
            secs: config.load_timeout_secs,
            detail: format!("{e:#}"),
        })?;

    page.evaluate("document.fonts.ready.then(() => true)", true)
        .map_err(|e| MergeError::RasterizeFailed {
            detail: format!("font readiness wait failed: {e:#}"),
        })?;
    std::thread::sleep(Duration::from_millis(config.settle_delay_ms));

    let pdf = page
        .print_to_pdf(Some(a4_options()))
        .map_err(|e| MergeError::RasterizeFailed {
            detail: format!("{e:#}"),
        })?;

    fs::write(dest, &pdf).map_err(|e| MergeError::OutputWriteFailed {
        path: dest.to_path_buf(),
        source: e,
    })?;

    match fs::metadata(dest) {
        Ok(meta) if meta.len() > 0 => {
            debug!("Wrote {} ({} bytes)", dest.display(), meta.len());
            Ok(dest.to_path_buf())
        }
        _ => Err(MergeError::OutputMissing {
            path: dest.to_path_buf(),
        }),
    }
}

/// A4 portrait, zero margins, background graphics on.
fn a4_options() -> PrintToPdfOptions {
    PrintToPdfOptions {
        print_background: Some(true),
        paper_width: Some(A4_WIDTH_IN),
        paper_height: Some(A4_HEIGHT_IN),
        margin_top: Some(0.0),
        margin_bottom: Some(0.0),
        margin_left: Some(0.0),
        margin_right: Some(0.0),
        ..Default::default()
    }
}
