//! Pipeline stages for record-to-PDF generation.
//!
//! Each submodule implements exactly one transformation step. Keeping
//! stages separate makes each independently testable and lets us swap
//! implementations (e.g. switch the rendering engine) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! normalize ──▶ render ──▶ rasterize        filename
//! (epoch→date)  (sandboxed  (engine          (pattern →
//!               substitution) print-to-PDF)   output name)
//! ```
//!
//! 1. [`normalize`]  — convert plausible epoch-timestamp fields to
//!    localised date strings; produces a derived record
//! 2. [`render`]     — scan for sandbox escapes, evaluate the template
//!    with auto-escaping, assemble the full document markup
//! 3. [`rasterize`]  — drive one worker's engine session to print the
//!    markup as a single A4 PDF; runs on blocking worker threads because
//!    the engine protocol is synchronous
//! 4. [`filename`]   — expand the naming pattern into a safe, stable
//!    file name; independent of the other stages

pub mod filename;
pub mod normalize;
pub mod rasterize;
pub mod render;
