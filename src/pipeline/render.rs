//! Template evaluation inside a data-substitution sandbox, plus final
//! document assembly.
//!
//! ## Two-layer sandbox
//!
//! The primary control is structural: templates are evaluated with a
//! one-off, registry-free engine, so cross-template directives have
//! nothing to resolve against and the expression language exposes no
//! reflection surface at all. The denylist scan below runs first as
//! defense-in-depth — it rejects templates that *attempt* an escape with
//! an error naming the offending construct, instead of letting them fail
//! later with a confusing resolution error.
//!
//! Auto-escaping is always on: record values are data, and data can
//! never inject active markup into the finished document.

use crate::config::GenerationConfig;
use crate::error::MergeError;
use crate::pipeline::normalize::normalize_record;
use crate::stylesheet::{document_shell, header_block, signature_block};
use crate::template::{Record, Template};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::error::Error as _;
use tera::{Context, Tera};
use tracing::debug;

/// Forbidden template constructs, each paired with the human-readable
/// name surfaced in [`MergeError::SandboxViolation`].
static FORBIDDEN: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    vec![
        (
            "cross-template include directive",
            Regex::new(r"\{%-?\s*include\b").unwrap(),
        ),
        (
            "cross-template import directive",
            Regex::new(r"\{%-?\s*import\b").unwrap(),
        ),
        (
            "template inheritance directive (extends)",
            Regex::new(r"\{%-?\s*extends\b").unwrap(),
        ),
        (
            "cross-template from-import directive",
            Regex::new(r"\{%-?\s*from\b").unwrap(),
        ),
        (
            "reflection-style attribute access",
            Regex::new(r"__[A-Za-z][A-Za-z0-9_]*__").unwrap(),
        ),
        (
            "interpreter-internals access",
            Regex::new(r"\.\s*(?:mro|subclasses|globals|builtins)\b").unwrap(),
        ),
    ]
});

static RE_EDITOR_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"style="color:\s*rgb\([^)]+\);?""#).unwrap());
static RE_EMPTY_STYLE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"\s*style=""\s*"#).unwrap());

/// Scan raw template text for constructs that could escape the
/// data-substitution context. Fails with the first offending pattern;
/// no partial output is ever produced from a rejected template.
pub fn scan_template(content: &str) -> Result<(), MergeError> {
    for (name, re) in FORBIDDEN.iter() {
        if re.is_match(content) {
            return Err(MergeError::SandboxViolation {
                pattern: (*name).to_string(),
            });
        }
    }
    Ok(())
}

/// Evaluate template content against a normalised record.
///
/// The record's fields become the template variables; markup-unsafe
/// characters in values are escaped automatically.
fn evaluate(content: &str, record: &Record) -> Result<String, MergeError> {
    let context = Context::from_value(Value::Object(record.clone())).map_err(|e| {
        MergeError::TemplateRender {
            detail: e.to_string(),
        }
    })?;

    Tera::one_off(content, &context, true).map_err(|e| {
        // Tera wraps the root cause; chase it for an actionable message.
        let detail = e
            .source()
            .map(|s| format!("{e}: {s}"))
            .unwrap_or_else(|| e.to_string());
        MergeError::TemplateRender { detail }
    })
}

/// Strip inline artefacts left by the upstream rich-text editor: color
/// styling baked into spans and empty style attributes.
fn clean_editor_artifacts(html: &str) -> String {
    let html = RE_EDITOR_COLOR.replace_all(html, "");
    RE_EMPTY_STYLE.replace_all(&html, " ").to_string()
}

/// Render one record's body: sandbox scan, timestamp normalisation,
/// template evaluation, artefact cleanup.
pub fn render_body(
    content: &str,
    record: &Record,
    date_format: &str,
) -> Result<String, MergeError> {
    scan_template(content)?;
    let normalized = normalize_record(record, date_format);
    let rendered = evaluate(content, &normalized)?;
    Ok(clean_editor_artifacts(&rendered))
}

/// Render the complete document markup for one record: header block,
/// rendered body, signature block, wrapped in the document shell with
/// embedded fonts and stylesheets.
pub fn render_document(
    template: &Template,
    record: &Record,
    config: &GenerationConfig,
) -> Result<String, MergeError> {
    let body = render_body(&template.content, record, &config.date_format)?;

    let header = header_block(template.logo.as_deref(), template.service_name.as_deref());
    let signature = signature_block(template.signature.as_deref());

    let font_stack = match config.fonts.primary_family() {
        Some(family) => format!("'{family}', 'Arial', 'Helvetica', sans-serif"),
        None => "'Arial', 'Helvetica', sans-serif".to_string(),
    };

    let html = document_shell(
        config.fonts.css(),
        &font_stack,
        &template.css,
        &header,
        &body,
        &signature,
    );
    debug!("Assembled document: {} bytes", html.len());
    Ok(html)
}
