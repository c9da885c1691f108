//! Filename pattern expansion: `{field}` placeholders → a safe, stable
//! file name.
//!
//! The function is pure and deterministic: identical pattern + record +
//! index always produce byte-identical names. Collisions are therefore
//! not an error — callers wanting per-record uniqueness include a unique
//! field or `{index}` in the pattern.

use crate::pipeline::normalize::stringify;
use crate::stylesheet::DOCUMENT_EXT;
use crate::template::Record;
use once_cell::sync::Lazy;
use regex::Regex;

/// Name used when the pattern is empty or whitespace-only.
const DEFAULT_STEM: &str = "document";

/// Placeholder substituted for empty or null field values.
const EMPTY_VALUE: &str = "empty";

/// Maximum file name length, extension included.
const MAX_LEN: usize = 200;

static RE_ILLEGAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[<>:"/\\|?*\x00-\x1f]"#).unwrap());
static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static RE_UNDERSCORES: Lazy<Regex> = Lazy::new(|| Regex::new(r"_+").unwrap());

/// Expand a naming pattern against a record into a safe file name ending
/// in the document extension.
///
/// `index` is the record's 1-based batch position, substituted for the
/// `{index}` placeholder when supplied.
pub fn filename_from_pattern(pattern: &str, record: &Record, index: Option<usize>) -> String {
    let trimmed = pattern.trim();
    let mut name = if trimmed.is_empty() {
        DEFAULT_STEM.to_string()
    } else {
        trimmed.to_string()
    };

    if let Some(i) = index {
        name = name.replace("{index}", &i.to_string());
    }

    for (key, value) in record {
        let placeholder = format!("{{{key}}}");
        if !name.contains(&placeholder) {
            continue;
        }
        let raw = stringify(value);
        let substituted = raw.trim();
        let substituted = if substituted.is_empty() {
            EMPTY_VALUE
        } else {
            substituted
        };
        name = name.replace(&placeholder, substituted);
    }

    name = RE_WHITESPACE.replace_all(&name, "_").to_string();
    name = sanitize(&name);

    if !name.to_lowercase().ends_with(DOCUMENT_EXT) {
        name.push_str(DOCUMENT_EXT);
    }

    name
}

/// Strip characters illegal on common file systems, collapse underscore
/// runs, and truncate while preserving the extension.
pub fn sanitize(filename: &str) -> String {
    let mut name = RE_ILLEGAL.replace_all(filename, "_").to_string();
    name = name.trim().replace(' ', "_");
    name = RE_UNDERSCORES.replace_all(&name, "_").to_string();
    name = name.trim_matches('_').to_string();

    if name.chars().count() > MAX_LEN {
        let (stem, ext) = match name.rfind('.') {
            Some(pos) => (name[..pos].to_string(), name[pos..].to_string()),
            None => (name.clone(), String::new()),
        };
        let keep = MAX_LEN.saturating_sub(ext.chars().count() + 1);
        name = stem.chars().take(keep).collect::<String>() + &ext;
    }

    name
}
