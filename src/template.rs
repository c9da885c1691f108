//! Data model: the template and the record it is rendered against.
//!
//! A [`Template`] is the unit the persistence layer hands over — this
//! library only renders whatever content it is given and never stores or
//! looks templates up. A [`Record`] is one row of caller-supplied data
//! driving one generated document; the pipeline never mutates it
//! (normalisation produces a derived copy).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One row of structured data: an ordered mapping from field name to a
/// scalar value (string, number, boolean, or null).
///
/// `serde_json` is built with `preserve_order`, so field order survives
/// deserialisation and the derived copy produced by normalisation.
pub type Record = serde_json::Map<String, Value>;

/// A user-authored document template plus its styling and decorative
/// assets, shared across all records in a batch.
///
/// `logo` and `signature` are image data-URIs (`data:image/png;base64,…`)
/// as produced by the template editor; `service_name` is a plain-text
/// block whose line breaks are preserved in the header.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Template {
    /// Caller-chosen template name. Informational only.
    #[serde(default)]
    pub name: String,

    /// Markup-with-placeholders body content.
    pub content: String,

    /// Caller-supplied stylesheet, appended after the base stylesheet so
    /// it can override defaults.
    #[serde(default)]
    pub css: String,

    /// Header logo as an image data-URI.
    #[serde(default)]
    pub logo: Option<String>,

    /// Signature image data-URI, rendered right-aligned after the body.
    #[serde(default)]
    pub signature: Option<String>,

    /// Multi-line service-name text block shown opposite the logo.
    #[serde(default)]
    pub service_name: Option<String>,
}

impl Template {
    /// Create a template from body content alone, with no styling or
    /// decorative assets.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }
}
