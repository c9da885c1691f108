//! Embedded fonts: raw font bytes → base64 `@font-face` CSS.
//!
//! ## Why embed fonts as data-URIs?
//!
//! The rendering engine loads each document from a `data:` URL with no
//! origin, so it cannot fetch external font files. Inlining the font
//! bytes as base64 data-URIs makes every document self-contained and
//! guarantees the same glyphs regardless of what is installed on the
//! host.
//!
//! ## Build once, read many
//!
//! A [`FontCatalog`] is computed once at startup from caller-provided
//! font bytes and is immutable afterwards. It is shared read-only across
//! all workers (behind an `Arc`), so concurrent reads need no
//! synchronisation.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

/// One font file destined for an `@font-face` rule.
#[derive(Debug, Clone)]
pub struct FontAsset {
    /// CSS font-family name, e.g. `"Marianne"`.
    pub family: String,
    /// CSS font-weight, e.g. 400 or 700.
    pub weight: u16,
    /// Whether the face is italic.
    pub italic: bool,
    /// MIME type, e.g. `"font/woff2"`.
    pub mime: String,
    /// Raw font file bytes.
    pub data: Vec<u8>,
}

impl FontAsset {
    pub fn new(
        family: impl Into<String>,
        weight: u16,
        mime: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            family: family.into(),
            weight,
            italic: false,
            mime: mime.into(),
            data,
        }
    }
}

/// Immutable set of `@font-face` declarations with base64-embedded font
/// bytes, resolved once and reused for every document in the process.
#[derive(Debug, Clone, Default)]
pub struct FontCatalog {
    css: String,
    primary_family: Option<String>,
}

impl FontCatalog {
    /// A catalog with no embedded fonts; documents fall back to the
    /// engine's default sans-serif stack.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build the catalog from font assets. The first asset's family
    /// becomes the primary family used by the base stylesheet.
    pub fn build(assets: &[FontAsset]) -> Self {
        let mut css = String::new();
        for asset in assets {
            let b64 = STANDARD.encode(&asset.data);
            debug!(
                "Embedded font '{}' weight {} ({} bytes)",
                asset.family,
                asset.weight,
                asset.data.len()
            );
            css.push_str(&format!(
                "@font-face {{\n\
                 \x20   font-family: '{}';\n\
                 \x20   src: url('data:{};base64,{}') format('{}');\n\
                 \x20   font-weight: {};\n\
                 \x20   font-style: {};\n\
                 }}\n",
                asset.family,
                asset.mime,
                b64,
                css_format(&asset.mime),
                asset.weight,
                if asset.italic { "italic" } else { "normal" },
            ));
        }
        Self {
            css,
            primary_family: assets.first().map(|a| a.family.clone()),
        }
    }

    /// The assembled `@font-face` CSS block. Empty when no fonts were
    /// supplied.
    pub fn css(&self) -> &str {
        &self.css
    }

    /// The family the base stylesheet should lead its font stack with.
    pub fn primary_family(&self) -> Option<&str> {
        self.primary_family.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.css.is_empty()
    }
}

/// Map a font MIME type to the `format()` hint in the `src` descriptor.
fn css_format(mime: &str) -> &'static str {
    match mime {
        "font/woff2" => "woff2",
        "font/woff" => "woff",
        "font/otf" | "application/font-sfnt" => "opentype",
        _ => "truetype",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_catalog_has_no_css() {
        let c = FontCatalog::empty();
        assert!(c.is_empty());
        assert!(c.primary_family().is_none());
    }

    #[test]
    fn build_embeds_base64_data_uri() {
        let asset = FontAsset::new("Marianne", 400, "font/woff2", vec![1, 2, 3, 4]);
        let c = FontCatalog::build(&[asset]);
        assert!(c.css().contains("font-family: 'Marianne'"));
        assert!(c.css().contains("data:font/woff2;base64,"));
        assert!(c.css().contains("format('woff2')"));
        assert!(c.css().contains("font-weight: 400"));
        assert_eq!(c.primary_family(), Some("Marianne"));
    }

    #[test]
    fn bold_and_italic_faces_are_distinct_rules() {
        let regular = FontAsset::new("Marianne", 400, "font/woff2", vec![0]);
        let mut bold_italic = FontAsset::new("Marianne", 700, "font/woff", vec![0]);
        bold_italic.italic = true;
        let c = FontCatalog::build(&[regular, bold_italic]);
        assert_eq!(c.css().matches("@font-face").count(), 2);
        assert!(c.css().contains("font-weight: 700"));
        assert!(c.css().contains("font-style: italic"));
        assert!(c.css().contains("format('woff')"));
    }

    #[test]
    fn unknown_mime_falls_back_to_truetype() {
        assert_eq!(css_format("font/ttf"), "truetype");
        assert_eq!(css_format("font/otf"), "opentype");
    }
}
