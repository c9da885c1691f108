//! Document scaffolding: base stylesheet, header/signature blocks, and
//! the full-page shell every rendered document is wrapped in.
//!
//! The base stylesheet intentionally mirrors the class vocabulary of the
//! upstream rich-text editor (`ql-size-*`, `ql-align-*`, `footer-style`)
//! so documents authored there print the way they looked on screen. The
//! caller's stylesheet is appended after it and can override anything.

/// Extension every generated document carries.
pub const DOCUMENT_EXT: &str = ".pdf";

/// Width of the header logo image.
const LOGO_WIDTH: &str = "80pt";

/// Width of the signature image.
const SIGNATURE_WIDTH: &str = "100pt";

/// Fixed base stylesheet: typography plus the editor's alignment and
/// size utility classes. `font_stack` leads with the primary embedded
/// family when one exists.
pub fn base_stylesheet(font_stack: &str) -> String {
    format!(
        r#"
        body {{
            font-family: {font_stack};
            line-height: 1.6;
            color: #000000;
            margin: 2cm;
        }}

        p {{
            font-size: 11pt;
            line-height: 1.4;
            margin-top: 0;
            margin-bottom: 6pt;
        }}

        /* Editor size formats */
        .ql-size-8pt {{
            font-size: 8pt !important;
            color: #666666 !important;
        }}

        .ql-size-18pt {{
            font-size: 18pt;
        }}

        .ql-size-24pt {{
            font-size: 24pt;
        }}

        /* "Footer" paragraph style offered by the editor */
        .footer-style {{
            font-size: 8pt !important;
            font-weight: 400 !important;
            color: #666666 !important;
            line-height: 1.3 !important;
        }}

        .ql-align-left {{
            text-align: left !important;
        }}

        .ql-align-center {{
            text-align: center !important;
        }}

        .ql-align-right {{
            text-align: right !important;
        }}

        .ql-align-justify {{
            text-align: justify !important;
        }}

        h1 {{
            font-size: 24pt;
            font-weight: 700;
            margin-top: 12pt;
            margin-bottom: 6pt;
        }}

        h2 {{
            font-size: 18pt;
            font-weight: 700;
            margin-top: 10pt;
            margin-bottom: 5pt;
        }}

        h3 {{
            font-size: 14pt;
            font-weight: 700;
            margin-top: 8pt;
            margin-bottom: 4pt;
        }}

        strong, b {{
            font-weight: 700;
        }}

        em, i {{
            font-style: italic;
        }}

        u {{
            text-decoration: underline;
        }}

        ul, ol {{
            font-size: 11pt;
            margin-bottom: 6pt;
            padding-left: 20pt;
            line-height: 1.4;
        }}

        li {{
            margin-bottom: 3pt;
        }}

        table {{
            width: 100%;
            border-collapse: collapse;
            margin-bottom: 10pt;
            font-size: 11pt;
        }}

        th, td {{
            border: 1pt solid #ccc;
            padding: 5pt;
            text-align: left;
        }}

        th {{
            background-color: #f0f0f0;
            font-weight: 700;
        }}

        .signature-container {{
            margin-top: 30pt;
            text-align: right;
        }}
"#
    )
}

/// Two-column header: logo left, service-name block right, followed by a
/// rule line. Returns an empty string when neither input is present.
pub fn header_block(logo: Option<&str>, service_name: Option<&str>) -> String {
    if logo.is_none() && service_name.is_none() {
        return String::new();
    }

    let logo_cell = logo
        .map(|url| {
            format!(
                r#"<img src="{url}" alt="Logo" style="width: {LOGO_WIDTH}; height: auto; display: block;">"#
            )
        })
        .unwrap_or_default();

    let service_cell = service_name
        .map(|name| {
            // The editor saves the block with CRLF or LF line breaks;
            // both become explicit <br> in the cell.
            let lines = name.replace("\r\n", "\n");
            let joined = lines.split('\n').collect::<Vec<_>>().join("<br>");
            format!(r#"<div style="font-size: 10pt; line-height: 1.3;">{joined}</div>"#)
        })
        .unwrap_or_default();

    format!(
        r#"
    <div style="display: table; width: 100%; margin-bottom: 20pt;">
        <div style="display: table-row;">
            <div style="display: table-cell; width: 50%; vertical-align: top;">
                {logo_cell}
            </div>
            <div style="display: table-cell; width: 50%; vertical-align: top; text-align: right;">
                {service_cell}
            </div>
        </div>
    </div>
    <hr style="border: none; border-top: 2pt solid #000091; margin: 15pt 0 20pt 0; padding: 0;" />
"#
    )
}

/// Right-aligned signature image anchored to the end of the content.
/// Returns an empty string when no signature asset is present.
pub fn signature_block(signature: Option<&str>) -> String {
    match signature {
        None => String::new(),
        Some(url) => format!(
            r#"
    <div class="signature-container" style="margin-top: 10pt; text-align: right;">
        <img src="{url}" alt="Signature" style="width: {SIGNATURE_WIDTH}; height: auto; display: inline-block;">
    </div>
"#
        ),
    }
}

/// Wrap the rendered body in the full document shell: embedded font
/// faces, base stylesheet, caller stylesheet (last, so it wins), header
/// and signature blocks.
pub fn document_shell(
    font_face_css: &str,
    font_stack: &str,
    template_css: &str,
    header: &str,
    body: &str,
    signature: &str,
) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Generated document</title>
    <style>
        {font_face_css}
        {base}
        {template_css}
    </style>
</head>
<body>
    {header}
    <div class="contenu">
        {body}
        {signature}
    </div>
</body>
</html>"#,
        base = base_stylesheet(font_stack),
    )
}
