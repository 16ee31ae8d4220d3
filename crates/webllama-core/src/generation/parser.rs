//! Response parser for generated website code.
//!
//! A full-generation response is a single text blob carrying up to three
//! marker-delimited segments. Parsing is pure and deterministic: the same
//! input always yields the same `FileSet`. Text outside the marker pairs
//! (prose, apologies, code fences) is discarded.
//!
//! Fallbacks are asymmetric on purpose: a missing HTML or CSS segment is
//! replaced with fixed placeholder content so the preview always renders,
//! while a missing JS segment degrades to an empty string rather than
//! synthesizing script logic.

use crate::files::FileSet;
use once_cell::sync::Lazy;
use regex::Regex;

/// Literal begin/end markers the model is instructed to emit.
pub const HTML_START: &str = "<!-- HTML_START -->";
pub const HTML_END: &str = "<!-- HTML_END -->";
pub const CSS_START: &str = "<!-- CSS_START -->";
pub const CSS_END: &str = "<!-- CSS_END -->";
pub const JS_START: &str = "<!-- JS_START -->";
pub const JS_END: &str = "<!-- JS_END -->";

static HTML_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!-- HTML_START -->(.*?)<!-- HTML_END -->").unwrap());
static CSS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!-- CSS_START -->(.*?)<!-- CSS_END -->").unwrap());
static JS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!-- JS_START -->(.*?)<!-- JS_END -->").unwrap());

/// Splits a raw generation response into the three source buffers.
///
/// For each language: if its marker pair is present, the buffer is the
/// trimmed text strictly between the markers; otherwise the language's
/// fallback applies (placeholder page for HTML, placeholder stylesheet for
/// CSS, empty string for JS).
pub fn parse_generated_code(generated: &str) -> FileSet {
    let html = extract(&HTML_RE, generated).unwrap_or_else(fallback_html);
    let css = extract(&CSS_RE, generated).unwrap_or_else(fallback_css);
    let js = extract(&JS_RE, generated).unwrap_or_default();
    FileSet { html, css, js }
}

fn extract(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .map(|caps| caps.get(1).map_or("", |m| m.as_str()).trim().to_string())
}

/// The placeholder page used when the response carries no HTML segment.
pub fn fallback_html() -> String {
    r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Fallback Website</title>
</head>
<body>
    <header>
        <h1>Fallback Website</h1>
    </header>
    <main>
        <section>
            <p>This is your fallback website.</p>
        </section>
    </main>
    <footer>
        <p>&copy; 2025 Fallback Website</p>
    </footer>
</body>
</html>"#
        .to_string()
}

/// The placeholder stylesheet used when the response carries no CSS segment.
pub fn fallback_css() -> String {
    r#"* {
    margin: 0;
    padding: 0;
    box-sizing: border-box;
}
body {
    color: #202020;
}
header {
    background: #202020;
    color: #FFFFFF;
    text-align: center;
    padding: 2rem;
}
main {
    padding: 2rem;
    text-align: center;
}
footer {
    background: #202020;
    color: #FFFFFF;
    text-align: center;
    padding: 2rem;
}"#
    .to_string()
}
