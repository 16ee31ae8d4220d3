//! Document composer.
//!
//! Merges a `FileSet` into one standalone HTML document for the preview
//! surface and for export. Insertion is textual first-match replacement,
//! not DOM-aware: when the HTML carries several closing head/body tags only
//! the first is touched. The HTML is model-generated and assumed to carry a
//! single head/body pair.

use crate::files::FileSet;

/// Composes a standalone HTML document from the three buffers.
///
/// The CSS, when non-empty, is wrapped in a `<style>` block and inserted
/// before the first `</head>`; without a head, one is synthesized at the
/// front of the document. The JS, when non-empty, is wrapped in a
/// `<script>` block and inserted before the first `</body>`; without a
/// body, it is appended at the end.
pub fn compose_document(files: &FileSet) -> String {
    let mut html = files.html.clone();

    if !files.css.is_empty() {
        let css_tag = format!("<style>\n{}\n</style>", files.css);
        if html.contains("</head>") {
            html = html.replacen("</head>", &format!("{css_tag}\n</head>"), 1);
        } else {
            html = format!("<head>{css_tag}</head>\n{html}");
        }
    }

    if !files.js.is_empty() {
        let js_tag = format!("<script>\n{}\n</script>", files.js);
        if html.contains("</body>") {
            html = html.replacen("</body>", &format!("{js_tag}\n</body>"), 1);
        } else {
            html = format!("{html}\n{js_tag}");
        }
    }

    html
}
