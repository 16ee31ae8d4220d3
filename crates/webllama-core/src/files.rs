//! FileSet domain model.
//!
//! A `FileSet` holds the three source buffers that make up one generated
//! website. It is produced by the response parser, mutated by direct user
//! edits, and consumed by the document composer, the history store, and
//! the session store.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three artifacts of a single generation.
///
/// All fields may be empty. An entirely empty set means "nothing generated
/// yet" and is not worth persisting as session state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSet {
    /// HTML markup, or empty
    #[serde(default)]
    pub html: String,
    /// Stylesheet, or empty
    #[serde(default)]
    pub css: String,
    /// Script, or empty
    #[serde(default)]
    pub js: String,
}

impl FileSet {
    /// Creates a file set from the three buffers.
    pub fn new(html: impl Into<String>, css: impl Into<String>, js: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            css: css.into(),
            js: js.into(),
        }
    }

    /// Returns true when all three buffers are empty.
    pub fn is_empty(&self) -> bool {
        self.html.is_empty() && self.css.is_empty() && self.js.is_empty()
    }

    /// Returns the buffer for the given kind.
    pub fn get(&self, kind: FileKind) -> &str {
        match kind {
            FileKind::Html => &self.html,
            FileKind::Css => &self.css,
            FileKind::Js => &self.js,
        }
    }

    /// Replaces the buffer for the given kind.
    pub fn set(&mut self, kind: FileKind, content: impl Into<String>) {
        match kind {
            FileKind::Html => self.html = content.into(),
            FileKind::Css => self.css = content.into(),
            FileKind::Js => self.js = content.into(),
        }
    }
}

/// Identifies one of the three editable buffers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    #[default]
    Html,
    Css,
    Js,
}

impl FileKind {
    /// The export file name for this buffer kind.
    pub fn file_name(&self) -> &'static str {
        match self {
            FileKind::Html => "index.html",
            FileKind::Css => "style.css",
            FileKind::Js => "script.js",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileKind::Html => "html",
            FileKind::Css => "css",
            FileKind::Js => "js",
        };
        write!(f, "{name}")
    }
}

impl FromStr for FileKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(FileKind::Html),
            "css" => Ok(FileKind::Css),
            "js" | "javascript" => Ok(FileKind::Js),
            other => Err(format!("unknown file kind '{other}' (expected html, css, or js)")),
        }
    }
}
