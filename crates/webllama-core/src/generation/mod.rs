//! Generation pipeline: response parsing and document composition.

pub mod composer;
pub mod parser;

pub use composer::compose_document;
pub use parser::{fallback_css, fallback_html, parse_generated_code};
