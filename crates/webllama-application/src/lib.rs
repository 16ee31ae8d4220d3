//! Application layer for WebLlama: the builder controller and the
//! export/preview flows it orchestrates.

pub mod builder;
pub mod export;
pub mod preview;

pub use builder::{BuilderPhase, WebsiteBuilder};
pub use export::export_archive;
pub use preview::PreviewWriter;
