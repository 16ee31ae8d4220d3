//! Storage layer: atomic file primitives and the key-value backend.

pub mod atomic_text;
pub mod file_kv;

pub use atomic_text::{AtomicFileError, AtomicTextFile};
pub use file_kv::FileKeyValueStorage;
