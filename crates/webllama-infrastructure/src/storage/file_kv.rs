//! File-backed key-value storage.
//!
//! Each key maps to one `<key>.json` file under a base directory, written
//! through the atomic text layer. This is the production implementation of
//! the persistence seam behind the history and session stores.

use super::atomic_text::AtomicTextFile;
use crate::paths::WebllamaPaths;
use std::path::PathBuf;
use webllama_core::Result;
use webllama_core::storage::KeyValueStorage;

/// Key-value storage persisting each key as a JSON file on disk.
pub struct FileKeyValueStorage {
    base_dir: PathBuf,
}

impl FileKeyValueStorage {
    /// Creates storage rooted at the given directory (created lazily on
    /// first write).
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Creates storage at the default state directory
    /// (`~/.config/webllama/state/`).
    pub fn default_location() -> Result<Self> {
        let base_dir = WebllamaPaths::state_dir()?;
        Ok(Self::new(base_dir))
    }

    fn file(&self, key: &str) -> AtomicTextFile {
        AtomicTextFile::new(self.base_dir.join(format!("{key}.json")))
    }
}

impl KeyValueStorage for FileKeyValueStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.file(key).load()?)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        tracing::debug!(key, bytes = value.len(), "persisting state file");
        Ok(self.file(key).save(value)?)
    }

    fn remove(&self, key: &str) -> Result<()> {
        tracing::debug!(key, "removing state file");
        Ok(self.file(key).remove()?)
    }
}
