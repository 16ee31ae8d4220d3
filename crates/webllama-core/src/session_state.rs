//! Working-session state: model and store.
//!
//! A single record representing the last unsaved working generation,
//! persisted so an interrupted session can resume where it left off. It is
//! independent of the history list.

use crate::error::Result;
use crate::files::FileSet;
use crate::storage::KeyValueStorage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Storage key holding the singleton session record.
pub const SESSION_KEY: &str = "webllama_current_state";

/// The current working generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Prompt the working buffers were generated from
    #[serde(default)]
    pub prompt: String,
    /// Model identifier in use
    #[serde(default)]
    pub model: String,
    /// Working buffers
    #[serde(default)]
    pub files: FileSet,
}

/// Singleton session store over abstract key-value storage.
pub struct SessionStore {
    storage: Arc<dyn KeyValueStorage>,
}

impl SessionStore {
    /// Creates a store over the given storage backend.
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// Persists the current working state.
    ///
    /// An entirely empty `FileSet` is not worth resuming and is skipped
    /// without touching storage.
    pub fn save(
        &self,
        prompt: impl Into<String>,
        model: impl Into<String>,
        files: &FileSet,
    ) -> Result<()> {
        if files.is_empty() {
            return Ok(());
        }

        let state = SessionState {
            prompt: prompt.into(),
            model: model.into(),
            files: files.clone(),
        };
        let raw = serde_json::to_string(&state)?;
        self.storage.set(SESSION_KEY, &raw)
    }

    /// Returns the persisted working state, or `None` when nothing is
    /// there to resume (missing key and corrupt state both read as
    /// `None`).
    pub fn load(&self) -> Option<SessionState> {
        let raw = match self.storage.get(SESSION_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!("failed to read session state: {err}");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(state) => Some(state),
            Err(err) => {
                tracing::warn!("stored session state is not parseable, ignoring: {err}");
                None
            }
        }
    }

    /// Removes the persisted working state.
    pub fn clear(&self) -> Result<()> {
        self.storage.remove(SESSION_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKeyValueStorage;

    fn store() -> SessionStore {
        SessionStore::new(Arc::new(MemoryKeyValueStorage::new()))
    }

    #[test]
    fn test_load_is_none_initially() {
        assert!(store().load().is_none());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let store = store();
        let files = FileSet::new("<h1>Hi</h1>", "h1{}", "f();");
        store.save("a bakery", "model-x", &files).unwrap();

        let state = store.load().unwrap();
        assert_eq!(state.prompt, "a bakery");
        assert_eq!(state.model, "model-x");
        assert_eq!(state.files, files);
    }

    #[test]
    fn test_save_skips_entirely_empty_files() {
        let store = store();
        store.save("a bakery", "model-x", &FileSet::default()).unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_save_replaces_previous_state() {
        let store = store();
        store.save("one", "model-x", &FileSet::new("<p>1</p>", "", "")).unwrap();
        store.save("two", "model-x", &FileSet::new("<p>2</p>", "", "")).unwrap();
        assert_eq!(store.load().unwrap().prompt, "two");
    }

    #[test]
    fn test_corrupt_state_reads_as_none() {
        let storage = Arc::new(MemoryKeyValueStorage::new());
        storage.set(SESSION_KEY, "][").unwrap();
        assert!(SessionStore::new(storage).load().is_none());
    }

    #[test]
    fn test_clear() {
        let store = store();
        store.save("one", "model-x", &FileSet::new("<p>1</p>", "", "")).unwrap();
        store.clear().unwrap();
        assert!(store.load().is_none());
    }
}
