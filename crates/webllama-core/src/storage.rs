//! Key-value persistence seam.
//!
//! The history and session stores persist through this interface so their
//! logic is testable without a real storage backend. The file-backed
//! implementation lives in the infrastructure crate; an in-memory
//! implementation is provided here for tests and ephemeral use.

use crate::error::Result;
use std::collections::HashMap;
use std::sync::Mutex;

/// An abstract string-by-key persistence interface.
///
/// All access is synchronous; callers own any higher-level consistency
/// (the stores serialize whole values per key, so a `set` is atomic from
/// the caller's point of view).
pub trait KeyValueStorage: Send + Sync {
    /// Returns the stored value for `key`, or `None` when absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes the value stored under `key`, if any.
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory storage backed by a mutex-guarded map.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryKeyValueStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }
}
