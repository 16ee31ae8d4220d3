//! Generation history: model and store.
//!
//! The history is a bounded, newest-first list of past generations kept in
//! local storage under a single key as one JSON array. Writes replace the
//! whole list, so callers never observe a partially-updated collection.

use crate::error::{Result, WebllamaError};
use crate::event::{BuilderEvent, EventSender, emit};
use crate::files::FileSet;
use crate::storage::KeyValueStorage;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Storage key holding the serialized history list.
pub const HISTORY_KEY: &str = "webllama_history";

/// Maximum number of retained entries; older entries are dropped silently.
pub const HISTORY_LIMIT: usize = 50;

/// One past generation.
///
/// Immutable once created, except for deletion. The id is the creation
/// time in epoch milliseconds; entries are created serially, so ids are
/// unique in practice (same-millisecond collisions are an accepted
/// limitation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Creation timestamp in epoch milliseconds
    pub id: i64,
    /// The prompt that produced this generation
    pub prompt: String,
    /// Model identifier used
    pub model: String,
    /// Generated artifacts
    pub files: FileSet,
    /// Display time (local)
    pub timestamp: String,
    /// Display date (local)
    pub date: String,
}

/// Bounded history of past generations over abstract key-value storage.
pub struct HistoryStore {
    storage: Arc<dyn KeyValueStorage>,
    events: Option<EventSender>,
}

impl HistoryStore {
    /// Creates a store over the given storage backend.
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            storage,
            events: None,
        }
    }

    /// Attaches an event sender; `append`/`delete`/`clear` will publish
    /// [`BuilderEvent::HistoryChanged`] re-render signals through it.
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    /// Appends a new entry built from the current time.
    ///
    /// The entry is prepended (newest-first), the list truncated to
    /// [`HISTORY_LIMIT`], and the whole list re-persisted.
    ///
    /// # Returns
    ///
    /// The entry that was stored.
    pub fn append(
        &self,
        prompt: impl Into<String>,
        model: impl Into<String>,
        files: FileSet,
    ) -> Result<HistoryEntry> {
        let now = Local::now();
        let entry = HistoryEntry {
            id: now.timestamp_millis(),
            prompt: prompt.into(),
            model: model.into(),
            files,
            timestamp: now.format("%I:%M %p").to_string(),
            date: now.format("%d/%m/%Y").to_string(),
        };

        let mut entries = self.list();
        entries.insert(0, entry.clone());
        entries.truncate(HISTORY_LIMIT);
        self.persist(&entries)?;

        emit(&self.events, BuilderEvent::HistoryChanged);
        Ok(entry)
    }

    /// Returns the full ordered list, newest first.
    ///
    /// Missing or unparseable persisted state reads as an empty list,
    /// never an error.
    pub fn list(&self) -> Vec<HistoryEntry> {
        let raw = match self.storage.get(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                tracing::warn!("failed to read history: {err}");
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!("stored history is not parseable, treating as empty: {err}");
                Vec::new()
            }
        }
    }

    /// Returns the entry with the given id.
    pub fn find(&self, id: i64) -> Result<HistoryEntry> {
        self.list()
            .into_iter()
            .find(|entry| entry.id == id)
            .ok_or_else(|| WebllamaError::not_found("history entry", id.to_string()))
    }

    /// Removes the entry with the given id and re-persists the list.
    ///
    /// # Returns
    ///
    /// The removed entry, or `None` when no entry matched.
    pub fn delete(&self, id: i64) -> Result<Option<HistoryEntry>> {
        let mut entries = self.list();
        let deleted = entries.iter().find(|entry| entry.id == id).cloned();
        if deleted.is_some() {
            entries.retain(|entry| entry.id != id);
            self.persist(&entries)?;
            emit(&self.events, BuilderEvent::HistoryChanged);
        }
        Ok(deleted)
    }

    /// Removes the whole history list.
    pub fn clear(&self) -> Result<()> {
        self.storage.remove(HISTORY_KEY)?;
        emit(&self.events, BuilderEvent::HistoryChanged);
        Ok(())
    }

    fn persist(&self, entries: &[HistoryEntry]) -> Result<()> {
        let raw = serde_json::to_string(entries)?;
        self.storage.set(HISTORY_KEY, &raw)
    }
}
