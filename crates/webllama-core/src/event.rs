//! High-level events published by the builder and its stores.
//!
//! All UI-visible effects travel over one `tokio::sync::mpsc` channel of
//! these events, keeping the controller independent of any particular
//! front end.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Severity tag attached to a transient status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusLevel {
    Error,
    Success,
    Info,
}

/// Events that the front end renders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BuilderEvent {
    /// Transient user-visible status message.
    Status {
        level: StatusLevel,
        message: String,
    },
    /// The persisted history list changed; re-render it.
    HistoryChanged,
    /// The in-memory buffers were replaced wholesale (generation or
    /// history load).
    BuffersReplaced,
    /// The working prompt was replaced (prompt enhancement).
    PromptReplaced {
        prompt: String,
    },
    /// A fresh preview document is available at the given path.
    PreviewUpdated {
        path: PathBuf,
    },
    /// All local state was wiped.
    Cleared,
}

/// Sender half used by stores and the controller to publish events.
///
/// Unbounded: event production is driven by user actions and is never
/// high-frequency.
pub type EventSender = tokio::sync::mpsc::UnboundedSender<BuilderEvent>;

/// Sends an event, ignoring a closed receiver.
///
/// A front end that has shut down its receiver must not turn store
/// operations into errors.
pub fn emit(sender: &Option<EventSender>, event: BuilderEvent) {
    if let Some(tx) = sender {
        let _ = tx.send(event);
    }
}
