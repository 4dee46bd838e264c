//! Bounded, write-through navigation history.
//!
//! The list is kept most-recent-first, never exceeds [`HISTORY_CAPACITY`]
//! entries, and is serialised as a JSON array of `{"id", "text"}` objects
//! under [`HISTORY_KEY`] after every mutation:
//!
//! ```json
//! [{"id":1718000000123,"text":"Navigated to paris"},
//!  {"id":1717999999001,"text":"Navigated to delhi"}]
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::ports::{Clock, KeyValueStore, StorageError};

/// Storage key holding the serialised history list.
pub const HISTORY_KEY: &str = "mapHistory";

/// Maximum number of retained entries.
pub const HISTORY_CAPACITY: usize = 10;

/// Only texts starting with this prefix are recorded.
pub const NAVIGATION_PREFIX: &str = "Navigated to";

/// One recorded navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Millisecond timestamp, strictly increasing across entries.
    pub id: u64,
    pub text: String,
}

/// A mutation that could not be written through to storage.
///
/// The in-memory list has already been updated when this is returned.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("failed to serialise history: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Owns the navigation history and its durable copy.
pub struct HistoryStore {
    entries: Vec<HistoryEntry>,
    store: Box<dyn KeyValueStore + Send>,
    clock: Box<dyn Clock + Send>,
    last_id: u64,
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore")
            .field("entries", &self.entries)
            .field("last_id", &self.last_id)
            .finish_non_exhaustive()
    }
}

impl HistoryStore {
    /// Rehydrates the history from `store`.
    ///
    /// An absent key, unreadable storage, or a value that is not a valid
    /// entry list all yield an empty history.  A list holding the id
    /// `u64::MAX` is treated as malformed, since no later id could follow it.
    /// Entries repeating an earlier id are dropped.  Never fails.
    pub fn load(store: Box<dyn KeyValueStore + Send>, clock: Box<dyn Clock + Send>) -> Self {
        let entries = match store.get(HISTORY_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
                Ok(entries) if entries.iter().any(|e| e.id == u64::MAX) => {
                    warn!("stored history holds an exhausted id, starting empty");
                    Vec::new()
                }
                Ok(entries) => {
                    let mut entries = without_repeated_ids(entries);
                    entries.truncate(HISTORY_CAPACITY);
                    entries
                }
                Err(e) => {
                    warn!("stored history is malformed, starting empty: {e}");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("could not read stored history, starting empty: {e}");
                Vec::new()
            }
        };
        let last_id = entries.iter().map(|e| e.id).max().unwrap_or(0);
        debug!(count = entries.len(), "history loaded");
        Self {
            entries,
            store,
            clock,
            last_id,
        }
    }

    /// Records `text` at the front of the list and persists it.
    ///
    /// Returns `Ok(None)` without touching anything when `text` is not a
    /// navigation record, otherwise the id assigned to the new entry.
    pub fn append(&mut self, text: &str) -> Result<Option<u64>, HistoryError> {
        if !text.starts_with(NAVIGATION_PREFIX) {
            debug!("not a navigation record, skipped: {text:?}");
            return Ok(None);
        }

        let id = self.clock.now_millis().max(self.last_id.saturating_add(1));
        self.last_id = id;
        self.entries.insert(
            0,
            HistoryEntry {
                id,
                text: text.to_string(),
            },
        );
        self.entries.truncate(HISTORY_CAPACITY);
        self.persist()?;
        Ok(Some(id))
    }

    /// Removes the entry with `id`, if any, and persists the result.
    ///
    /// Returns whether an entry was removed.  The list is written even when
    /// nothing matched.
    pub fn delete(&mut self, id: u64) -> Result<bool, HistoryError> {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        let removed = self.entries.len() != before;
        self.persist()?;
        Ok(removed)
    }

    /// Entries, most recent first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&mut self) -> Result<(), HistoryError> {
        let json = serde_json::to_string(&self.entries)?;
        self.store.set(HISTORY_KEY, &json).map_err(|e| {
            warn!("history write-through failed: {e}");
            HistoryError::from(e)
        })
    }
}

/// Keeps the first entry carrying each id.
fn without_repeated_ids(entries: Vec<HistoryEntry>) -> Vec<HistoryEntry> {
    let mut seen = HashSet::with_capacity(entries.len());
    let before = entries.len();
    let kept: Vec<HistoryEntry> = entries.into_iter().filter(|e| seen.insert(e.id)).collect();
    if kept.len() != before {
        warn!(dropped = before - kept.len(), "stored history repeats ids");
    }
    kept
}
