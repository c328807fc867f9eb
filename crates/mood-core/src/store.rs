//! Entry persistence seam.
//!
//! The core never owns storage. Anything that can append entries and read
//! them back by time implements [`EntryStore`]; `mood-db` provides the
//! SQLite implementation and [`MemoryStore`] keeps everything in a `Vec`.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::entry::{Entry, NewEntry};
use crate::types::{EntryId, ValidationError};

/// Errors surfaced by an entry store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Stored data failed validation on the way in or out.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The backing store failed.
    #[error("entry store failure: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Timestamp ordering for [`EntryStore::all_entries`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Oldest first, as bucketing wants.
    Ascending,
    /// Newest first, as history views want.
    Descending,
}

/// Append-only storage for entries.
pub trait EntryStore {
    /// Persists a new entry, assigning its ID and (if missing) timestamp.
    fn insert(&mut self, entry: NewEntry) -> Result<Entry, StoreError>;

    /// Every entry ordered by timestamp, ties broken by ID.
    fn all_entries(&self, order: SortOrder) -> Result<Vec<Entry>, StoreError>;

    /// Entries with `start <= timestamp < end`, oldest first.
    fn entries_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Entry>, StoreError>;

    /// The entry with the latest timestamp, if any.
    fn most_recent_entry(&self) -> Result<Option<Entry>, StoreError>;

    /// Number of stored entries.
    fn entry_count(&self) -> Result<usize, StoreError> {
        Ok(self.all_entries(SortOrder::Ascending)?.len())
    }
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Vec<Entry>,
    next_id: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn sorted(&self) -> Vec<Entry> {
        let mut entries = self.entries.clone();
        entries.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));
        entries
    }
}

impl EntryStore for MemoryStore {
    fn insert(&mut self, entry: NewEntry) -> Result<Entry, StoreError> {
        self.next_id += 1;
        let id = EntryId::new(format!("mem-{:06}", self.next_id))?;
        let entry = entry.into_entry(id, Utc::now());
        self.entries.push(entry.clone());
        Ok(entry)
    }

    fn all_entries(&self, order: SortOrder) -> Result<Vec<Entry>, StoreError> {
        let mut entries = self.sorted();
        if order == SortOrder::Descending {
            entries.reverse();
        }
        Ok(entries)
    }

    fn entries_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Entry>, StoreError> {
        Ok(self
            .sorted()
            .into_iter()
            .filter(|e| e.timestamp >= start && e.timestamp < end)
            .collect())
    }

    fn most_recent_entry(&self) -> Result<Option<Entry>, StoreError> {
        Ok(self.sorted().pop())
    }

    fn entry_count(&self) -> Result<usize, StoreError> {
        Ok(self.entries.len())
    }
}
