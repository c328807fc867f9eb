//! Storage layer for the mood tracker.
//!
//! Provides persistence for mood entries using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! This means a `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization. Writes are serialized by whoever
//! owns the instance (in the CLI, the aggregate cache).
//!
//! # Schema
//!
//! ## Timestamp Format
//!
//! Timestamps are stored as TEXT in RFC 3339 format with millisecond precision and a
//! `Z` suffix (e.g., `2025-01-15T10:30:00.000Z`). The fixed width means:
//! - Lexicographic ordering matches chronological ordering
//! - Human-readable values in the database
//! - Timezone-aware (always UTC; local interpretation happens in `mood-core`)
//!
//! ## Tags
//!
//! Tags live in `entry_tags`, one row per (entry, tag) pair, and are removed with
//! their entry.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use mood_core::{Entry, EntryId, EntryStore, NewEntry, Rating, SortOrder, StoreError};
use rusqlite::{Connection, params, params_from_iter};
use thiserror::Error;
use uuid::Uuid;

/// Upper bound on bound parameters per tag lookup.
const TAG_QUERY_CHUNK: usize = 500;

const SELECT_ENTRIES: &str = "SELECT id, timestamp, rating, notes FROM entries";

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse an entry timestamp.
    #[error("invalid timestamp for entry {entry_id}: {timestamp}")]
    TimestampParse {
        entry_id: String,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored row violates the entry invariants.
    #[error("invalid entry data for {entry_id}: {message}")]
    InvalidEntryData { entry_id: String, message: String },
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        Self::Backend(Box::new(err))
    }
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// An entry row as stored, before validation.
#[derive(Debug)]
struct EntryRow {
    id: String,
    timestamp: String,
    rating: i64,
    notes: Option<String>,
}

impl EntryRow {
    fn into_entry(self, tags: BTreeSet<String>) -> Result<Entry, DbError> {
        let timestamp = parse_timestamp(&self.timestamp, &self.id)?;
        let rating = Rating::new(self.rating).map_err(|err| DbError::InvalidEntryData {
            entry_id: self.id.clone(),
            message: err.to_string(),
        })?;
        let id = EntryId::new(self.id).map_err(|err| DbError::InvalidEntryData {
            entry_id: String::new(),
            message: err.to_string(),
        })?;
        Ok(Entry {
            id,
            timestamp,
            rating,
            tags,
            notes: self.notes,
        })
    }
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            -- Entries table: one row per mood check-in
            -- timestamp: RFC 3339, millisecond precision, UTC (e.g. '2025-01-15T10:30:00.000Z')
            CREATE TABLE IF NOT EXISTS entries (
                id TEXT PRIMARY KEY,
                timestamp TEXT NOT NULL,
                rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
                notes TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_entries_timestamp ON entries(timestamp);

            CREATE TABLE IF NOT EXISTS entry_tags (
                entry_id TEXT NOT NULL,
                tag TEXT NOT NULL,
                PRIMARY KEY (entry_id, tag),
                FOREIGN KEY (entry_id) REFERENCES entries(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_entry_tags_tag ON entry_tags(tag);
            ",
        )?;
        Ok(())
    }

    /// Inserts a new entry with its tags, assigning a fresh ID.
    ///
    /// Entries without an explicit timestamp are stamped with the current time.
    /// Timestamps are truncated to milliseconds to match the stored format.
    pub fn insert_entry(&mut self, entry: NewEntry) -> Result<Entry, DbError> {
        let raw_id = Uuid::new_v4().to_string();
        let id = EntryId::new(raw_id.clone()).map_err(|err| DbError::InvalidEntryData {
            entry_id: raw_id,
            message: err.to_string(),
        })?;
        let mut entry = entry.into_entry(id, Utc::now());
        entry.timestamp = entry.timestamp.trunc_subsecs(3);

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO entries (id, timestamp, rating, notes) VALUES (?, ?, ?, ?)",
            params![
                entry.id.as_str(),
                format_timestamp(entry.timestamp),
                i64::from(entry.rating.value()),
                entry.notes,
            ],
        )?;
        {
            let mut stmt =
                tx.prepare("INSERT OR IGNORE INTO entry_tags (entry_id, tag) VALUES (?, ?)")?;
            for tag in &entry.tags {
                stmt.execute(params![entry.id.as_str(), tag])?;
            }
        }
        tx.commit()?;

        tracing::debug!(id = %entry.id, timestamp = %entry.timestamp, "inserted entry");
        Ok(entry)
    }

    /// Lists all entries ordered by timestamp then ID.
    pub fn list_entries(&self, order: SortOrder) -> Result<Vec<Entry>, DbError> {
        let direction = match order {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        };
        self.query_entries(
            &format!("{SELECT_ENTRIES} ORDER BY timestamp {direction}, id {direction}"),
            [],
        )
    }

    /// Lists entries within a time range, oldest first.
    ///
    /// The range is inclusive of `start` and exclusive of `end`.
    pub fn list_entries_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Entry>, DbError> {
        if end <= start {
            return Ok(Vec::new());
        }
        self.query_entries(
            &format!(
                "{SELECT_ENTRIES} WHERE timestamp >= ? AND timestamp < ? ORDER BY timestamp ASC, id ASC"
            ),
            [
                format_timestamp(ceil_millis(start)),
                format_timestamp(ceil_millis(end)),
            ],
        )
    }

    /// Returns the entry with the latest timestamp.
    pub fn most_recent_entry(&self) -> Result<Option<Entry>, DbError> {
        let mut entries = self.query_entries(
            &format!("{SELECT_ENTRIES} ORDER BY timestamp DESC, id DESC LIMIT 1"),
            [],
        )?;
        Ok(entries.pop())
    }

    /// Counts stored entries.
    pub fn entry_count(&self) -> Result<usize, DbError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    fn query_entries<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> Result<Vec<Entry>, DbError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, |row| {
            Ok(EntryRow {
                id: row.get(0)?,
                timestamp: row.get(1)?,
                rating: row.get(2)?,
                notes: row.get(3)?,
            })
        })?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }

        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        let mut tags = self.tags_for(&ids)?;
        records
            .into_iter()
            .map(|row| {
                let entry_tags = tags.remove(&row.id).unwrap_or_default();
                row.into_entry(entry_tags)
            })
            .collect()
    }

    fn tags_for(&self, ids: &[&str]) -> Result<HashMap<String, BTreeSet<String>>, DbError> {
        let mut tags: HashMap<String, BTreeSet<String>> = HashMap::new();
        for chunk in ids.chunks(TAG_QUERY_CHUNK) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let mut stmt = self.conn.prepare(&format!(
                "SELECT entry_id, tag FROM entry_tags WHERE entry_id IN ({placeholders})"
            ))?;
            let rows = stmt.query_map(params_from_iter(chunk.iter().copied()), |row| {
                let entry_id: String = row.get(0)?;
                let tag: String = row.get(1)?;
                Ok((entry_id, tag))
            })?;
            for row in rows {
                let (entry_id, tag) = row?;
                tags.entry(entry_id).or_default().insert(tag);
            }
        }
        Ok(tags)
    }
}

impl EntryStore for Database {
    fn insert(&mut self, entry: NewEntry) -> Result<Entry, StoreError> {
        Ok(self.insert_entry(entry)?)
    }

    fn all_entries(&self, order: SortOrder) -> Result<Vec<Entry>, StoreError> {
        Ok(self.list_entries(order)?)
    }

    fn entries_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Entry>, StoreError> {
        Ok(self.list_entries_in_range(start, end)?)
    }

    fn most_recent_entry(&self) -> Result<Option<Entry>, StoreError> {
        Ok(Self::most_recent_entry(self)?)
    }

    fn entry_count(&self) -> Result<usize, StoreError> {
        Ok(Self::entry_count(self)?)
    }
}

fn parse_timestamp(timestamp: &str, entry_id: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            entry_id: entry_id.to_string(),
            timestamp: timestamp.to_string(),
            source,
        })
}

/// Rounds up to the next whole millisecond.
///
/// Stored timestamps have millisecond precision, so for any stored `t`,
/// `t >= x` holds exactly when `t >= ceil_millis(x)`, and likewise for `<`.
fn ceil_millis(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    let truncated = timestamp.trunc_subsecs(3);
    if truncated == timestamp {
        timestamp
    } else {
        truncated + chrono::Duration::milliseconds(1)
    }
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
