//! Recorded mood entries.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{EntryId, Rating, ValidationError};

/// A single mood check-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Identifier assigned by the store.
    pub id: EntryId,
    /// When the entry was recorded.
    pub timestamp: DateTime<Utc>,
    /// The mood rating.
    pub rating: Rating,
    /// Free-form tags (activities, places).
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Optional notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A validated entry that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    pub rating: Rating,
    pub tags: BTreeSet<String>,
    pub notes: Option<String>,
    /// Explicit timestamp; the store uses the insertion time when absent.
    pub timestamp: Option<DateTime<Utc>>,
}

impl NewEntry {
    /// Validates raw registration input.
    ///
    /// Tags are trimmed and de-duplicated. Blank notes are dropped.
    pub fn new<I, T>(rating: i64, tags: I, notes: Option<&str>) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let rating = Rating::new(rating)?;
        let tags = tags
            .into_iter()
            .map(|tag| {
                let tag = tag.as_ref().trim();
                if tag.is_empty() {
                    Err(ValidationError::Empty { field: "tag" })
                } else {
                    Ok(tag.to_string())
                }
            })
            .collect::<Result<BTreeSet<_>, _>>()?;
        let notes = notes
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(String::from);

        Ok(Self {
            rating,
            tags,
            notes,
            timestamp: None,
        })
    }

    /// Sets an explicit timestamp.
    #[must_use]
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Builds the stored entry, stamping `now` unless a timestamp was given.
    pub fn into_entry(self, id: EntryId, now: DateTime<Utc>) -> Entry {
        Entry {
            id,
            timestamp: self.timestamp.unwrap_or(now),
            rating: self.rating,
            tags: self.tags,
            notes: self.notes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn new_entry_normalizes_tags_and_notes() {
        let entry = NewEntry::new(4, [" gym ", "work", "gym"], Some("   ")).unwrap();

        assert_eq!(entry.rating.value(), 4);
        assert_eq!(
            entry.tags.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["gym", "work"]
        );
        assert_eq!(entry.notes, None);
        assert_eq!(entry.timestamp, None);
    }

    #[test]
    fn new_entry_rejects_invalid_input() {
        assert!(matches!(
            NewEntry::new(0, Vec::<String>::new(), None),
            Err(ValidationError::RatingOutOfRange { value: 0, .. })
        ));
        assert_eq!(
            NewEntry::new(3, ["ok", "  "], None),
            Err(ValidationError::Empty { field: "tag" })
        );
    }

    #[test]
    fn into_entry_uses_now_unless_timestamp_given() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let earlier = Utc.with_ymd_and_hms(2025, 2, 28, 9, 30, 0).unwrap();
        let id = EntryId::new("entry-1").unwrap();

        let stamped = NewEntry::new(3, ["walk"], Some("fine"))
            .unwrap()
            .into_entry(id.clone(), now);
        assert_eq!(stamped.timestamp, now);
        assert_eq!(stamped.notes.as_deref(), Some("fine"));

        let explicit = NewEntry::new(3, ["walk"], None)
            .unwrap()
            .at(earlier)
            .into_entry(id, now);
        assert_eq!(explicit.timestamp, earlier);
    }

    #[test]
    fn entry_rejects_invalid_rating_on_deserialize() {
        let json = r#"{
            "id": "entry-1",
            "timestamp": "2025-01-01T00:00:00Z",
            "rating": 7
        }"#;
        let result: Result<Entry, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
