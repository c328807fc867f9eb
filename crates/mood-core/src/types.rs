//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// The rating was outside the accepted scale.
    #[error("rating must be between {min} and {max}, got {value}")]
    RatingOutOfRange { value: i64, min: u8, max: u8 },
}

/// A validated entry identifier.
///
/// Entry IDs must be non-empty strings. They are assigned by the entry store
/// and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntryId(String);

impl EntryId {
    /// Creates a new ID after validation.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ValidationError::Empty { field: "entry ID" });
        }
        Ok(Self(id))
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EntryId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EntryId> for String {
    fn from(id: EntryId) -> Self {
        id.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for EntryId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A mood rating on the 1 (very bad) to 5 (very good) scale.
///
/// Aggregations assume every rating went through [`Rating::new`], so they
/// never re-check the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Lowest accepted rating.
    pub const MIN: Self = Self(1);

    /// Highest accepted rating.
    pub const MAX: Self = Self(5);

    /// Creates a rating after validating the range.
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        match u8::try_from(value) {
            Ok(v) if (Self::MIN.0..=Self::MAX.0).contains(&v) => Ok(Self(v)),
            _ => Err(ValidationError::RatingOutOfRange {
                value,
                min: Self::MIN.0,
                max: Self::MAX.0,
            }),
        }
    }

    /// Iterates over every rating level, lowest first.
    pub fn all() -> impl DoubleEndedIterator<Item = Self> {
        (Self::MIN.0..=Self::MAX.0).map(Self)
    }

    /// Returns the inner value.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Human label for the level.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self.0 {
            1 => "Very bad",
            2 => "Bad",
            3 => "Neutral",
            4 => "Good",
            _ => "Very good",
        }
    }

    /// Emoji shown next to the level.
    #[must_use]
    pub const fn emoji(self) -> &'static str {
        match self.0 {
            1 => "😞",
            2 => "😕",
            3 => "😐",
            4 => "🙂",
            _ => "😄",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Rating {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl From<Rating> for f64 {
    fn from(rating: Rating) -> Self {
        Self::from(rating.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_id_rejects_empty() {
        assert!(EntryId::new("").is_err());
        assert!(EntryId::new("valid-id").is_ok());
    }

    #[test]
    fn entry_id_serde_rejects_empty() {
        let result: Result<EntryId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }

    #[test]
    fn entry_id_as_ref() {
        let id = EntryId::new("entry-123").unwrap();
        let s: &str = id.as_ref();
        assert_eq!(s, "entry-123");
    }

    #[test]
    fn rating_validates_range() {
        for value in 1..=5 {
            assert_eq!(Rating::new(value).unwrap().value(), u8::try_from(value).unwrap());
        }
        assert_eq!(
            Rating::new(0),
            Err(ValidationError::RatingOutOfRange {
                value: 0,
                min: 1,
                max: 5
            })
        );
        assert!(Rating::new(6).is_err());
        assert!(Rating::new(-3).is_err());
        assert!(Rating::new(261).is_err());
    }

    #[test]
    fn rating_serde_rejects_out_of_range() {
        let parsed: Rating = serde_json::from_str("4").unwrap();
        assert_eq!(parsed.value(), 4);
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "4");

        let result: Result<Rating, _> = serde_json::from_str("9");
        assert!(result.is_err());
    }

    #[test]
    fn rating_all_covers_scale_in_order() {
        let levels: Vec<u8> = Rating::all().map(Rating::value).collect();
        assert_eq!(levels, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn rating_labels() {
        assert_eq!(Rating::MIN.label(), "Very bad");
        assert_eq!(Rating::new(3).unwrap().label(), "Neutral");
        assert_eq!(Rating::MAX.label(), "Very good");
        assert_eq!(Rating::MAX.emoji(), "😄");
    }
}
