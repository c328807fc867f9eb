//! Rating histogram.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::entry::Entry;
use crate::types::Rating;

/// Number of entries per rating level.
///
/// Sparse: levels nobody picked are not stored and read back as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Distribution(BTreeMap<Rating, usize>);

impl Distribution {
    /// Count for `rating`, zero when absent.
    pub fn count(&self, rating: Rating) -> usize {
        self.0.get(&rating).copied().unwrap_or(0)
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    /// Fraction of all entries at `rating`, in `[0, 1]`.
    #[allow(clippy::cast_precision_loss)]
    pub fn share(&self, rating: Rating) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.count(rating) as f64 / total as f64,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Present levels with their counts, lowest level first.
    pub fn iter(&self) -> impl Iterator<Item = (Rating, usize)> + '_ {
        self.0.iter().map(|(rating, count)| (*rating, *count))
    }
}

/// Counts entries per rating level.
pub fn distribution(entries: &[Entry]) -> Distribution {
    let mut counts = BTreeMap::new();
    for entry in entries {
        *counts.entry(entry.rating).or_insert(0) += 1;
    }
    Distribution(counts)
}
