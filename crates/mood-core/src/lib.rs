//! Core domain logic for the mood tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Bucketing: per-day, per-ISO-week and per-month rating averages
//! - Distribution: how often each rating level was picked
//! - Reminders: deciding whether the user should be nudged to log
//! - Aggregate cache: recomputing and publishing the above on every write

pub mod aggregate;
pub mod bucket;
pub mod distribution;
pub mod entry;
pub mod reminder;
pub mod store;
pub mod tags;
pub mod types;

pub use aggregate::{AggregateCache, Aggregates, Subscription};
pub use bucket::{Bucket, BucketLimits, Granularity, bucketize, bucketize_in};
pub use distribution::{Distribution, distribution};
pub use entry::{Entry, NewEntry};
pub use reminder::{ReminderState, check_reminder, is_reminder_due};
pub use store::{EntryStore, MemoryStore, SortOrder, StoreError};
pub use tags::{TagCount, top_tags};
pub use types::{EntryId, Rating, ValidationError};
