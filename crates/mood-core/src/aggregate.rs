//! Aggregates recomputed whenever the entry collection changes.
//!
//! [`AggregateCache`] owns the store, so every write goes through it and is
//! followed by a whole-collection recomputation. Results are published on a
//! `tokio::sync::watch` channel: a new subscriber sees the current value
//! immediately, and existing subscribers are marked changed after each
//! recomputation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;

use crate::bucket::{Bucket, BucketLimits, Granularity, bucketize};
use crate::distribution::{Distribution, distribution};
use crate::entry::{Entry, NewEntry};
use crate::store::{EntryStore, SortOrder, StoreError};
use crate::tags::{TagCount, top_tags};

/// Number of tags kept in [`Aggregates::top_tags`].
pub const TOP_TAG_COUNT: usize = 5;

/// Everything the presentation layer shows about the collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Aggregates {
    pub daily: Vec<Bucket>,
    pub weekly: Vec<Bucket>,
    pub monthly: Vec<Bucket>,
    pub distribution: Distribution,
    pub top_tags: Vec<TagCount>,
    pub entry_count: usize,
    /// Timestamp of the most recent entry, for reminder checks.
    pub last_entry_at: Option<DateTime<Utc>>,
}

impl Aggregates {
    /// Computes aggregates from entries sorted oldest first.
    pub fn compute(entries: &[Entry], limits: BucketLimits) -> Self {
        Self {
            daily: bucketize(entries, Granularity::Day, limits.day),
            weekly: bucketize(entries, Granularity::Week, limits.week),
            monthly: bucketize(entries, Granularity::Month, limits.month),
            distribution: distribution(entries),
            top_tags: top_tags(entries, TOP_TAG_COUNT),
            entry_count: entries.len(),
            last_entry_at: entries.iter().map(|e| e.timestamp).max(),
        }
    }

    /// Buckets for `granularity`.
    pub fn buckets(&self, granularity: Granularity) -> &[Bucket] {
        match granularity {
            Granularity::Day => &self.daily,
            Granularity::Week => &self.weekly,
            Granularity::Month => &self.monthly,
        }
    }
}

/// Receiving end of the aggregate feed.
pub type Subscription = watch::Receiver<Arc<Aggregates>>;

/// Owner of the store and publisher of its aggregates.
pub struct AggregateCache<S> {
    store: S,
    limits: BucketLimits,
    sender: watch::Sender<Arc<Aggregates>>,
}

impl<S: EntryStore> AggregateCache<S> {
    /// Wraps `store` and computes the initial aggregates.
    pub fn new(store: S, limits: BucketLimits) -> Result<Self, StoreError> {
        let (sender, _) = watch::channel(Arc::new(Aggregates::default()));
        let cache = Self {
            store,
            limits,
            sender,
        };
        cache.on_entries_changed()?;
        Ok(cache)
    }

    /// Subscribes to aggregate updates.
    ///
    /// The current aggregates are readable right away through `borrow()`.
    pub fn subscribe(&self) -> Subscription {
        self.sender.subscribe()
    }

    /// Last published aggregates.
    pub fn latest(&self) -> Arc<Aggregates> {
        Arc::clone(&self.sender.borrow())
    }

    /// Recomputes from the whole collection and publishes the result.
    pub fn on_entries_changed(&self) -> Result<Arc<Aggregates>, StoreError> {
        let entries = self.store.all_entries(SortOrder::Ascending)?;
        let aggregates = Arc::new(Aggregates::compute(&entries, self.limits));
        tracing::debug!(
            entries = aggregates.entry_count,
            subscribers = self.sender.receiver_count(),
            "recomputed aggregates"
        );
        self.sender.send_replace(Arc::clone(&aggregates));
        Ok(aggregates)
    }

    /// Recomputes only when the store's entry count or latest timestamp
    /// differs from the published aggregates, then returns the current value.
    ///
    /// Picks up writes made through another handle on the same store.
    pub fn refresh(&self) -> Result<Arc<Aggregates>, StoreError> {
        let published = self.latest();
        let count = self.store.entry_count()?;
        let last_entry_at = self.store.most_recent_entry()?.map(|e| e.timestamp);
        if count == published.entry_count && last_entry_at == published.last_entry_at {
            return Ok(published);
        }
        self.on_entries_changed()
    }

    /// Stores a new entry and republishes the aggregates.
    ///
    /// Once the insert succeeds the entry is returned even if recomputing
    /// fails; the published aggregates then stay stale until the next
    /// [`refresh`](Self::refresh) or [`on_entries_changed`](Self::on_entries_changed).
    pub fn record(&mut self, entry: NewEntry) -> Result<Entry, StoreError> {
        let entry = self.store.insert(entry)?;
        tracing::info!(id = %entry.id, rating = %entry.rating, "recorded entry");
        if let Err(err) = self.on_entries_changed() {
            tracing::warn!(id = %entry.id, error = %err, "entry saved but aggregates not republished");
        }
        Ok(entry)
    }

    /// Read access to the underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn limits(&self) -> BucketLimits {
        self.limits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use crate::store::MemoryStore;
    use crate::types::Rating;
    use chrono::{Duration, TimeZone};

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap() + Duration::days(n)
    }

    fn new_entry(rating: i64, tags: &[&str], at: DateTime<Utc>) -> NewEntry {
        NewEntry::new(rating, tags.iter().copied(), None)
            .unwrap()
            .at(at)
    }

    #[test]
    fn new_subscriber_sees_current_aggregates() {
        let mut store = MemoryStore::new();
        store.insert(new_entry(4, &["gym"], day(0))).unwrap();
        let cache = AggregateCache::new(store, BucketLimits::default()).unwrap();

        let subscription = cache.subscribe();
        let current = subscription.borrow();
        assert_eq!(current.entry_count, 1);
        assert_eq!(current.daily.len(), 1);
        assert_eq!(current.last_entry_at, Some(day(0)));
    }

    #[test]
    fn record_republishes_to_existing_subscribers() {
        let mut cache = AggregateCache::new(MemoryStore::new(), BucketLimits::default()).unwrap();
        let mut subscription = cache.subscribe();
        assert_eq!(subscription.borrow_and_update().entry_count, 0);

        for (i, rating) in [2, 4, 4, 5, 3].into_iter().enumerate() {
            cache
                .record(new_entry(rating, &["work"], day(i64::try_from(i).unwrap())))
                .unwrap();
        }

        assert!(subscription.has_changed().unwrap());
        let latest = subscription.borrow_and_update().clone();
        assert_eq!(latest.entry_count, 5);
        assert_eq!(latest.daily.len(), 5);
        assert_eq!(latest.distribution.count(Rating::new(4).unwrap()), 2);
        assert_eq!(latest.distribution.total(), 5);
        assert_eq!(latest.top_tags[0].tag, "work");
        assert_eq!(latest.last_entry_at, Some(day(4)));
        assert_eq!(cache.latest(), latest);
    }

    #[test]
    fn limits_apply_per_granularity() {
        let mut store = MemoryStore::new();
        for n in 0..60 {
            store.insert(new_entry(3, &[], day(n))).unwrap();
        }
        let limits = BucketLimits {
            day: 3,
            week: 2,
            month: 1,
        };
        let cache = AggregateCache::new(store, limits).unwrap();

        let latest = cache.latest();
        assert_eq!(latest.buckets(Granularity::Day).len(), 3);
        assert_eq!(latest.buckets(Granularity::Week).len(), 2);
        assert_eq!(latest.buckets(Granularity::Month).len(), 1);
        assert_eq!(latest.entry_count, 60);
    }

    /// Store whose reads can be switched off to simulate a failing backend.
    #[derive(Default)]
    struct FailingReads {
        inner: MemoryStore,
        fail: Cell<bool>,
    }

    impl FailingReads {
        fn check(&self) -> Result<(), StoreError> {
            if self.fail.get() {
                return Err(StoreError::Backend("reads disabled".into()));
            }
            Ok(())
        }
    }

    impl EntryStore for FailingReads {
        fn insert(&mut self, entry: NewEntry) -> Result<Entry, StoreError> {
            self.inner.insert(entry)
        }

        fn all_entries(&self, order: SortOrder) -> Result<Vec<Entry>, StoreError> {
            self.check()?;
            self.inner.all_entries(order)
        }

        fn entries_in_range(
            &self,
            start: DateTime<Utc>,
            end: DateTime<Utc>,
        ) -> Result<Vec<Entry>, StoreError> {
            self.check()?;
            self.inner.entries_in_range(start, end)
        }

        fn most_recent_entry(&self) -> Result<Option<Entry>, StoreError> {
            self.check()?;
            self.inner.most_recent_entry()
        }
    }

    #[test]
    fn record_returns_saved_entry_when_recompute_fails() {
        let mut cache = AggregateCache::new(FailingReads::default(), BucketLimits::default()).unwrap();
        cache.store().fail.set(true);

        let entry = cache.record(new_entry(4, &["x"], day(0))).unwrap();

        assert_eq!(entry.rating, Rating::new(4).unwrap());
        assert_eq!(cache.store().inner.len(), 1);
        assert_eq!(cache.latest().entry_count, 0);

        cache.store().fail.set(false);
        let refreshed = cache.refresh().unwrap();
        assert_eq!(refreshed.entry_count, 1);
        assert_eq!(refreshed.last_entry_at, Some(day(0)));
    }

    #[test]
    fn refresh_skips_recompute_when_store_is_unchanged() {
        let cache = AggregateCache::new(MemoryStore::new(), BucketLimits::default()).unwrap();
        let mut subscription = cache.subscribe();
        subscription.borrow_and_update();

        let current = cache.refresh().unwrap();

        assert!(!subscription.has_changed().unwrap());
        assert!(Arc::ptr_eq(&current, &cache.latest()));
    }

    #[tokio::test]
    async fn subscriber_wakes_after_write() {
        let mut cache = AggregateCache::new(MemoryStore::new(), BucketLimits::default()).unwrap();
        let mut subscription = cache.subscribe();

        let waiter = tokio::spawn(async move {
            subscription.changed().await.unwrap();
            subscription.borrow().entry_count
        });

        cache.record(new_entry(5, &[], day(0))).unwrap();

        assert_eq!(waiter.await.unwrap(), 1);
    }
}
