//! Log command for recording a mood entry.

use std::io::Write;

use anyhow::{Context, Result};
use mood_core::{AggregateCache, EntryStore, NewEntry};

use super::util::{format_local, parse_datetime};

/// Records one entry through the cache so aggregates stay current.
pub fn run<W: Write, S: EntryStore>(
    writer: &mut W,
    cache: &mut AggregateCache<S>,
    rating: i64,
    tags: &[String],
    notes: Option<&str>,
    at: Option<&str>,
) -> Result<()> {
    let mut new_entry = NewEntry::new(rating, tags, notes).context("invalid entry")?;
    if let Some(at) = at {
        new_entry = new_entry.at(parse_datetime(at)?);
    }

    let entry = cache.record(new_entry).context("failed to record entry")?;
    let aggregates = cache.latest();

    writeln!(
        writer,
        "Logged {} {} {} at {}",
        entry.rating,
        entry.rating.emoji(),
        entry.rating.label(),
        format_local(entry.timestamp)
    )?;
    if !entry.tags.is_empty() {
        let tags: Vec<&str> = entry.tags.iter().map(String::as_str).collect();
        writeln!(writer, "Tags: {}", tags.join(", "))?;
    }
    writeln!(writer, "Entry id: {}", entry.id)?;
    writeln!(writer, "Entries recorded: {}", aggregates.entry_count)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mood_core::{BucketLimits, MemoryStore, SortOrder};

    #[test]
    fn log_records_entry_and_refreshes_aggregates() {
        let mut cache = AggregateCache::new(MemoryStore::new(), BucketLimits::default()).unwrap();
        let tags = vec!["gym".to_string(), " friends ".to_string()];

        let mut output = Vec::new();
        run(&mut output, &mut cache, 4, &tags, Some("good run"), None).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.starts_with("Logged 4 🙂 Good at "));
        assert!(output.contains("Tags: friends, gym\n"));
        assert!(output.contains("Entry id: mem-000001\n"));
        assert!(output.ends_with("Entries recorded: 1\n"));

        let stored = cache.store().all_entries(SortOrder::Ascending).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].notes.as_deref(), Some("good run"));
        assert_eq!(cache.latest().distribution.total(), 1);
    }

    #[test]
    fn log_accepts_explicit_time() {
        let mut cache = AggregateCache::new(MemoryStore::new(), BucketLimits::default()).unwrap();

        let mut output = Vec::new();
        run(
            &mut output,
            &mut cache,
            3,
            &[],
            None,
            Some("2025-01-15T10:30:00Z"),
        )
        .unwrap();

        let last = cache.latest().last_entry_at.unwrap();
        assert_eq!(last.to_rfc3339(), "2025-01-15T10:30:00+00:00");
        assert!(!String::from_utf8(output).unwrap().contains("Tags:"));
    }

    #[test]
    fn log_rejects_out_of_range_rating() {
        let mut cache = AggregateCache::new(MemoryStore::new(), BucketLimits::default()).unwrap();

        let mut output = Vec::new();
        let err = run(&mut output, &mut cache, 6, &[], None, None).unwrap_err();

        assert!(format!("{err:#}").contains("invalid entry"));
        assert!(output.is_empty());
        assert!(cache.store().is_empty());
    }
}
