//! Stats command for average ratings per period.
//!
//! This module implements `mood stats` with period options (--day, --week,
//! --month), a configurable number of periods and human-readable or JSON
//! output.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use mood_core::{Bucket, EntryStore, Granularity, SortOrder, bucketize};
use serde::Serialize;

use super::util::rating_bar;

/// Computed stats for one granularity.
#[derive(Debug, Serialize)]
pub struct StatsReport {
    pub granularity: Granularity,
    pub timezone: String,
    pub buckets: Vec<Bucket>,
}

/// Buckets every stored entry.
pub fn generate_stats<S: EntryStore + ?Sized>(
    store: &S,
    granularity: Granularity,
    limit: usize,
) -> Result<StatsReport> {
    let entries = store.all_entries(SortOrder::Ascending)?;
    let buckets = bucketize(&entries, granularity, limit);
    tracing::debug!(
        entries = entries.len(),
        buckets = buckets.len(),
        granularity = granularity.as_str(),
        "bucketed entries"
    );

    let timezone = iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string());
    Ok(StatsReport {
        granularity,
        timezone,
        buckets,
    })
}

/// Formats the human-readable stats output.
pub fn format_stats(report: &StatsReport) -> String {
    let mut output = String::new();

    let title = format!("AVERAGE MOOD BY {}", report.granularity.as_str().to_uppercase());
    writeln!(output, "{title}").unwrap();
    writeln!(output, "{}", "─".repeat(title.chars().count())).unwrap();

    if report.buckets.is_empty() {
        writeln!(output, "No entries recorded yet.").unwrap();
        writeln!(output).unwrap();
        writeln!(output, "Hint: Run 'mood log <1-5>' to record one.").unwrap();
        return output;
    }

    let label_width = report
        .buckets
        .iter()
        .map(|b| b.label.chars().count())
        .max()
        .unwrap_or(0);

    for bucket in &report.buckets {
        let noun = if bucket.count == 1 { "entry" } else { "entries" };
        writeln!(
            output,
            "{:<label_width$}  {:.2}  {}  ({} {noun})",
            bucket.label,
            bucket.average,
            rating_bar(bucket.average),
            bucket.count,
        )
        .unwrap();
    }

    output
}

/// Runs the stats command.
pub fn run<W: Write, S: EntryStore + ?Sized>(
    writer: &mut W,
    store: &S,
    granularity: Granularity,
    limit: usize,
    json: bool,
) -> Result<()> {
    let report = generate_stats(store, granularity, limit)?;

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        write!(writer, "{}", format_stats(&report))?;
    }

    Ok(())
}
