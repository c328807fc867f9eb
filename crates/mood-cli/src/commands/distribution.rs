//! Distribution command for rating frequencies.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use mood_core::{Distribution, EntryStore, Rating, SortOrder, distribution};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct DistributionJson<'a> {
    total: usize,
    counts: &'a Distribution,
}

/// Formats every rating level, highest first, including unused ones.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_distribution(dist: &Distribution) -> String {
    let mut output = String::new();

    let title = format!("MOOD DISTRIBUTION ({} entries)", dist.total());
    writeln!(output, "{title}").unwrap();
    writeln!(output, "{}", "─".repeat(title.chars().count())).unwrap();

    for rating in Rating::all().rev() {
        let share = dist.share(rating);
        let filled = (share * 20.0).round() as usize;
        let line = format!(
            "{} {} {:<9}  {:>3}  {:>5.1}%  {}",
            rating,
            rating.emoji(),
            rating.label(),
            dist.count(rating),
            share * 100.0,
            "█".repeat(filled)
        );
        writeln!(output, "{}", line.trim_end()).unwrap();
    }

    output
}

/// Runs the distribution command.
pub fn run<W: Write, S: EntryStore + ?Sized>(writer: &mut W, store: &S, json: bool) -> Result<()> {
    let entries = store.all_entries(SortOrder::Ascending)?;
    let dist = distribution(&entries);

    if json {
        let payload = DistributionJson {
            total: dist.total(),
            counts: &dist,
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&payload)?)?;
    } else {
        write!(writer, "{}", format_distribution(&dist))?;
    }

    Ok(())
}
