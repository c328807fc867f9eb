//! History command for listing recent entries.

use std::io::Write;

use anyhow::Result;
use mood_core::{Entry, EntryStore, SortOrder};

use super::util::format_local;

/// Formats one entry as a single line.
fn format_entry(entry: &Entry) -> String {
    let mut line = format!(
        "{}  {} {} {:<9}",
        format_local(entry.timestamp),
        entry.rating,
        entry.rating.emoji(),
        entry.rating.label()
    );
    if !entry.tags.is_empty() {
        let tags: Vec<&str> = entry.tags.iter().map(String::as_str).collect();
        line.push_str(&format!("  [{}]", tags.join(", ")));
    }
    if let Some(notes) = &entry.notes {
        line.push_str(&format!("  {notes}"));
    }
    line.trim_end().to_string()
}

/// Lists up to `limit` entries, most recent first.
pub fn run<W: Write, S: EntryStore + ?Sized>(
    writer: &mut W,
    store: &S,
    limit: usize,
    json: bool,
) -> Result<()> {
    let mut entries = store.all_entries(SortOrder::Descending)?;
    entries.truncate(limit);

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&entries)?)?;
        return Ok(());
    }

    if entries.is_empty() {
        writeln!(writer, "No entries recorded yet.")?;
        return Ok(());
    }

    for entry in &entries {
        writeln!(writer, "{}", format_entry(entry))?;
    }

    Ok(())
}
