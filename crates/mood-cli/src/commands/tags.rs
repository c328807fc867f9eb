//! Tags command for the most used tags.

use std::io::Write;

use anyhow::Result;
use mood_core::{EntryStore, SortOrder, top_tags};

pub fn run<W: Write, S: EntryStore + ?Sized>(writer: &mut W, store: &S, top: usize) -> Result<()> {
    let entries = store.all_entries(SortOrder::Ascending)?;
    let ranked = top_tags(&entries, top);

    writeln!(writer, "TOP TAGS")?;
    writeln!(writer, "────────")?;

    if ranked.is_empty() {
        writeln!(writer, "No tags recorded.")?;
        return Ok(());
    }

    let width = ranked.iter().map(|t| t.tag.chars().count()).max().unwrap_or(0);
    for (rank, tag) in ranked.iter().enumerate() {
        writeln!(writer, "{:>2}. {:<width$}  {}", rank + 1, tag.tag, tag.count)?;
    }

    Ok(())
}
