//! Status command for a quick overview of the tracker.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use mood_core::{EntryStore, ReminderState};
use mood_db::Database;

use super::util::{format_elapsed, format_local};
use crate::Config;

/// Window used for the recent-activity line.
const RECENT_DAYS: i64 = 7;

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    config: &Config,
    now: DateTime<Utc>,
) -> Result<()> {
    writeln!(writer, "Mood tracker status")?;
    writeln!(writer, "Database: {}", config.database_path.display())?;
    writeln!(writer, "Entries: {}", db.entry_count()?)?;

    let last_entry_at = db.most_recent_entry()?.map(|e| e.timestamp);
    match last_entry_at {
        Some(last) => writeln!(
            writer,
            "Last entry: {} ({} ago)",
            format_local(last),
            format_elapsed(now.signed_duration_since(last))
        )?,
        None => writeln!(writer, "Last entry: none")?,
    }

    let recent = db.entries_in_range(now - Duration::days(RECENT_DAYS), now)?;
    if recent.is_empty() {
        writeln!(writer, "Last {RECENT_DAYS} days: no entries")?;
    } else {
        #[allow(clippy::cast_precision_loss)]
        let average = recent.iter().map(|e| f64::from(e.rating)).sum::<f64>() / recent.len() as f64;
        writeln!(
            writer,
            "Last {RECENT_DAYS} days: {} entries, average {average:.2}",
            recent.len()
        )?;
    }

    let threshold = config.reminder.threshold();
    let state = ReminderState::evaluate(last_entry_at, now, threshold);
    writeln!(
        writer,
        "Reminder: {state} (after {} without an entry)",
        format_elapsed(threshold)
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{Local, TimeZone};
    use insta::assert_snapshot;
    use mood_core::{BucketLimits, NewEntry};

    use crate::config::ReminderConfig;

    #[test]
    fn status_command_summarizes_entries() {
        let temp = tempfile::tempdir().unwrap();
        let db_path = temp.path().join("mood.db");
        let mut db = Database::open(&db_path).unwrap();

        let now = Local
            .with_ymd_and_hms(2025, 1, 20, 12, 0, 0)
            .single()
            .unwrap()
            .with_timezone(&Utc);
        for (days_ago, rating) in [(30, 1), (3, 4), (1, 3)] {
            db.insert_entry(
                NewEntry::new(rating, ["x"], None)
                    .unwrap()
                    .at(now - Duration::days(days_ago)),
            )
            .unwrap();
        }

        let config = Config {
            database_path: db_path.clone(),
            reminder: ReminderConfig::default(),
            limits: BucketLimits::default(),
        };
        let mut output = Vec::new();
        run(&mut output, &db, &config, now).unwrap();

        let output = String::from_utf8(output).unwrap();
        let output = output.replace(&db_path.display().to_string(), "[TEMP]/mood.db");
        assert_snapshot!(output, @r"
        Mood tracker status
        Database: [TEMP]/mood.db
        Entries: 3
        Last entry: 2025-01-19 12:00 (1d 0h ago)
        Last 7 days: 2 entries, average 3.50
        Reminder: due (after 18h 0m without an entry)
        ");
    }

    #[test]
    fn status_command_on_empty_database() {
        let db = Database::open_in_memory().unwrap();
        let config = Config {
            database_path: "/tmp/mood.db".into(),
            ..Config::default()
        };

        let mut output = Vec::new();
        run(&mut output, &db, &config, Utc::now()).unwrap();

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("Entries: 0\n"));
        assert!(output.contains("Last entry: none\n"));
        assert!(output.contains("Last 7 days: no entries\n"));
        assert!(output.contains("Reminder: due"));
    }
}
