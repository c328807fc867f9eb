//! Remind command for a single reminder check.
//!
//! Each invocation starts a fresh dispatcher, so a due reminder is always
//! printed. Use `mood watch` for repeated checks with suppression.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use mood_core::{EntryStore, ReminderState};

use crate::config::ReminderConfig;
use crate::notify::{ReminderDispatcher, WriterNotifier};

/// Checks the store once and prints a reminder when one is due.
pub fn run<W: Write, S: EntryStore + ?Sized>(
    writer: &mut W,
    store: &S,
    reminder: &ReminderConfig,
    now: DateTime<Utc>,
) -> Result<ReminderState> {
    // One read, so the printed state and the message agree.
    let last_entry_at = store.most_recent_entry()?.map(|e| e.timestamp);
    let state = ReminderState::evaluate(last_entry_at, now, reminder.threshold());
    tracing::debug!(?last_entry_at, %state, "evaluated reminder");

    writeln!(writer, "Reminder: {state}")?;

    let mut dispatcher =
        ReminderDispatcher::new(WriterNotifier::new(&mut *writer), reminder.renotify_interval());
    dispatcher.dispatch(state, last_entry_at, now)?;

    Ok(state)
}
