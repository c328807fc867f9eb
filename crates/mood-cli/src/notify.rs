//! Reminder delivery.
//!
//! The core only decides whether a reminder is due. Delivery and the
//! "don't nag twice" policy live here: [`ReminderDispatcher`] sends on the
//! first due check, then at most once per re-notify interval for as long as
//! the reminder stays due, and re-arms when a new entry makes it not due.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use mood_core::ReminderState;

use crate::commands::util::format_elapsed;

/// A reminder ready to be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub title: String,
    pub body: String,
}

impl Reminder {
    /// Builds the message for a due reminder.
    pub fn new(last_entry_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        let body = match last_entry_at {
            Some(last) => format!(
                "You haven't logged your mood in {}. Take a minute!",
                format_elapsed(now.signed_duration_since(last))
            ),
            None => "You haven't logged your mood yet. Take a minute!".to_string(),
        };
        Self {
            title: "Mood check-in".to_string(),
            body,
        }
    }
}

/// Delivers reminders to the user.
pub trait Notifier {
    fn notify(&mut self, reminder: &Reminder) -> Result<()>;
}

/// Writes reminders to a terminal or any other writer.
pub struct WriterNotifier<W> {
    writer: W,
}

impl<W: Write> WriterNotifier<W> {
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Notifier for WriterNotifier<W> {
    fn notify(&mut self, reminder: &Reminder) -> Result<()> {
        writeln!(self.writer, "🔔 {}: {}", reminder.title, reminder.body)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// What the dispatcher did with a check result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Sent,
    Suppressed,
    NotDue,
}

/// Sends due reminders through a [`Notifier`], suppressing repeats.
pub struct ReminderDispatcher<N> {
    notifier: N,
    renotify_interval: Duration,
    last_sent_at: Option<DateTime<Utc>>,
}

impl<N: Notifier> ReminderDispatcher<N> {
    pub const fn new(notifier: N, renotify_interval: Duration) -> Self {
        Self {
            notifier,
            renotify_interval,
            last_sent_at: None,
        }
    }

    /// Acts on one reminder check.
    pub fn dispatch(
        &mut self,
        state: ReminderState,
        last_entry_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<DispatchOutcome> {
        if !state.is_due() {
            self.last_sent_at = None;
            return Ok(DispatchOutcome::NotDue);
        }

        let recently_sent = self
            .last_sent_at
            .is_some_and(|sent| now.signed_duration_since(sent) < self.renotify_interval);
        if recently_sent {
            tracing::debug!(last_sent_at = ?self.last_sent_at, "reminder suppressed");
            return Ok(DispatchOutcome::Suppressed);
        }

        self.notifier.notify(&Reminder::new(last_entry_at, now))?;
        self.last_sent_at = Some(now);
        tracing::info!(?last_entry_at, "reminder sent");
        Ok(DispatchOutcome::Sent)
    }

    pub const fn notifier(&self) -> &N {
        &self.notifier
    }
}
