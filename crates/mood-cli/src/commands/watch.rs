//! Watch command: periodic reminder checks until interrupted.
//!
//! Other `mood` processes write to the same database, so every tick asks the
//! cache to refresh. It recomputes only when the store has moved.

use std::future::Future;
use std::time::Duration as StdDuration;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use mood_core::{AggregateCache, EntryStore, ReminderState};

use crate::config::ReminderConfig;
use crate::notify::{DispatchOutcome, Notifier, ReminderDispatcher};

/// Refreshes the aggregates if needed and runs one reminder check.
pub fn tick<S: EntryStore, N: Notifier>(
    cache: &AggregateCache<S>,
    dispatcher: &mut ReminderDispatcher<N>,
    threshold: Duration,
    now: DateTime<Utc>,
) -> Result<DispatchOutcome> {
    let aggregates = cache.refresh()?;
    let state = ReminderState::evaluate(aggregates.last_entry_at, now, threshold);
    let outcome = dispatcher.dispatch(state, aggregates.last_entry_at, now)?;
    tracing::debug!(%state, ?outcome, "reminder check");
    Ok(outcome)
}

/// Checks every `interval` until `shutdown` resolves.
///
/// A failed check is logged and retried on the next tick.
pub async fn watch_until<S, N, F>(
    cache: &AggregateCache<S>,
    dispatcher: &mut ReminderDispatcher<N>,
    interval: StdDuration,
    threshold: Duration,
    shutdown: F,
) where
    S: EntryStore,
    N: Notifier,
    F: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            () = &mut shutdown => {
                tracing::info!("watch stopped");
                return;
            }
            _ = ticker.tick() => {
                if let Err(err) = tick(cache, dispatcher, threshold, Utc::now()) {
                    tracing::warn!(error = %format!("{err:#}"), "reminder check failed");
                }
            }
        }
    }
}

/// Runs the watch loop on a current-thread runtime until Ctrl-C.
pub fn run<S: EntryStore, N: Notifier>(
    cache: &AggregateCache<S>,
    reminder: &ReminderConfig,
    notifier: N,
) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;

    let mut dispatcher = ReminderDispatcher::new(notifier, reminder.renotify_interval());
    tracing::info!(
        interval_secs = reminder.check_interval().as_secs(),
        threshold_secs = reminder.threshold_secs,
        "watching for due reminders"
    );

    runtime.block_on(watch_until(
        cache,
        &mut dispatcher,
        reminder.check_interval(),
        reminder.threshold(),
        async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %err, "failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        },
    ));
    Ok(())
}
