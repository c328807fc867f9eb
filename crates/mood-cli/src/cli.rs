//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use mood_core::Granularity;

/// Daily mood tracker.
///
/// Records how your day went, summarizes ratings by day, week and month,
/// and reminds you when you have not checked in for a while.
#[derive(Debug, Parser)]
#[command(name = "mood", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Record a mood entry.
    Log {
        /// Rating from 1 (very bad) to 5 (very good).
        #[arg(allow_negative_numbers = true)]
        rating: i64,

        /// Tag for the entry (activity, place). Repeatable.
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Free-form notes.
        #[arg(short, long)]
        notes: Option<String>,

        /// When the entry happened (ISO 8601 or e.g. "2 hours ago"). Defaults to now.
        #[arg(long)]
        at: Option<String>,
    },

    /// List recorded entries, most recent first.
    History {
        /// Maximum number of entries to show.
        #[arg(long, default_value_t = 20)]
        limit: usize,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show average ratings per day, week or month.
    Stats {
        #[command(flatten)]
        period: PeriodArgs,

        /// Number of most recent periods to show (defaults to the configured limit).
        #[arg(long)]
        limit: Option<usize>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show how often each rating was picked.
    Distribution {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the most used tags.
    Tags {
        /// Number of tags to show.
        #[arg(long, default_value_t = 5)]
        top: usize,
    },

    /// Check once whether a reminder is due and send it if so.
    Remind,

    /// Keep checking for due reminders until interrupted.
    Watch,

    /// Show tracking status.
    Status,
}

/// Bucket width for `stats`.
#[derive(Debug, Clone, Copy, Args)]
#[group(multiple = false)]
pub struct PeriodArgs {
    /// Average per day (default).
    #[arg(long)]
    pub day: bool,

    /// Average per ISO week.
    #[arg(long)]
    pub week: bool,

    /// Average per month.
    #[arg(long)]
    pub month: bool,
}

impl PeriodArgs {
    /// Selected granularity, days when none is given.
    pub const fn granularity(self) -> Granularity {
        if self.week {
            Granularity::Week
        } else if self.month {
            Granularity::Month
        } else {
            Granularity::Day
        }
    }
}
