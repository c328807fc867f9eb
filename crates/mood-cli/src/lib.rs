//! Mood tracker CLI library.
//!
//! This crate provides the CLI interface for the mood tracker.

mod cli;
pub mod commands;
mod config;
pub mod notify;

pub use cli::{Cli, Commands, PeriodArgs};
pub use config::{Config, ReminderConfig};
