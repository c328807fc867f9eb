//! CLI subcommand implementations.

pub mod distribution;
pub mod history;
pub mod log;
pub mod remind;
pub mod stats;
pub mod status;
pub mod tags;
pub mod util;
pub mod watch;
