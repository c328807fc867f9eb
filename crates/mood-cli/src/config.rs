//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::Duration;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use mood_core::BucketLimits;
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,

    /// Reminder scheduling.
    #[serde(default)]
    pub reminder: ReminderConfig,

    /// How many recent buckets `stats` shows per granularity.
    #[serde(default)]
    pub limits: BucketLimits,
}

/// Reminder settings.
///
/// Only `threshold_secs` feeds the reminder decision. The other two belong to
/// the loop that runs checks and the dispatcher that de-duplicates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderConfig {
    /// Inactivity after which a reminder is due. Default: 64800 (18 hours).
    pub threshold_secs: u64,
    /// Cadence of `mood watch`. Default: 900 (15 minutes).
    pub check_interval_secs: u64,
    /// Minimum gap between repeated reminders. Default: 21600 (6 hours).
    pub renotify_interval_secs: u64,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            threshold_secs: 18 * 60 * 60,
            check_interval_secs: 15 * 60,
            renotify_interval_secs: 6 * 60 * 60,
        }
    }
}

impl ReminderConfig {
    pub fn threshold(&self) -> Duration {
        secs(self.threshold_secs)
    }

    pub fn renotify_interval(&self) -> Duration {
        secs(self.renotify_interval_secs)
    }

    /// Check cadence, at least one second.
    pub fn check_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.check_interval_secs.max(1))
    }
}

fn secs(value: u64) -> Duration {
    let max_secs = i64::MAX / 1_000;
    Duration::seconds(i64::try_from(value).map_or(max_secs, |v| v.min(max_secs)))
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .field("reminder", &self.reminder)
            .field("limits", &self.limits)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("mood.db"),
            reminder: ReminderConfig::default(),
            limits: BucketLimits::default(),
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (MOOD_*, nested keys split on "__")
        figment = figment.merge(Env::prefixed("MOOD_").split("__"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for mood.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("mood"))
}

/// Returns the platform-specific data directory for mood.
///
/// On Linux: `~/.local/share/mood`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("mood"))
}
