use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use mood_cli::commands::{distribution, history, log, remind, stats, status, tags, watch};
use mood_cli::notify::WriterNotifier;
use mood_cli::{Cli, Commands, Config};
use mood_core::AggregateCache;

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(mood_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = mood_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let mut stdout = io::stdout().lock();

    match &cli.command {
        Some(Commands::Log {
            rating,
            tags,
            notes,
            at,
        }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let mut cache = AggregateCache::new(db, config.limits)?;
            log::run(
                &mut stdout,
                &mut cache,
                *rating,
                tags,
                notes.as_deref(),
                at.as_deref(),
            )?;
        }
        Some(Commands::History { limit, json }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            history::run(&mut stdout, &db, *limit, *json)?;
        }
        Some(Commands::Stats {
            period,
            limit,
            json,
        }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let granularity = period.granularity();
            let limit = limit.unwrap_or_else(|| config.limits.for_granularity(granularity));
            stats::run(&mut stdout, &db, granularity, limit, *json)?;
        }
        Some(Commands::Distribution { json }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            distribution::run(&mut stdout, &db, *json)?;
        }
        Some(Commands::Tags { top }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            tags::run(&mut stdout, &db, *top)?;
        }
        Some(Commands::Remind) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            remind::run(&mut stdout, &db, &config.reminder, Utc::now())?;
        }
        Some(Commands::Watch) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let cache = AggregateCache::new(db, config.limits)?;
            watch::run(&cache, &config.reminder, WriterNotifier::new(io::stdout()))?;
        }
        Some(Commands::Status) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            status::run(&mut stdout, &db, &config, Utc::now())?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
