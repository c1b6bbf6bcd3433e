//! Bisnis Crawler main entry point
//!
//! `standard` crawls the homepage recursively on a fixed interval;
//! `backtrack` walks the index over a historical date range once.

use anyhow::Context;
use bisnis_crawler::config::{load_config_with_hash, validate, Config};
use bisnis_crawler::crawler::{run_backtrack, run_standard_once, Coordinator, Scheduler};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Bisnis Crawler: harvests news articles as JSON batches
#[derive(Parser, Debug)]
#[command(name = "bisnis-crawler")]
#[command(version)]
#[command(about = "Harvests bisnis.com articles into JSON batches", long_about = None)]
struct Cli {
    /// Path to an optional TOML configuration file
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    /// Number of concurrent article fetches
    #[arg(short, long, global = true)]
    workers: Option<u32>,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Crawl the homepage recursively, repeating on a fixed interval
    Standard {
        /// Maximum link depth from the homepage
        #[arg(long)]
        max_depth: Option<u32>,

        /// Minutes between crawls
        #[arg(long)]
        interval: Option<u64>,

        /// Run a single crawl and exit
        #[arg(long)]
        once: bool,
    },

    /// Walk the date × category index over a date range
    Backtrack {
        /// First day to crawl (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        start: NaiveDate,

        /// Last day to crawl, inclusive (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        end: NaiveDate,

        /// Output JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD, got '{}': {}", value, e))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = load_configuration(cli.config.as_deref())?;
    if let Some(workers) = cli.workers {
        config.crawler.max_workers = workers;
    }

    match cli.mode {
        Mode::Standard {
            max_depth,
            interval,
            once,
        } => {
            if let Some(depth) = max_depth {
                config.crawler.max_depth = depth;
            }
            if let Some(minutes) = interval {
                config.schedule.interval_minutes = minutes;
            }
            validate(&config)?;
            handle_standard(config, once).await
        }
        Mode::Backtrack { start, end, output } => {
            validate(&config)?;
            let output =
                output.unwrap_or_else(|| PathBuf::from(&config.output.backtrack_path));
            handle_backtrack(config, start, end, output).await
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("bisnis_crawler=info,warn"),
            1 => EnvFilter::new("bisnis_crawler=debug,info"),
            2 => EnvFilter::new("bisnis_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn load_configuration(path: Option<&std::path::Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok(config)
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Ok(Config::default())
        }
    }
}

/// Runs standard mode: immediately, then every interval
async fn handle_standard(config: Config, once: bool) -> anyhow::Result<()> {
    let max_depth = config.crawler.max_depth;
    let interval = Duration::from_secs(config.schedule.interval_minutes * 60);
    let coordinator = Coordinator::new(config)?;

    if once {
        run_standard_once(&coordinator, max_depth).await?;
        return Ok(());
    }

    tracing::info!(
        "Running recursive crawler every {} minute(s)",
        interval.as_secs() / 60
    );

    let mut scheduler = Scheduler::new(interval);
    scheduler
        .run(
            move || {
                let coordinator = coordinator.clone();
                async move {
                    if let Err(e) = run_standard_once(&coordinator, max_depth).await {
                        tracing::error!("Scheduled crawl failed: {}", e);
                    }
                }
            },
            None,
        )
        .await;

    Ok(())
}

/// Runs backtrack mode once and writes the batch
async fn handle_backtrack(
    config: Config,
    start: NaiveDate,
    end: NaiveDate,
    output: PathBuf,
) -> anyhow::Result<()> {
    tracing::info!(
        "Categories: {}, output: {}",
        config.site.categories.len(),
        output.display()
    );

    let coordinator = Coordinator::new(config)?;
    let saved = run_backtrack(&coordinator, start, end, &output).await?;
    tracing::info!("Backtrack complete: {} articles", saved);
    Ok(())
}
