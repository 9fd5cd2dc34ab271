//! WebScour main entry point
//!
//! This is the command-line interface for the WebScour crawler. One binary
//! plays both roles: `seed` publishes starting URLs, `crawl` runs a worker
//! pool. Start `crawl` in as many processes as needed against the same
//! database file.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use webscour::config::{load_config_with_hash, validate, Config};
use webscour::crawler::{crawl, seed_queue};
use webscour::ledger::open_ledger;
use webscour::output::{load_statistics, print_run_summaries, print_statistics};
use webscour::queue::SqliteQueue;
use webscour::storage::open_store;

/// WebScour: a queue-driven web crawler
///
/// Workers pull URLs from a durable queue, store each page once, and queue
/// the same-site links they find.
#[derive(Parser, Debug)]
#[command(name = "webscour")]
#[command(version = "1.0.0")]
#[command(about = "A queue-driven web crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Publish seed URLs to the work queue (defaults to the configured seeds)
    Seed {
        #[arg(value_name = "URL")]
        urls: Vec<String>,
    },

    /// Run a worker pool until Ctrl-C or SIGTERM
    Crawl {
        /// Number of workers, overriding the configuration
        #[arg(short, long)]
        workers: Option<u32>,
    },

    /// Show queue, ledger and page store statistics and exit
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    match cli.command {
        Command::Seed { urls } => handle_seed(&config, urls).await,
        Command::Crawl { workers } => handle_crawl(config, workers).await,
        Command::Stats => handle_stats(&config).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("webscour=info,warn"),
            1 => EnvFilter::new("webscour=debug,info"),
            2 => EnvFilter::new("webscour=trace,debug"),
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

/// Handles the `seed` command: publishes URLs and exits
async fn handle_seed(config: &Config, urls: Vec<String>) -> anyhow::Result<()> {
    let seeds = if urls.is_empty() {
        config.seeds.clone()
    } else {
        urls
    };
    if seeds.is_empty() {
        bail!("no seed URLs given and none configured");
    }

    let queue = SqliteQueue::from_config(&config.queue).with_context(|| {
        format!(
            "cannot open work queue at {}",
            config.queue.database_path.display()
        )
    })?;

    let sent = seed_queue(&queue, seeds.as_slice()).await?;
    println!("✓ Published {} seed URLs to {}", sent, queue.name());
    Ok(())
}

/// Handles the `crawl` command: runs the worker pool until interrupted
async fn handle_crawl(mut config: Config, workers: Option<u32>) -> anyhow::Result<()> {
    if let Some(workers) = workers {
        config.crawler.workers = workers;
        validate(&config).context("invalid --workers")?;
    }

    tracing::info!(
        "Starting {} workers on queue {:?} ({} ledger)",
        config.crawler.workers,
        config.queue.name,
        format!("{:?}", config.ledger.backend).to_lowercase()
    );

    let summaries = crawl(&config).await.context("crawl failed to start")?;
    print_run_summaries(&summaries);

    tracing::info!("Crawl stopped cleanly");
    Ok(())
}

/// Handles the `stats` command: shows statistics and exits
async fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}", config.queue.database_path.display());
    println!("Pages: {}\n", config.storage.pages_dir.display());

    let queue = SqliteQueue::from_config(&config.queue).context("cannot open work queue")?;
    let ledger = open_ledger(&config.ledger).context("cannot open visited ledger")?;
    let store = open_store(&config.storage).context("cannot open page store")?;

    let stats = load_statistics(&queue, ledger.as_ref(), &store).await?;
    print_statistics(&stats);

    Ok(())
}
