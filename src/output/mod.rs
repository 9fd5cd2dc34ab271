//! Output module for run summaries and crawl statistics
//!
//! This module handles:
//! - Per-worker throughput summaries printed when a crawl stops
//! - Queue, ledger and page store statistics for the `stats` command

pub mod stats;
mod summary;

pub use stats::{load_statistics, print_statistics, CrawlStatistics};
pub use summary::{print_run_summaries, RunSummary};
