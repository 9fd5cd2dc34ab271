//! Crawler module for queue-driven page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic and body decoding
//! - HTML link extraction
//! - The per-task worker state machine and its consume loop
//! - The worker pool and cooperative shutdown
//! - Seeding the work queue

mod decode;
mod fetcher;
mod parser;
mod pool;
mod seed;
mod shutdown;
mod worker;

pub use decode::{decode_body, DecodedBody};
pub use fetcher::{build_http_client, retry_fetch, FetchOutcome, Fetcher};
pub use parser::extract_links;
pub use pool::WorkerPool;
pub use seed::seed_queue;
pub use shutdown::ShutdownController;
pub use worker::{CrawlContext, CrawlWorker, WorkerSettings, WorkerStats};

use crate::config::Config;
use crate::ledger::open_ledger;
use crate::output::RunSummary;
use crate::queue::SqliteQueue;
use crate::storage::open_store;
use crate::CrawlError;
use std::sync::Arc;

/// Opens the queue, ledger and page store named in the configuration
///
/// Fails with [`QueueError::Connection`](crate::queue::QueueError::Connection)
/// when the queue cannot be reached.
pub fn open_context(config: &Config) -> Result<CrawlContext, CrawlError> {
    let queue = SqliteQueue::from_config(&config.queue)?;
    let ledger = open_ledger(&config.ledger)?;
    let store = open_store(&config.storage)?;
    let fetcher = Fetcher::new(config)?;

    Ok(CrawlContext {
        queue: Arc::new(queue),
        ledger,
        store: Arc::new(store),
        fetcher: Arc::new(fetcher),
    })
}

/// Runs a complete crawl operation
///
/// This is the main entry point for the `crawl` command. It will:
/// 1. Open the shared queue, ledger and page store
/// 2. Install the Ctrl-C / SIGTERM handler
/// 3. Run the worker pool until a signal arrives
/// 4. Return the per-worker summaries
pub async fn crawl(config: &Config) -> Result<Vec<RunSummary>, CrawlError> {
    let ctx = open_context(config)?;
    let pool = WorkerPool::from_config(ctx, config);

    let shutdown = ShutdownController::new();
    let listener = shutdown.listen_for_signals();

    let summaries = pool.run(shutdown.token()).await;

    listener.abort();
    Ok(summaries)
}
