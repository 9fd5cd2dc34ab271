//! Statistics gathered from the queue, ledger and page store
//!
//! This module provides functionality for extracting and displaying the
//! state of a crawl without running any workers.

use crate::ledger::VisitedLedger;
use crate::queue::{QueueDepth, WorkQueue};
use crate::storage::PageStore;
use crate::CrawlError;

/// Crawl statistics summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Messages waiting in, or held from, the work queue
    pub queue: QueueDepth,

    /// URLs recorded in the visited ledger
    pub visited_urls: u64,

    /// Files in the page store
    pub pages_stored: u64,
}

impl CrawlStatistics {
    /// Visited URLs that did not produce a stored page (duplicates, failures, in flight)
    pub fn unstored_visits(&self) -> u64 {
        self.visited_urls.saturating_sub(self.pages_stored)
    }
}

/// Loads statistics from the crawl's shared state
pub async fn load_statistics(
    queue: &dyn WorkQueue,
    ledger: &dyn VisitedLedger,
    store: &PageStore,
) -> Result<CrawlStatistics, CrawlError> {
    let queue = queue.depth().await?;
    let visited_urls = ledger.len()?;
    let pages_stored = store.count_pages()?;

    Ok(CrawlStatistics {
        queue,
        visited_urls,
        pages_stored,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Work queue:");
    println!("  Ready: {}", stats.queue.ready);
    println!("  Unacknowledged: {}", stats.queue.unacked);
    println!();

    println!("Visited ledger:");
    println!("  URLs recorded: {}", stats.visited_urls);
    println!();

    println!("Page store:");
    println!("  Pages stored: {}", stats.pages_stored);

    let success_rate = if stats.visited_urls > 0 {
        (stats.pages_stored as f64 / stats.visited_urls as f64) * 100.0
    } else {
        0.0
    };
    println!(
        "  Stored/visited: {:.1}% ({} visited without a stored page)",
        success_rate,
        stats.unstored_visits()
    );
}
