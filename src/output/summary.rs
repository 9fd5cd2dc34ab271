//! Per-worker run summaries printed at shutdown

use std::fmt;
use std::time::Duration;

/// Throughput counters of one worker for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub worker_id: usize,
    pub pages_crawled: u64,
    pub duplicates_skipped: u64,
    pub elapsed: Duration,
}

impl RunSummary {
    /// Average wall time per crawled page, if any page was crawled
    pub fn average_per_page(&self) -> Option<Duration> {
        if self.pages_crawled == 0 {
            return None;
        }
        u32::try_from(self.pages_crawled)
            .ok()
            .map(|pages| self.elapsed / pages)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Worker {}: {} pages crawled in {:.2}s",
            self.worker_id,
            self.pages_crawled,
            self.elapsed.as_secs_f64()
        )?;

        if let Some(avg) = self.average_per_page() {
            write!(f, ", {:.2}s per page", avg.as_secs_f64())?;
        }

        write!(f, ", {} duplicate deliveries skipped", self.duplicates_skipped)
    }
}

/// Prints one line per worker followed by the pool total
pub fn print_run_summaries(summaries: &[RunSummary]) {
    println!("\n=== Run Summary ===");
    for summary in summaries {
        println!("{}", summary);
    }

    let pages: u64 = summaries.iter().map(|s| s.pages_crawled).sum();
    let duplicates: u64 = summaries.iter().map(|s| s.duplicates_skipped).sum();
    println!(
        "Total: {} pages crawled by {} workers, {} duplicates skipped",
        pages,
        summaries.len(),
        duplicates
    );
}
