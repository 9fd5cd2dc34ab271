//! Worker pool
//!
//! Runs N symmetric workers as tokio tasks. Workers share nothing but the
//! queue, the ledger and the page store handed in through [`CrawlContext`].

use crate::config::Config;
use crate::crawler::worker::{CrawlContext, CrawlWorker, WorkerSettings, WorkerStats};
use crate::output::RunSummary;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// A fixed-size pool of crawl workers
pub struct WorkerPool {
    ctx: CrawlContext,
    settings: WorkerSettings,
    workers: usize,
    shutdown_grace: Duration,
}

impl WorkerPool {
    pub fn new(
        ctx: CrawlContext,
        settings: WorkerSettings,
        workers: usize,
        shutdown_grace: Duration,
    ) -> Self {
        Self {
            ctx,
            settings,
            workers: workers.max(1),
            shutdown_grace,
        }
    }

    pub fn from_config(ctx: CrawlContext, config: &Config) -> Self {
        Self::new(
            ctx,
            WorkerSettings::from_config(config),
            config.crawler.workers as usize,
            config.crawler.shutdown_grace(),
        )
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Runs the pool until `cancel` fires, then returns one summary per worker
    ///
    /// After cancellation workers get `shutdown_grace` to settle the task they
    /// hold. Whatever is still running after that is aborted; its delivery was
    /// never acknowledged, so the queue hands it out again later.
    pub async fn run(&self, cancel: CancellationToken) -> Vec<RunSummary> {
        let mut set = JoinSet::new();
        let mut stats: Vec<(usize, Arc<WorkerStats>)> = Vec::with_capacity(self.workers);

        for id in 1..=self.workers {
            let worker = CrawlWorker::new(id, self.ctx.clone(), self.settings.clone());
            stats.push((id, worker.stats()));
            set.spawn(worker.run(cancel.child_token()));
        }

        tracing::info!("Started {} workers", self.workers);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                joined = set.join_next() => match joined {
                    Some(Ok(summary)) => {
                        tracing::warn!("Worker {} exited before shutdown", summary.worker_id)
                    }
                    Some(Err(e)) => tracing::error!("Worker task failed: {}", e),
                    None => {
                        tracing::error!("All workers exited before shutdown");
                        break;
                    }
                },
            }
        }

        tracing::info!(
            "Shutdown requested; waiting up to {:?} for in-flight tasks",
            self.shutdown_grace
        );

        let drained = tokio::time::timeout(self.shutdown_grace, async {
            while let Some(joined) = set.join_next().await {
                if let Err(e) = joined {
                    tracing::error!("Worker task failed: {}", e);
                }
            }
        })
        .await;

        if drained.is_err() {
            tracing::warn!(
                "{} workers still busy after {:?}; aborting them",
                set.len(),
                self.shutdown_grace
            );
            set.abort_all();
            while set.join_next().await.is_some() {}
        }

        stats
            .iter()
            .map(|(id, worker_stats)| worker_stats.summary(*id))
            .collect()
    }
}
