//! Crawl worker - the per-task state machine and consume loop
//!
//! For every delivery the worker:
//! 1. Decodes the payload to a URL
//! 2. Marks the URL in the visited ledger, skipping it if it was already there
//! 3. Fetches the page (retries are handled by the fetcher)
//! 4. Stores the page and publishes its same-domain links
//!
//! and only then settles the delivery with the queue. Failures after step 2
//! acknowledge and drop the task; it is never requeued.

use crate::config::Config;
use crate::crawler::fetcher::{FetchOutcome, Fetcher};
use crate::crawler::parser::extract_links;
use crate::ledger::VisitedLedger;
use crate::output::RunSummary;
use crate::queue::{Consumer, Delivery, WorkQueue};
use crate::state::{AckReason, TaskDisposition, TaskState};
use crate::storage::PageStore;
use crate::url::{parse_crawl_url, same_domain};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use url::Url;
use uuid::Uuid;

const INITIAL_QUEUE_BACKOFF: Duration = Duration::from_millis(250);
const MAX_QUEUE_BACKOFF: Duration = Duration::from_secs(30);

/// Shared handles every worker in a pool uses
#[derive(Clone)]
pub struct CrawlContext {
    pub queue: Arc<dyn WorkQueue>,
    pub ledger: Arc<dyn VisitedLedger>,
    pub store: Arc<PageStore>,
    pub fetcher: Arc<Fetcher>,
}

/// Per-worker tuning
#[derive(Debug, Clone)]
pub struct WorkerSettings {
    /// Pause after each settled task
    pub task_delay: Duration,
    /// How often an idle worker polls the queue
    pub poll_interval: Duration,
    /// Skip publishing links the ledger already holds
    pub skip_visited_on_publish: bool,
}

impl WorkerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            task_delay: config.crawler.task_delay(),
            poll_interval: config.queue.poll_interval(),
            skip_visited_on_publish: config.crawler.skip_visited_on_publish,
        }
    }
}

/// Counters a worker updates as it settles tasks
///
/// Shared with the pool so a summary is available even for a worker that was
/// aborted mid-task.
#[derive(Debug)]
pub struct WorkerStats {
    pages_crawled: AtomicU64,
    duplicates_skipped: AtomicU64,
    started: Instant,
}

impl WorkerStats {
    fn new() -> Self {
        Self {
            pages_crawled: AtomicU64::new(0),
            duplicates_skipped: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    fn record(&self, disposition: &TaskDisposition) {
        if disposition.is_crawled() {
            self.pages_crawled.fetch_add(1, Ordering::Relaxed);
        } else if disposition.is_duplicate() {
            self.duplicates_skipped.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn summary(&self, worker_id: usize) -> RunSummary {
        RunSummary {
            worker_id,
            pages_crawled: self.pages_crawled.load(Ordering::Relaxed),
            duplicates_skipped: self.duplicates_skipped.load(Ordering::Relaxed),
            elapsed: self.started.elapsed(),
        }
    }
}

/// One symmetric crawl worker
pub struct CrawlWorker {
    id: usize,
    ctx: CrawlContext,
    settings: WorkerSettings,
    stats: Arc<WorkerStats>,
    state: TaskState,
}

impl CrawlWorker {
    pub fn new(id: usize, ctx: CrawlContext, settings: WorkerSettings) -> Self {
        Self {
            id,
            ctx,
            settings,
            stats: Arc::new(WorkerStats::new()),
            state: TaskState::Idle,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn stats(&self) -> Arc<WorkerStats> {
        Arc::clone(&self.stats)
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    fn transition(&mut self, next: TaskState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal task transition {} -> {}",
            self.state,
            next
        );
        tracing::trace!("Worker {}: {} -> {}", self.id, self.state, next);
        self.state = next;
    }

    /// Handles one delivery and decides how to settle it
    ///
    /// Does not talk to the queue about `delivery` itself; the caller
    /// acknowledges or rejects according to the returned disposition.
    pub async fn process(&self, delivery: &Delivery) -> TaskDisposition {
        let url = match decode_task(delivery) {
            Ok(url) => url,
            Err(reason) => {
                tracing::warn!(
                    "Worker {} dropping delivery {}: {}",
                    self.id,
                    delivery.tag,
                    reason
                );
                return TaskDisposition::Rejected { requeue: false };
            }
        };

        match self.ctx.ledger.check_and_mark(url.as_str()) {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!("Worker {} skipping {}: already visited", self.id, url);
                return TaskDisposition::Acknowledged(AckReason::AlreadyVisited);
            }
            Err(e) => {
                tracing::error!(
                    "Worker {} dropping {}: visited ledger failed: {}",
                    self.id,
                    url,
                    e
                );
                return TaskDisposition::Acknowledged(AckReason::LedgerFailed);
            }
        }

        let body = match self.ctx.fetcher.fetch(&url).await {
            FetchOutcome::Success { body } => body,
            FetchOutcome::TerminalFailure { status, reason } => {
                tracing::warn!("Worker {} dropping {}: {}", self.id, url, reason);
                return TaskDisposition::Acknowledged(AckReason::FetchFailed { status });
            }
            FetchOutcome::RetryableFailure { reason } => {
                tracing::warn!("Worker {} dropping {}: {}", self.id, url, reason);
                return TaskDisposition::Acknowledged(AckReason::FetchFailed { status: None });
            }
        };

        let record = match self.ctx.store.save(&url, &body) {
            Ok(record) => record,
            Err(e) => {
                tracing::error!("Worker {} dropping {}: page store failed: {}", self.id, url, e);
                return TaskDisposition::Acknowledged(AckReason::StoreFailed);
            }
        };

        let links_published = self.publish_links(&url, &body).await;

        tracing::info!(
            "Worker {} crawled {} as {} ({} links queued)",
            self.id,
            url,
            record.id,
            links_published
        );

        TaskDisposition::Acknowledged(AckReason::Crawled {
            page_id: record.id.to_string(),
            links_published,
        })
    }

    /// Publishes the same-domain links of a page; returns how many were sent
    async fn publish_links(&self, page: &Url, body: &str) -> usize {
        let mut published = 0;

        for link in extract_links(body, page) {
            if !same_domain(&link, page) {
                continue;
            }

            if self.settings.skip_visited_on_publish {
                match self.ctx.ledger.contains(link.as_str()) {
                    Ok(true) => continue,
                    Ok(false) => {}
                    Err(e) => {
                        tracing::debug!("Ledger lookup for {} failed, publishing anyway: {}", link, e)
                    }
                }
            }

            match self.ctx.queue.publish(link.as_str().as_bytes()).await {
                Ok(()) => published += 1,
                Err(e) => tracing::warn!("Worker {} failed to publish {}: {}", self.id, link, e),
            }
        }

        published
    }

    /// Consumes and processes deliveries until `cancel` fires
    ///
    /// Cancellation is checked between tasks only; a task that has started
    /// runs to completion and is settled before the loop exits.
    pub async fn run(mut self, cancel: CancellationToken) -> RunSummary {
        let consumer_tag = format!("worker-{}-{}", self.id, &Uuid::new_v4().simple().to_string()[..8]);
        let mut consumer = Consumer::new(
            Arc::clone(&self.ctx.queue),
            consumer_tag,
            self.settings.poll_interval,
        );
        let mut backoff = INITIAL_QUEUE_BACKOFF;

        tracing::info!("Worker {} started as {}", self.id, consumer.tag());

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                next = consumer.next() => next,
            };

            let delivery = match next {
                Ok(delivery) => {
                    backoff = INITIAL_QUEUE_BACKOFF;
                    delivery
                }
                Err(e) => {
                    tracing::error!(
                        "Worker {} queue error: {}; retrying in {:?}",
                        self.id,
                        e,
                        backoff
                    );
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(backoff) => {}
                    }
                    backoff = (backoff * 2).min(MAX_QUEUE_BACKOFF);
                    continue;
                }
            };

            if delivery.redelivered {
                tracing::debug!("Worker {} got redelivered task {}", self.id, delivery.tag);
            }

            self.transition(TaskState::Processing);
            let disposition = self.process(&delivery).await;

            let settled = match &disposition {
                TaskDisposition::Acknowledged(_) => consumer.ack(&delivery).await,
                TaskDisposition::Rejected { requeue } => consumer.reject(&delivery, *requeue).await,
            };
            if let Err(e) = settled {
                tracing::warn!(
                    "Worker {} could not settle delivery {}: {}",
                    self.id,
                    delivery.tag,
                    e
                );
            }

            self.transition(disposition.state());
            self.stats.record(&disposition);
            self.transition(TaskState::Idle);

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.settings.task_delay) => {}
            }
        }

        let summary = self.stats.summary(self.id);
        tracing::info!("Worker {} stopped: {}", self.id, summary);
        summary
    }
}

fn decode_task(delivery: &Delivery) -> Result<Url, String> {
    let raw = delivery
        .payload_str()
        .ok_or_else(|| "payload is not valid UTF-8".to_string())?;
    parse_crawl_url(raw).map_err(|e| format!("{:?} is not a crawlable URL: {}", raw, e))
}
