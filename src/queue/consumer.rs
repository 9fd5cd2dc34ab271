//! Per-worker consumer handle with a prefetch limit of one

use crate::queue::traits::{Delivery, DeliveryTag, QueueError, QueueResult, WorkQueue};
use std::sync::Arc;
use std::time::Duration;

/// A worker's subscription to the work queue
///
/// Holds at most one unacknowledged delivery at a time. [`next`](Consumer::next)
/// waits for work indefinitely, polling the queue at a fixed interval.
pub struct Consumer {
    queue: Arc<dyn WorkQueue>,
    tag: String,
    poll_interval: Duration,
    outstanding: Option<DeliveryTag>,
}

impl Consumer {
    pub fn new(queue: Arc<dyn WorkQueue>, tag: impl Into<String>, poll_interval: Duration) -> Self {
        Self {
            queue,
            tag: tag.into(),
            poll_interval,
            outstanding: None,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Tag of the delivery this consumer has not settled yet
    pub fn outstanding(&self) -> Option<DeliveryTag> {
        self.outstanding
    }

    /// Takes the next delivery if one is ready
    pub async fn try_next(&mut self) -> QueueResult<Option<Delivery>> {
        if let Some(tag) = self.outstanding {
            return Err(QueueError::PrefetchExceeded {
                consumer: self.tag.clone(),
                tag,
            });
        }

        let delivery = self.queue.try_receive(&self.tag).await?;
        if let Some(delivery) = &delivery {
            self.outstanding = Some(delivery.tag);
        }
        Ok(delivery)
    }

    /// Waits until a delivery is available
    pub async fn next(&mut self) -> QueueResult<Delivery> {
        loop {
            if let Some(delivery) = self.try_next().await? {
                return Ok(delivery);
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Acknowledges the outstanding delivery
    ///
    /// The delivery no longer counts against the prefetch limit afterwards,
    /// even if the queue reported an error: the queue will hand it out again
    /// once its lease lapses.
    pub async fn ack(&mut self, delivery: &Delivery) -> QueueResult<()> {
        let result = self.queue.ack(delivery).await;
        self.settle(delivery);
        result
    }

    /// Rejects the outstanding delivery, optionally returning it to the queue
    pub async fn reject(&mut self, delivery: &Delivery, requeue: bool) -> QueueResult<()> {
        let result = self.queue.reject(delivery, requeue).await;
        self.settle(delivery);
        result
    }

    fn settle(&mut self, delivery: &Delivery) {
        if self.outstanding == Some(delivery.tag) {
            self.outstanding = None;
        }
    }
}
