//! In-process work queue
//!
//! Same delivery contract as the SQLite queue, without durability. Used by the
//! tests and by single-process experiments.

use crate::queue::traits::{Delivery, DeliveryTag, QueueDepth, QueueError, QueueResult, WorkQueue};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

struct QueuedMessage {
    tag: DeliveryTag,
    payload: Vec<u8>,
    redelivered: bool,
}

#[derive(Default)]
struct MemoryQueueState {
    ready: VecDeque<QueuedMessage>,
    unacked: HashMap<DeliveryTag, Delivery>,
    next_tag: DeliveryTag,
}

/// Work queue held in process memory
#[derive(Default)]
pub struct MemoryQueue {
    state: Mutex<MemoryQueueState>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every delivery held by `consumer` to the front of the queue
    ///
    /// This is what a broker does when a consumer's channel dies. Returns the
    /// number of messages requeued.
    pub fn disconnect(&self, consumer: &str) -> QueueResult<usize> {
        let mut state = self.lock()?;

        let mut orphaned: Vec<Delivery> = state
            .unacked
            .values()
            .filter(|d| d.consumer == consumer)
            .cloned()
            .collect();
        orphaned.sort_by_key(|d| d.tag);

        for delivery in orphaned.iter().rev() {
            state.unacked.remove(&delivery.tag);
            state.ready.push_front(QueuedMessage {
                tag: delivery.tag,
                payload: delivery.payload.clone(),
                redelivered: true,
            });
        }

        if !orphaned.is_empty() {
            tracing::debug!(
                "Requeued {} unacknowledged deliveries from {}",
                orphaned.len(),
                consumer
            );
        }
        Ok(orphaned.len())
    }

    fn lock(&self) -> QueueResult<MutexGuard<'_, MemoryQueueState>> {
        self.state.lock().map_err(|_| QueueError::Poisoned)
    }

    fn take_unacked(
        state: &mut MemoryQueueState,
        delivery: &Delivery,
    ) -> QueueResult<Delivery> {
        match state.unacked.get(&delivery.tag) {
            Some(held) if held.consumer == delivery.consumer => state
                .unacked
                .remove(&delivery.tag)
                .ok_or(QueueError::UnknownDelivery(delivery.tag)),
            _ => Err(QueueError::UnknownDelivery(delivery.tag)),
        }
    }
}

#[async_trait]
impl WorkQueue for MemoryQueue {
    async fn publish(&self, payload: &[u8]) -> QueueResult<()> {
        let mut state = self.lock()?;
        state.next_tag += 1;
        let tag = state.next_tag;
        state.ready.push_back(QueuedMessage {
            tag,
            payload: payload.to_vec(),
            redelivered: false,
        });
        Ok(())
    }

    async fn try_receive(&self, consumer: &str) -> QueueResult<Option<Delivery>> {
        let mut state = self.lock()?;
        let Some(message) = state.ready.pop_front() else {
            return Ok(None);
        };

        let delivery = Delivery {
            tag: message.tag,
            payload: message.payload,
            consumer: consumer.to_string(),
            redelivered: message.redelivered,
        };
        state.unacked.insert(delivery.tag, delivery.clone());
        Ok(Some(delivery))
    }

    async fn ack(&self, delivery: &Delivery) -> QueueResult<()> {
        let mut state = self.lock()?;
        Self::take_unacked(&mut state, delivery)?;
        Ok(())
    }

    async fn reject(&self, delivery: &Delivery, requeue: bool) -> QueueResult<()> {
        let mut state = self.lock()?;
        let held = Self::take_unacked(&mut state, delivery)?;

        if requeue {
            state.ready.push_back(QueuedMessage {
                tag: held.tag,
                payload: held.payload,
                redelivered: true,
            });
        }
        Ok(())
    }

    async fn depth(&self) -> QueueResult<QueueDepth> {
        let state = self.lock()?;
        Ok(QueueDepth {
            ready: state.ready.len() as u64,
            unacked: state.unacked.len() as u64,
        })
    }
}
