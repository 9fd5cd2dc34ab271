//! Work queue trait, deliveries and error types

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while talking to the work queue
#[derive(Debug, Error)]
pub enum QueueError {
    /// The queue backend could not be opened or reached
    #[error("Queue connection error: {0}")]
    Connection(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A consumer asked for another delivery while still holding one
    #[error("Consumer {consumer} already holds unacknowledged delivery {tag}")]
    PrefetchExceeded { consumer: String, tag: DeliveryTag },

    /// Ack or reject for a delivery the queue no longer attributes to this consumer
    #[error("Unknown delivery {0}")]
    UnknownDelivery(DeliveryTag),

    #[error("Queue lock poisoned")]
    Poisoned,
}

/// Result type for queue operations
pub type QueueResult<T> = Result<T, QueueError>;

/// Identifies one delivery for acknowledgement
pub type DeliveryTag = i64;

/// A message handed to a consumer
///
/// Settle it exactly once with [`WorkQueue::ack`] or [`WorkQueue::reject`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub tag: DeliveryTag,
    pub payload: Vec<u8>,
    pub consumer: String,
    /// True if the message was handed out before and never acknowledged
    pub redelivered: bool,
}

impl Delivery {
    /// Returns the payload as text, if it is valid UTF-8
    pub fn payload_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.payload).ok()
    }
}

/// Message counts for one queue
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueDepth {
    pub ready: u64,
    pub unacked: u64,
}

impl QueueDepth {
    pub fn total(&self) -> u64 {
        self.ready + self.unacked
    }
}

/// A durable, at-least-once message queue
///
/// A delivered message stays with its consumer until it is acknowledged
/// (removed for good) or rejected. If the consumer disappears without settling
/// it, the message is delivered again and flagged `redelivered`.
#[async_trait]
pub trait WorkQueue: Send + Sync {
    /// Appends a message to the queue
    async fn publish(&self, payload: &[u8]) -> QueueResult<()>;

    /// Hands the next available message to `consumer`, if there is one
    async fn try_receive(&self, consumer: &str) -> QueueResult<Option<Delivery>>;

    /// Permanently removes a delivered message
    async fn ack(&self, delivery: &Delivery) -> QueueResult<()>;

    /// Returns a delivered message to the queue, or drops it when `requeue` is false
    async fn reject(&self, delivery: &Delivery, requeue: bool) -> QueueResult<()>;

    /// Current ready and unacknowledged message counts
    async fn depth(&self) -> QueueResult<QueueDepth>;
}
