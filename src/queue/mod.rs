//! Work queue: durable, at-least-once transport of crawl tasks
//!
//! Producers publish a URL as a UTF-8 payload. Each worker consumes through
//! its own [`Consumer`], holding at most one unacknowledged delivery.
//!
//! # Backends
//!
//! - `SqliteQueue`: shared by every process that opens the same database file
//! - `MemoryQueue`: single process, not durable

mod consumer;
mod memory;
mod schema;
mod sqlite;
mod traits;

pub use consumer::Consumer;
pub use memory::MemoryQueue;
pub use sqlite::SqliteQueue;
pub use traits::{Delivery, DeliveryTag, QueueDepth, QueueError, QueueResult, WorkQueue};
