//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `TaskState`: per-delivery worker state machine (idle, processing, acknowledged, rejected)
//! - `TaskDisposition`: how a processed delivery is settled with the queue, and why
//! - `MessageState`: where a message sits inside the durable queue

mod message_state;
mod task_state;

// Re-export main types
pub use message_state::MessageState;
pub use task_state::{AckReason, TaskDisposition, TaskState};
