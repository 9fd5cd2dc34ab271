//! Task state definitions for the crawl worker
//!
//! Every delivery a worker receives moves `Idle -> Processing` and ends in
//! exactly one of the settled states, after which the worker is `Idle` again.

use std::fmt;

/// Where a worker is in handling its current delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    /// Waiting for the queue to hand over a delivery
    Idle,

    /// Holding one unacknowledged delivery
    Processing,

    /// Delivery was acknowledged and removed from the queue
    Acknowledged,

    /// Delivery was rejected back to (or dropped by) the queue
    Rejected,
}

impl TaskState {
    /// Returns true if the delivery has been settled with the queue
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Acknowledged | Self::Rejected)
    }

    /// Returns true if `next` is a legal successor of this state
    pub fn can_transition_to(&self, next: TaskState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Processing)
                | (Self::Processing, Self::Acknowledged)
                | (Self::Processing, Self::Rejected)
                | (Self::Acknowledged, Self::Idle)
                | (Self::Rejected, Self::Idle)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Processing => "processing",
            Self::Acknowledged => "acknowledged",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a delivery was acknowledged
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AckReason {
    /// Page fetched, stored, and its in-scope links published
    Crawled {
        page_id: String,
        links_published: usize,
    },

    /// The ledger already held the URL (duplicate publish or redelivery)
    AlreadyVisited,

    /// Fetch ended in a terminal failure; the task is dropped
    FetchFailed { status: Option<u16> },

    /// The page could not be written to the store; the task is dropped
    StoreFailed,

    /// The ledger could not be consulted; the task is dropped
    LedgerFailed,
}

/// Final outcome of processing one delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskDisposition {
    /// Remove the delivery from the queue
    Acknowledged(AckReason),

    /// Hand the delivery back to the queue, or drop it when `requeue` is false
    Rejected { requeue: bool },
}

impl TaskDisposition {
    /// The settled task state this disposition corresponds to
    pub fn state(&self) -> TaskState {
        match self {
            Self::Acknowledged(_) => TaskState::Acknowledged,
            Self::Rejected { .. } => TaskState::Rejected,
        }
    }

    /// Returns true if a page was stored while producing this disposition
    pub fn is_crawled(&self) -> bool {
        matches!(self, Self::Acknowledged(AckReason::Crawled { .. }))
    }

    /// Returns true if the delivery was a duplicate of already-handled work
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Acknowledged(AckReason::AlreadyVisited))
    }
}
