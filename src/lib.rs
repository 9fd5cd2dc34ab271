//! WebScour: a queue-driven distributed web crawler
//!
//! A seed producer publishes URLs onto a durable work queue. A pool of
//! symmetric workers pulls one URL at a time, deduplicates it against a shared
//! visited ledger, fetches and stores the page, and publishes the in-scope
//! links it discovers back onto the queue.

pub mod config;
pub mod crawler;
pub mod ledger;
pub mod output;
pub mod queue;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for crawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Network-level failure (timeout, refused connection, DNS). Retryable.
    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },

    /// Any response other than 200. Terminal for that URL.
    #[error("HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Page store error: {0}")]
    Store(#[from] storage::StoreError),

    #[error("Visited ledger error: {0}")]
    Ledger(#[from] ledger::LedgerError),

    #[error("Work queue error: {0}")]
    Queue(#[from] queue::QueueError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CrawlError {
    /// Returns true if the same request may succeed when attempted again
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{seed_queue, CrawlWorker, FetchOutcome, Fetcher, ShutdownController, WorkerPool};
pub use ledger::VisitedLedger;
pub use queue::{Delivery, WorkQueue};
pub use state::{MessageState, TaskDisposition, TaskState};
pub use storage::{PageId, PageStore};
pub use url::{extract_domain, normalize_link, same_domain};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transport_errors_are_retryable() {
        let transport = CrawlError::Transport {
            url: "https://example.com/".to_string(),
            message: "connection refused".to_string(),
        };
        let status = CrawlError::HttpStatus {
            url: "https://example.com/".to_string(),
            status: 503,
        };

        assert!(transport.is_retryable());
        assert!(!status.is_retryable());
    }
}
