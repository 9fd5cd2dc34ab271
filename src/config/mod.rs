//! Configuration module for WebScour
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key is optional; omitted keys fall back to the crawler's standard
//! constants (3 workers, 3 fetch attempts, 5s timeout, 1s retry delay, 0.5s
//! delay between tasks).
//!
//! # Example
//!
//! ```no_run
//! use webscour::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("webscour.toml")).unwrap();
//! println!("Pool size: {}", config.crawler.workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, LedgerBackend, LedgerConfig, QueueConfig, StorageConfig,
    UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
