use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for WebScour
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    /// URLs published by the `seed` command when none are given on the command line
    #[serde(default = "default_seeds")]
    pub seeds: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig::default(),
            user_agent: UserAgentConfig::default(),
            queue: QueueConfig::default(),
            ledger: LedgerConfig::default(),
            storage: StorageConfig::default(),
            seeds: default_seeds(),
        }
    }
}

/// Worker pool and fetch policy configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Number of workers in the pool
    #[serde(default = "default_workers")]
    pub workers: u32,

    /// Fetch attempts per URL before giving up on transport errors
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Per-request timeout (milliseconds)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Delay between fetch attempts (milliseconds)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Delay after each processed task (milliseconds)
    #[serde(default = "default_task_delay_ms")]
    pub task_delay_ms: u64,

    /// How long shutdown waits for in-flight tasks before aborting workers (milliseconds)
    #[serde(default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,

    /// Skip publishing links the ledger already holds
    #[serde(default = "default_true")]
    pub skip_visited_on_publish: bool,
}

impl CrawlerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn task_delay(&self) -> Duration {
        Duration::from_millis(self.task_delay_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }

    /// Longest a single task can take when every fetch attempt times out
    ///
    /// `None` when the configured values overflow.
    pub fn worst_case_task(&self) -> Option<Duration> {
        let millis = self
            .request_timeout_ms
            .checked_add(self.retry_delay_ms)?
            .checked_mul(u64::from(self.max_attempts))?
            .checked_add(self.task_delay_ms)?;
        Some(Duration::from_millis(millis))
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            max_attempts: default_max_attempts(),
            request_timeout_ms: default_request_timeout_ms(),
            retry_delay_ms: default_retry_delay_ms(),
            task_delay_ms: default_task_delay_ms(),
            shutdown_grace_ms: default_shutdown_grace_ms(),
            skip_visited_on_publish: true,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(default = "default_crawler_version")]
    pub crawler_version: String,
}

impl UserAgentConfig {
    /// Header value sent with every request, e.g. `WebScourCrawler/1.0`
    pub fn header_value(&self) -> String {
        format!("{}/{}", self.crawler_name, self.crawler_version)
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
        }
    }
}

/// Work queue configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct QueueConfig {
    /// SQLite file backing the durable queue
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Queue name; several crawls can share one database under different names
    #[serde(default = "default_queue_name")]
    pub name: String,

    /// How long a delivery stays invisible to other consumers before it is redelivered
    #[serde(default = "default_lease_timeout_secs")]
    pub lease_timeout_secs: u64,

    /// How often an idle consumer polls for new deliveries (milliseconds)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl QueueConfig {
    pub fn lease_timeout(&self) -> Duration {
        Duration::from_secs(self.lease_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            name: default_queue_name(),
            lease_timeout_secs: default_lease_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

/// Which visited-ledger implementation to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerBackend {
    /// Table in a SQLite file; safe across processes
    Sqlite,
    /// Append-only text file, one URL per line, locked per operation
    File,
    /// Process memory only
    Memory,
}

/// Visited ledger configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    #[serde(default = "default_ledger_backend")]
    pub backend: LedgerBackend,

    /// Database file for `sqlite`, text file for `file`, ignored for `memory`
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            backend: default_ledger_backend(),
            path: default_database_path(),
        }
    }
}

/// Page store configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StorageConfig {
    /// Directory receiving one file per crawled page
    #[serde(default = "default_pages_dir")]
    pub pages_dir: PathBuf,

    /// File extension for stored pages
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            pages_dir: default_pages_dir(),
            extension: default_extension(),
        }
    }
}

fn default_seeds() -> Vec<String> {
    vec!["https://en.wikipedia.org/wiki/Infosys".to_string()]
}

fn default_workers() -> u32 {
    3
}

fn default_max_attempts() -> u32 {
    3
}

fn default_request_timeout_ms() -> u64 {
    5_000
}

fn default_retry_delay_ms() -> u64 {
    1_000
}

fn default_task_delay_ms() -> u64 {
    500
}

fn default_shutdown_grace_ms() -> u64 {
    10_000
}

fn default_true() -> bool {
    true
}

fn default_crawler_name() -> String {
    "WebScourCrawler".to_string()
}

fn default_crawler_version() -> String {
    "1.0".to_string()
}

fn default_database_path() -> PathBuf {
    PathBuf::from("./webscour.db")
}

fn default_queue_name() -> String {
    "url_queue".to_string()
}

fn default_lease_timeout_secs() -> u64 {
    120
}

fn default_poll_interval_ms() -> u64 {
    250
}

fn default_ledger_backend() -> LedgerBackend {
    LedgerBackend::Sqlite
}

fn default_pages_dir() -> PathBuf {
    PathBuf::from("./pages")
}

fn default_extension() -> String {
    "html".to_string()
}
