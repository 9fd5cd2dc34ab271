use crate::config::types::{
    Config, CrawlerConfig, LedgerBackend, LedgerConfig, QueueConfig, StorageConfig,
    UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

/// Longest accepted lease (one week)
const MAX_LEASE_TIMEOUT_SECS: u64 = 7 * 24 * 60 * 60;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_queue_config(&config.queue, &config.crawler)?;
    validate_ledger_config(&config.ledger)?;
    validate_storage_config(&config.storage)?;
    validate_seeds(&config.seeds)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.workers < 1 || config.workers > 64 {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and 64, got {}",
            config.workers
        )));
    }

    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max-attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if config.request_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "request-timeout-ms must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.is_empty() || config.crawler_version.contains(char::is_whitespace) {
        return Err(ConfigError::Validation(format!(
            "crawler-version must be a non-empty token, got '{}'",
            config.crawler_version
        )));
    }

    Ok(())
}

/// Validates queue configuration
///
/// The lease must outlive the slowest possible task, otherwise a healthy
/// worker's delivery would be handed to a second worker mid-fetch.
fn validate_queue_config(queue: &QueueConfig, crawler: &CrawlerConfig) -> Result<(), ConfigError> {
    if queue.database_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "queue database-path cannot be empty".to_string(),
        ));
    }

    if queue.name.is_empty() {
        return Err(ConfigError::Validation(
            "queue name cannot be empty".to_string(),
        ));
    }

    if queue.poll_interval_ms == 0 {
        return Err(ConfigError::Validation(
            "poll-interval-ms must be greater than 0".to_string(),
        ));
    }

    if queue.lease_timeout_secs > MAX_LEASE_TIMEOUT_SECS {
        return Err(ConfigError::Validation(format!(
            "lease-timeout-secs must be at most {}, got {}",
            MAX_LEASE_TIMEOUT_SECS, queue.lease_timeout_secs
        )));
    }

    let worst_case = crawler.worst_case_task().ok_or_else(|| {
        ConfigError::Validation(
            "request-timeout-ms, retry-delay-ms, task-delay-ms and max-attempts are too large"
                .to_string(),
        )
    })?;
    if queue.lease_timeout() <= worst_case {
        return Err(ConfigError::Validation(format!(
            "lease-timeout-secs ({}s) must exceed the longest possible task ({:.1}s)",
            queue.lease_timeout_secs,
            worst_case.as_secs_f64()
        )));
    }

    Ok(())
}

/// Validates ledger configuration
fn validate_ledger_config(config: &LedgerConfig) -> Result<(), ConfigError> {
    if config.backend != LedgerBackend::Memory && config.path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "ledger path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates page store configuration
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.pages_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "pages-dir cannot be empty".to_string(),
        ));
    }

    if config.extension.is_empty() || !config.extension.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(ConfigError::Validation(format!(
            "extension must be non-empty and alphanumeric, got '{}'",
            config.extension
        )));
    }

    Ok(())
}

/// Validates seed URLs
fn validate_seeds(seeds: &[String]) -> Result<(), ConfigError> {
    for seed in seeds {
        let url = Url::parse(seed)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "Seed URL '{}' must use http or https",
                seed
            )));
        }
    }

    Ok(())
}
