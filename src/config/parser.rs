use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so that workers started from different config files can
/// be told apart in the logs.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerBackend;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
seeds = ["https://example.com/start"]

[crawler]
workers = 5
max-attempts = 2
request-timeout-ms = 3000
retry-delay-ms = 200
task-delay-ms = 100

[user-agent]
crawler-name = "TestCrawler"
crawler-version = "2.1"

[queue]
database-path = "./queue.db"
name = "test_queue"
lease-timeout-secs = 60

[ledger]
backend = "file"
path = "./visited.txt"

[storage]
pages-dir = "./out"
extension = "htm"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.workers, 5);
        assert_eq!(config.crawler.max_attempts, 2);
        assert_eq!(config.user_agent.header_value(), "TestCrawler/2.1");
        assert_eq!(config.queue.name, "test_queue");
        assert_eq!(config.ledger.backend, LedgerBackend::File);
        assert_eq!(config.storage.extension, "htm");
        assert_eq!(config.seeds, vec!["https://example.com/start".to_string()]);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let file = create_temp_config("");
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.workers, 3);
        assert_eq!(config.crawler.max_attempts, 3);
        assert_eq!(config.crawler.request_timeout_ms, 5000);
        assert_eq!(config.crawler.retry_delay_ms, 1000);
        assert_eq!(config.crawler.task_delay_ms, 500);
        assert!(config.crawler.skip_visited_on_publish);
        assert_eq!(config.user_agent.header_value(), "WebScourCrawler/1.0");
        assert_eq!(config.queue.name, "url_queue");
        assert_eq!(config.ledger.backend, LedgerBackend::Sqlite);
        assert_eq!(config.storage.extension, "html");
        assert_eq!(config.seeds.len(), 1);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/webscour.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_unknown_ledger_backend_is_rejected() {
        let file = create_temp_config("[ledger]\nbackend = \"redis\"\n");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let file = create_temp_config("[crawler]\nworkers = 0\n");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }
}
