//! HTTP fetcher
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the crawler's user agent and timeout
//! - GET requests and response decoding
//! - Retry logic for transport failures
//! - Classifying every attempt as success, retryable or terminal
//!
//! | Condition | Action |
//! |-----------|--------|
//! | HTTP 200 | Success |
//! | Any other status | Terminal on the first attempt |
//! | Timeout, refused connection, DNS, body read error | Retry up to `max-attempts`, fixed delay |
//! | Redirect loop or chain > 10 | Terminal |

use crate::config::Config;
use crate::crawler::decode::decode_body;
use crate::CrawlError;
use reqwest::{header::CONTENT_TYPE, redirect::Policy, Client, StatusCode};
use std::future::Future;
use std::time::Duration;
use url::Url;

/// Result of fetching a URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The server answered 200 with this decoded body
    Success { body: String },

    /// The attempt failed in a way that may not repeat. Only seen between
    /// attempts; [`Fetcher::fetch`] never returns it.
    RetryableFailure { reason: String },

    /// Fetching this URL will not succeed in this run
    TerminalFailure { status: Option<u16>, reason: String },
}

impl FetchOutcome {
    fn from_error(error: &CrawlError) -> Self {
        match error {
            CrawlError::Transport { .. } => Self::RetryableFailure {
                reason: error.to_string(),
            },
            CrawlError::HttpStatus { status, .. } => Self::TerminalFailure {
                status: Some(*status),
                reason: error.to_string(),
            },
            other => Self::TerminalFailure {
                status: None,
                reason: other.to_string(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Builds an HTTP client with proper configuration
///
/// User-Agent is `<crawler-name>/<crawler-version>`; every request is bounded
/// by the configured timeout.
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.header_value())
        .timeout(config.crawler.request_timeout())
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Runs `attempt` until it succeeds, fails terminally, or `max_attempts` is used up
///
/// `attempt` receives the 1-based attempt number. Transport errors are retried
/// after `delay`; every other error ends the loop at once.
pub async fn retry_fetch<F, Fut>(max_attempts: u32, delay: Duration, mut attempt: F) -> FetchOutcome
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<String, CrawlError>>,
{
    let max_attempts = max_attempts.max(1);
    let mut last_reason = String::new();

    for n in 1..=max_attempts {
        match attempt(n).await {
            Ok(body) => return FetchOutcome::Success { body },
            Err(e) => match FetchOutcome::from_error(&e) {
                FetchOutcome::RetryableFailure { reason } => {
                    tracing::warn!("Attempt {}/{} failed: {}", n, max_attempts, reason);
                    last_reason = reason;
                    if n < max_attempts {
                        tokio::time::sleep(delay).await;
                    }
                }
                terminal => return terminal,
            },
        }
    }

    FetchOutcome::TerminalFailure {
        status: None,
        reason: format!("gave up after {} attempts: {}", max_attempts, last_reason),
    }
}

/// HTTP client plus the retry policy applied to every fetch
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    max_attempts: u32,
    retry_delay: Duration,
}

impl Fetcher {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(
            build_http_client(config)?,
            config.crawler.max_attempts,
            config.crawler.retry_delay(),
        ))
    }

    pub fn with_client(client: Client, max_attempts: u32, retry_delay: Duration) -> Self {
        Self {
            client,
            max_attempts,
            retry_delay,
        }
    }

    /// Fetches `url`, retrying transport failures
    pub async fn fetch(&self, url: &Url) -> FetchOutcome {
        retry_fetch(self.max_attempts, self.retry_delay, move |n| {
            tracing::debug!("GET {} (attempt {})", url, n);
            self.fetch_once(url)
        })
        .await
    }

    /// Performs a single GET and decodes the body
    pub async fn fetch_once(&self, url: &Url) -> Result<String, CrawlError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_request_error(url, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(CrawlError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let bytes = response
            .bytes()
            .await
            .map_err(|e| classify_request_error(url, e))?;

        let decoded = decode_body(&bytes, content_type.as_deref());
        if decoded.lossy {
            tracing::debug!(
                "Replaced malformed {} sequences in body of {}",
                decoded.encoding,
                url
            );
        }
        Ok(decoded.text)
    }
}

fn classify_request_error(url: &Url, error: reqwest::Error) -> CrawlError {
    // Redirect and builder errors repeat on every attempt
    if error.is_redirect() || error.is_builder() {
        return CrawlError::Reqwest(error);
    }

    let message = if error.is_timeout() {
        "request timed out".to_string()
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else {
        error.to_string()
    };

    CrawlError::Transport {
        url: url.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Instant;

    fn transport() -> CrawlError {
        CrawlError::Transport {
            url: "https://example.com/".to_string(),
            message: "request timed out".to_string(),
        }
    }

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client(&Config::default()).is_ok());
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let calls = AtomicU32::new(0);
        let outcome = retry_fetch(3, Duration::from_millis(1), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok("<html></html>".to_string()) }
        })
        .await;

        assert_eq!(
            outcome,
            FetchOutcome::Success {
                body: "<html></html>".to_string()
            }
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transport_errors_exhaust_attempts() {
        let calls = AtomicU32::new(0);
        let started = Instant::now();

        let outcome = retry_fetch(3, Duration::from_millis(40), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(transport()) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(
            outcome,
            FetchOutcome::TerminalFailure { status: None, .. }
        ));
        // Two delays between three attempts
        assert!(started.elapsed() >= Duration::from_millis(80));
    }

    #[tokio::test]
    async fn test_recovers_after_transient_error() {
        let outcome = retry_fetch(3, Duration::from_millis(1), |n| async move {
            if n < 2 {
                Err(transport())
            } else {
                Ok("body".to_string())
            }
        })
        .await;

        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn test_status_error_is_not_retried() {
        let calls = AtomicU32::new(0);
        let outcome = retry_fetch(3, Duration::from_millis(1), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(CrawlError::HttpStatus {
                    url: "https://example.com/missing".to_string(),
                    status: 404,
                })
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(
            outcome,
            FetchOutcome::TerminalFailure {
                status: Some(404),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_zero_attempts_still_tries_once() {
        let calls = AtomicU32::new(0);
        retry_fetch(0, Duration::from_millis(1), |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(transport()) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
