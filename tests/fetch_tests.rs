//! Integration tests for the fetch client's retry and classification policy

use std::time::{Duration, Instant};
use url::Url;
use webscour::config::Config;
use webscour::crawler::{FetchOutcome, Fetcher};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher(timeout_ms: u64, retry_delay_ms: u64) -> Fetcher {
    let mut config = Config::default();
    config.crawler.request_timeout_ms = timeout_ms;
    config.crawler.retry_delay_ms = retry_delay_ms;
    config.crawler.max_attempts = 3;
    Fetcher::new(&config).unwrap()
}

fn url(server: &MockServer, p: &str) -> Url {
    Url::parse(&format!("{}{}", server.uri(), p)).unwrap()
}

#[tokio::test]
async fn test_ok_response_is_success() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let outcome = fetcher(1000, 10).fetch(&url(&mock_server, "/ok")).await;
    assert_eq!(
        outcome,
        FetchOutcome::Success {
            body: "<html>ok</html>".to_string()
        }
    );
}

#[tokio::test]
async fn test_timeouts_are_retried_exactly_max_attempts() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .expect(3)
        .mount(&mock_server)
        .await;

    let started = Instant::now();
    let outcome = fetcher(200, 100).fetch(&url(&mock_server, "/slow")).await;

    assert!(matches!(
        outcome,
        FetchOutcome::TerminalFailure { status: None, .. }
    ));
    // Three timeouts plus two inter-attempt delays
    assert!(started.elapsed() >= Duration::from_millis(800));
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let outcome = fetcher(1000, 10).fetch(&url(&mock_server, "/missing")).await;
    assert!(matches!(
        outcome,
        FetchOutcome::TerminalFailure {
            status: Some(404),
            ..
        }
    ));
}

#[tokio::test]
async fn test_non_200_success_codes_are_terminal() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/empty"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let outcome = fetcher(1000, 10).fetch(&url(&mock_server, "/empty")).await;
    assert!(matches!(
        outcome,
        FetchOutcome::TerminalFailure {
            status: Some(204),
            ..
        }
    ));
}

#[tokio::test]
async fn test_redirect_is_followed() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", "/new"),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string("moved here"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let outcome = fetcher(1000, 10).fetch(&url(&mock_server, "/old")).await;
    assert_eq!(
        outcome,
        FetchOutcome::Success {
            body: "moved here".to_string()
        }
    );
}

#[tokio::test]
async fn test_connection_refused_is_retried_then_terminal() {
    // Bind and drop a listener to get a port nobody is listening on
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let target = Url::parse(&format!("http://127.0.0.1:{}/", port)).unwrap();

    let started = Instant::now();
    let outcome = fetcher(1000, 50).fetch(&target).await;

    assert!(matches!(
        outcome,
        FetchOutcome::TerminalFailure { status: None, .. }
    ));
    assert!(started.elapsed() >= Duration::from_millis(100));
}
