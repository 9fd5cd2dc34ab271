//! Seed producer

use crate::queue::WorkQueue;
use crate::url::parse_crawl_url;
use crate::CrawlError;

/// Publishes the starting URLs of a crawl
///
/// Each seed is checked and its fragment removed before publishing. An
/// invalid seed stops the run before anything is sent. Returns the number of
/// messages published.
pub async fn seed_queue<S: AsRef<str>>(queue: &dyn WorkQueue, seeds: &[S]) -> Result<usize, CrawlError> {
    let urls = seeds
        .iter()
        .map(|seed| parse_crawl_url(seed.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;

    for url in &urls {
        queue.publish(url.as_str().as_bytes()).await?;
        tracing::info!("Published seed {}", url);
    }

    Ok(urls.len())
}
