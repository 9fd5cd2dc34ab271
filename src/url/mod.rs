//! URL handling module for WebScour
//!
//! This module provides link normalization, crawl-URL parsing and the
//! same-host scope check used when deciding which links to follow.

mod domain;
mod normalize;

use crate::{UrlError, UrlResult};
use url::Url;

// Re-export main functions
pub use domain::{extract_domain, same_domain};
pub use normalize::normalize_link;

/// Parses a URL supplied from outside the crawl (a seed or a queue payload)
///
/// The result satisfies the same invariant as [`normalize_link`] output:
/// absolute, `http`/`https`, with a host and no fragment.
pub fn parse_crawl_url(raw: &str) -> UrlResult<Url> {
    let mut url = Url::parse(raw.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_fragment() {
        let url = parse_crawl_url("https://en.wikipedia.org/wiki/Infosys#History").unwrap();
        assert_eq!(url.as_str(), "https://en.wikipedia.org/wiki/Infosys");
    }

    #[test]
    fn test_parse_rejects_relative() {
        assert!(matches!(
            parse_crawl_url("/wiki/Infosys"),
            Err(UrlError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_rejects_other_schemes() {
        assert!(matches!(
            parse_crawl_url("ftp://example.com/"),
            Err(UrlError::InvalidScheme(_))
        ));
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let url = parse_crawl_url("  https://example.com/a \n").unwrap();
        assert_eq!(url.as_str(), "https://example.com/a");
    }
}
