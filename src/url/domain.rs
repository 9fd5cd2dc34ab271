use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// Ports are not part of the domain.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use webscour::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns true if both URLs share the same host
///
/// This is the crawl scope rule: a link is followed only when it points at the
/// host of the page it was found on. Subdomains count as different hosts.
pub fn same_domain(a: &Url, b: &Url) -> bool {
    match (extract_domain(a), extract_domain(b)) {
        (Some(left), Some(right)) => left == right,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple_domain() {
        let url = Url::parse("https://example.com/").unwrap();
        assert_eq!(extract_domain(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_extract_with_port() {
        let url = Url::parse("https://example.com:8080/").unwrap();
        assert_eq!(extract_domain(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_extract_mixed_case() {
        let url = Url::parse("https://Example.COM/").unwrap();
        assert_eq!(extract_domain(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_same_domain() {
        let page = Url::parse("https://a.example/x").unwrap();
        let inside = Url::parse("https://a.example/y").unwrap();
        let outside = Url::parse("https://b.example/z").unwrap();

        assert!(same_domain(&page, &inside));
        assert!(!same_domain(&page, &outside));
    }

    #[test]
    fn test_subdomain_is_out_of_scope() {
        let page = Url::parse("https://example.com/").unwrap();
        let sub = Url::parse("https://blog.example.com/").unwrap();
        assert!(!same_domain(&page, &sub));
    }

    #[test]
    fn test_scheme_does_not_affect_scope() {
        let page = Url::parse("https://example.com/").unwrap();
        let plain = Url::parse("http://example.com/other").unwrap();
        assert!(same_domain(&page, &plain));
    }
}
