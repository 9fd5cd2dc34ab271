use url::Url;

/// Prefixes of hrefs that never lead to a crawlable page
const SKIPPED_PREFIXES: &[&str] = &["#", "mailto:", "javascript:", "tel:"];

/// Turns a raw href found on `base` into a crawlable absolute URL
///
/// # Rules (applied in order)
///
/// 1. Reject empty or whitespace-only hrefs
/// 2. Reject hrefs starting with `#`, `mailto:`, `javascript:` or `tel:`
/// 3. Resolve relative references against `base`
/// 4. Strip the fragment
/// 5. Reject anything whose scheme is not `http` or `https`
///
/// Nothing else is canonicalized: trailing slashes and query strings are kept
/// as written, so `/a` and `/a/` are different URLs.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use webscour::url::normalize_link;
///
/// let base = Url::parse("https://en.wikipedia.org/wiki/Bar").unwrap();
/// let url = normalize_link("/wiki/Foo", &base).unwrap();
/// assert_eq!(url.as_str(), "https://en.wikipedia.org/wiki/Foo");
///
/// assert!(normalize_link("#cite_note-1", &base).is_none());
/// assert!(normalize_link("mailto:a@b.com", &base).is_none());
/// ```
pub fn normalize_link(href: &str, base: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    if SKIPPED_PREFIXES
        .iter()
        .any(|prefix| href.starts_with(prefix))
    {
        return None;
    }

    let mut absolute = base.join(href).ok()?;
    absolute.set_fragment(None);

    match absolute.scheme() {
        "http" | "https" => Some(absolute),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://en.wikipedia.org/wiki/Bar").unwrap()
    }

    #[test]
    fn test_root_relative_link() {
        let result = normalize_link("/wiki/Foo", &base()).unwrap();
        assert_eq!(result.as_str(), "https://en.wikipedia.org/wiki/Foo");
    }

    #[test]
    fn test_path_relative_link() {
        let result = normalize_link("Baz", &base()).unwrap();
        assert_eq!(result.as_str(), "https://en.wikipedia.org/wiki/Baz");
    }

    #[test]
    fn test_dot_segments_resolved() {
        let result = normalize_link("../w/index.php?title=Foo", &base()).unwrap();
        assert_eq!(
            result.as_str(),
            "https://en.wikipedia.org/w/index.php?title=Foo"
        );
    }

    #[test]
    fn test_scheme_relative_link() {
        let result = normalize_link("//commons.wikimedia.org/x", &base()).unwrap();
        assert_eq!(result.as_str(), "https://commons.wikimedia.org/x");
    }

    #[test]
    fn test_fragment_only_rejected() {
        assert!(normalize_link("#cite_note-1", &base()).is_none());
    }

    #[test]
    fn test_special_schemes_rejected() {
        assert!(normalize_link("mailto:a@b.com", &base()).is_none());
        assert!(normalize_link("javascript:void(0)", &base()).is_none());
        assert!(normalize_link("tel:+15551234", &base()).is_none());
    }

    #[test]
    fn test_non_http_schemes_rejected_after_resolution() {
        assert!(normalize_link("ftp://x.org/file", &base()).is_none());
        assert!(normalize_link("data:text/plain,hi", &base()).is_none());
        assert!(normalize_link("file:///etc/passwd", &base()).is_none());
    }

    #[test]
    fn test_empty_and_whitespace_rejected() {
        assert!(normalize_link("", &base()).is_none());
        assert!(normalize_link("   \t\n", &base()).is_none());
    }

    #[test]
    fn test_fragment_stripped_from_absolute() {
        let result = normalize_link("https://x.org/p#frag", &base()).unwrap();
        assert_eq!(result.as_str(), "https://x.org/p");
    }

    #[test]
    fn test_surrounding_whitespace_trimmed() {
        let result = normalize_link("  /wiki/Foo  ", &base()).unwrap();
        assert_eq!(result.as_str(), "https://en.wikipedia.org/wiki/Foo");
    }

    #[test]
    fn test_trailing_slash_and_query_preserved() {
        let slash = normalize_link("/wiki/Foo/", &base()).unwrap();
        let query = normalize_link("/wiki/Foo?b=2&a=1", &base()).unwrap();

        assert_eq!(slash.as_str(), "https://en.wikipedia.org/wiki/Foo/");
        assert_eq!(query.as_str(), "https://en.wikipedia.org/wiki/Foo?b=2&a=1");
    }

    #[test]
    fn test_host_and_scheme_case_folded() {
        let result = normalize_link("HTTPS://EN.Wikipedia.ORG/wiki/Foo", &base()).unwrap();
        assert_eq!(result.as_str(), "https://en.wikipedia.org/wiki/Foo");
    }

    #[test]
    fn test_http_kept_as_http() {
        let result = normalize_link("http://example.com/page", &base()).unwrap();
        assert_eq!(result.as_str(), "http://example.com/page");
    }
}
