//! HTML link extraction
//!
//! Reads every `<a href>` in a page and turns it into a crawlable absolute
//! URL with the link normalizer. Anything the normalizer rejects is dropped.

use crate::url::normalize_link;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Extracts the normalized outbound links of a page
///
/// Relative links resolve against `base`. Each URL appears once, in the
/// order of its first occurrence in the document.
///
/// # Example
///
/// ```
/// use webscour::crawler::extract_links;
/// use url::Url;
///
/// let base = Url::parse("https://en.wikipedia.org/wiki/Bar").unwrap();
/// let links = extract_links(r#"<a href="/wiki/Foo#History">Foo</a>"#, &base);
/// assert_eq!(links[0].as_str(), "https://en.wikipedia.org/wiki/Foo");
/// ```
pub fn extract_links(html: &str, base: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| normalize_link(href, base))
        .filter(|url| seen.insert(url.as_str().to_string()))
        .collect()
}
