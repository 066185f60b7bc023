// ABOUTME: Crawl frontier: discovers item links on a hashtag feed and deduplicates them in order.
// ABOUTME: Implements the load-more (scroll and settle) protocol and URL canonicalization.

use std::collections::HashSet;
use std::time::Duration;

use clipcrawl_extract::{read_attribute, Page, ITEM_LINK_SELECTOR};
use tracing::{debug, warn};
use url::Url;

use crate::browser::{snapshot, Browser};
use crate::error::CrawlError;
use crate::options::CrawlOptions;

const ITEM_PATH_MARKER: &str = "/video/";

/// Ordered set of canonical item URLs.
///
/// Grows during discovery; [`Frontier::into_visit_list`] freezes it.
#[derive(Debug, Clone, Default)]
pub struct Frontier {
    urls: Vec<String>,
    seen: HashSet<String>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a URL; returns false if it was already present.
    pub fn insert(&mut self, url: String) -> bool {
        if self.seen.contains(&url) {
            return false;
        }
        self.seen.insert(url.clone());
        self.urls.push(url);
        true
    }

    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.urls.iter().map(String::as_str)
    }

    /// Freezes the frontier into its discovery-ordered visit list.
    pub fn into_visit_list(self) -> Vec<String> {
        self.urls
    }
}

impl Extend<String> for Frontier {
    fn extend<T: IntoIterator<Item = String>>(&mut self, iter: T) {
        for url in iter {
            self.insert(url);
        }
    }
}

/// Resolves `href` against `base` and drops query and fragment.
///
/// Returns `None` for unparseable or non-http(s) targets.
pub fn canonicalize(base: &Url, href: &str) -> Option<String> {
    let mut url = base.join(href.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.set_query(None);
    url.set_fragment(None);
    Some(url.into())
}

/// True when the URL path looks like an item page.
pub fn is_item_link(url: &str) -> bool {
    Url::parse(url)
        .map(|u| u.path().contains(ITEM_PATH_MARKER))
        .unwrap_or(false)
}

/// Canonical item links on `page`, examining at most `limit` anchors.
pub fn collect_item_links(page: &Page, limit: usize) -> Vec<String> {
    let Ok(base) = Url::parse(page.url()) else {
        warn!(url = page.url(), "feed page has no usable base URL");
        return Vec::new();
    };
    page.query_all(ITEM_LINK_SELECTOR)
        .into_iter()
        .take(limit)
        .filter_map(|anchor| read_attribute(anchor, "href"))
        .filter_map(|href| canonicalize(&base, &href))
        .filter(|url| is_item_link(url))
        .collect()
}

/// Scrolls to the bottom `rounds` times, settling after each.
///
/// A failed scroll ends the protocol early; whatever is loaded is kept.
pub async fn load_more<B: Browser + ?Sized>(browser: &mut B, rounds: usize, settle: Duration) {
    for round in 1..=rounds {
        if let Err(err) = browser.scroll_to_bottom().await {
            debug!(round, error = %err, "scroll failed, stopping load-more");
            break;
        }
        browser.wait(settle).await;
    }
}

/// Loads a feed page and returns the item URLs it links to.
///
/// Only navigation of the feed itself is an error; an unreadable page after
/// loading yields an empty frontier.
pub async fn discover<B: Browser + ?Sized>(
    browser: &mut B,
    feed_url: &str,
    opts: &CrawlOptions,
) -> Result<Frontier, CrawlError> {
    browser.goto(feed_url, opts.feed_timeout).await?;
    browser.wait(opts.feed_settle).await;
    load_more(browser, opts.scroll_rounds, opts.scroll_settle).await;

    let mut frontier = Frontier::new();
    match snapshot(browser).await {
        Ok(page) => frontier.extend(collect_item_links(&page, opts.link_scan_limit)),
        Err(err) => warn!(url = feed_url, error = %err, "could not read feed page"),
    }
    debug!(url = feed_url, discovered = frontier.len(), "feed scanned");
    Ok(frontier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn base() -> Url {
        Url::parse("https://www.tiktok.com/tag/nurses").unwrap()
    }

    #[test]
    fn test_canonicalize_relative_and_absolute_agree() {
        let a = canonicalize(&base(), "/@amy/video/123?lang=en#c").unwrap();
        let b = canonicalize(&base(), "https://www.tiktok.com/@amy/video/123").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, "https://www.tiktok.com/@amy/video/123");
    }

    #[test]
    fn test_canonicalize_rejects_other_schemes() {
        assert_eq!(canonicalize(&base(), "javascript:void(0)"), None);
        assert_eq!(canonicalize(&base(), "mailto:a@b.c"), None);
    }

    #[test]
    fn test_is_item_link() {
        assert!(is_item_link("https://www.tiktok.com/@amy/video/123"));
        assert!(!is_item_link("https://www.tiktok.com/@amy"));
        assert!(!is_item_link("https://www.tiktok.com/search?q=/video/"));
    }

    #[test]
    fn test_frontier_keeps_first_insertion_order() {
        let mut frontier = Frontier::new();
        assert!(frontier.insert("b".to_string()));
        assert!(frontier.insert("a".to_string()));
        assert!(!frontier.insert("b".to_string()));
        assert_eq!(frontier.len(), 2);
        assert!(frontier.contains("a"));
        assert_eq!(frontier.into_visit_list(), vec!["b", "a"]);
    }

    #[test]
    fn test_collect_item_links_dedups_and_limits() {
        let page = Page::parse(
            "https://www.tiktok.com/tag/nurses",
            r#"<html><body>
                <a href="/@amy/video/1?is_from_webapp=1">one</a>
                <a href="https://www.tiktok.com/@amy/video/1">one again</a>
                <a href="/@ben/video/2">two</a>
                <a href="/@ben">profile</a>
                <a href="/@cat/video/3">three</a>
            </body></html>"#,
        );

        let mut frontier = Frontier::new();
        frontier.extend(collect_item_links(&page, 150));
        assert_eq!(
            frontier.into_visit_list(),
            vec![
                "https://www.tiktok.com/@amy/video/1",
                "https://www.tiktok.com/@ben/video/2",
                "https://www.tiktok.com/@cat/video/3",
            ]
        );

        assert_eq!(collect_item_links(&page, 2).len(), 2);
    }
}
