// ABOUTME: Crawl configuration: CrawlOptions, the RenderBackend choice, and the fluent CrawlerBuilder.
// ABOUTME: The builder produces either plain options or a ready Crawler over an HTTP or custom browser.

use std::time::Duration;

use crate::browser::{Browser, HttpBrowser};
use crate::crawler::Crawler;
use crate::error::CrawlError;

/// Desktop browser user agent sent with every page request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub const DEFAULT_BASE_URL: &str = "https://www.tiktok.com";

/// How page markup is obtained.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RenderBackend {
    /// Plain HTTP GET of the server-rendered page source.
    #[default]
    Direct,
    /// A Browserless service whose `/content` endpoint returns rendered HTML.
    Browserless {
        endpoint: String,
        token: Option<String>,
    },
}

/// Configuration for one crawl run.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub hashtags: Vec<String>,
    /// Maximum number of items visited per hashtag.
    pub max_videos_per_hashtag: usize,
    pub scroll_rounds: usize,
    /// Maximum comments kept per video.
    pub comment_cap: usize,
    /// Bounds (inclusive) of the randomized pause between items.
    pub min_delay: Duration,
    pub max_delay: Duration,
    pub navigation_timeout: Duration,
    pub feed_timeout: Duration,
    pub feed_settle: Duration,
    pub item_settle: Duration,
    pub scroll_settle: Duration,
    pub comment_settle: Duration,
    /// Maximum anchors examined on a feed page.
    pub link_scan_limit: usize,
    pub base_url: String,
    pub user_agent: String,
    pub allow_private_networks: bool,
    pub backend: RenderBackend,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            hashtags: Vec::new(),
            max_videos_per_hashtag: 100,
            scroll_rounds: 3,
            comment_cap: 10,
            min_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(3),
            navigation_timeout: Duration::from_secs(30),
            feed_timeout: Duration::from_secs(60),
            feed_settle: Duration::from_secs(5),
            item_settle: Duration::from_secs(3),
            scroll_settle: Duration::from_secs(3),
            comment_settle: Duration::from_secs(2),
            link_scan_limit: 150,
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            allow_private_networks: false,
            backend: RenderBackend::Direct,
        }
    }
}

impl CrawlOptions {
    /// The inter-item delay bounds, ordered low to high.
    pub fn delay_bounds(&self) -> (Duration, Duration) {
        if self.min_delay <= self.max_delay {
            (self.min_delay, self.max_delay)
        } else {
            (self.max_delay, self.min_delay)
        }
    }

    /// Feed page URL for a hashtag.
    pub fn feed_url(&self, hashtag: &str) -> String {
        format!("{}/tag/{}", self.base_url.trim_end_matches('/'), hashtag)
    }

    /// Sets every settle and inter-item wait to zero.
    pub fn without_waits(mut self) -> Self {
        self.min_delay = Duration::ZERO;
        self.max_delay = Duration::ZERO;
        self.feed_settle = Duration::ZERO;
        self.item_settle = Duration::ZERO;
        self.scroll_settle = Duration::ZERO;
        self.comment_settle = Duration::ZERO;
        self
    }
}

/// Strips the leading `#` and surrounding whitespace from a hashtag.
pub fn clean_hashtag(tag: &str) -> String {
    tag.trim().trim_start_matches('#').trim().to_string()
}

/// Builder for crawl options and crawlers.
#[derive(Debug, Clone)]
pub struct CrawlerBuilder {
    opts: CrawlOptions,
}

impl CrawlerBuilder {
    /// Create a new CrawlerBuilder with default options.
    pub fn new() -> Self {
        Self {
            opts: CrawlOptions::default(),
        }
    }

    /// Add a hashtag to crawl. Leading `#` is stripped; blank tags are ignored.
    pub fn hashtag(mut self, tag: impl AsRef<str>) -> Self {
        let tag = clean_hashtag(tag.as_ref());
        if !tag.is_empty() {
            self.opts.hashtags.push(tag);
        }
        self
    }

    /// Add several hashtags.
    pub fn hashtags<I, S>(self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        tags.into_iter().fold(self, |b, t| b.hashtag(t))
    }

    pub fn max_videos_per_hashtag(mut self, max: usize) -> Self {
        self.opts.max_videos_per_hashtag = max;
        self
    }

    pub fn scroll_rounds(mut self, rounds: usize) -> Self {
        self.opts.scroll_rounds = rounds;
        self
    }

    pub fn comment_cap(mut self, cap: usize) -> Self {
        self.opts.comment_cap = cap;
        self
    }

    /// Set the randomized inter-item delay range.
    pub fn delay_range(mut self, min: Duration, max: Duration) -> Self {
        self.opts.min_delay = min;
        self.opts.max_delay = max;
        self
    }

    pub fn navigation_timeout(mut self, timeout: Duration) -> Self {
        self.opts.navigation_timeout = timeout;
        self
    }

    pub fn feed_timeout(mut self, timeout: Duration) -> Self {
        self.opts.feed_timeout = timeout;
        self
    }

    pub fn feed_settle(mut self, settle: Duration) -> Self {
        self.opts.feed_settle = settle;
        self
    }

    pub fn item_settle(mut self, settle: Duration) -> Self {
        self.opts.item_settle = settle;
        self
    }

    pub fn scroll_settle(mut self, settle: Duration) -> Self {
        self.opts.scroll_settle = settle;
        self
    }

    pub fn comment_settle(mut self, settle: Duration) -> Self {
        self.opts.comment_settle = settle;
        self
    }

    pub fn link_scan_limit(mut self, limit: usize) -> Self {
        self.opts.link_scan_limit = limit;
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.opts.base_url = base_url.into();
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    /// Allow or disallow page requests to private networks.
    pub fn allow_private_networks(mut self, allow: bool) -> Self {
        self.opts.allow_private_networks = allow;
        self
    }

    pub fn backend(mut self, backend: RenderBackend) -> Self {
        self.opts.backend = backend;
        self
    }

    /// Zero every settle and inter-item wait.
    pub fn without_waits(mut self) -> Self {
        self.opts = self.opts.without_waits();
        self
    }

    /// Finish with plain options.
    pub fn options(self) -> CrawlOptions {
        self.opts
    }

    /// Build a crawler over the given browser.
    pub fn build_with<B: Browser>(self, browser: B) -> Crawler<B> {
        Crawler::new(browser, self.opts)
    }

    /// Build a crawler over an [`HttpBrowser`] configured from these options.
    pub fn build(self) -> Result<Crawler<HttpBrowser>, CrawlError> {
        let browser = HttpBrowser::new(&self.opts)?;
        Ok(Crawler::new(browser, self.opts))
    }

    /// Build a crawler over a freshly launched headless Chrome.
    ///
    /// The render backend setting is ignored; Chrome loads every page itself.
    #[cfg(feature = "chrome")]
    pub fn build_chrome(self) -> Result<Crawler<crate::browser::ChromeBrowser>, CrawlError> {
        let browser = crate::browser::ChromeBrowser::launch(&self.opts)?;
        Ok(Crawler::new(browser, self.opts))
    }
}

impl Default for CrawlerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = CrawlOptions::default();
        assert_eq!(opts.scroll_rounds, 3);
        assert_eq!(opts.comment_cap, 10);
        assert_eq!(opts.link_scan_limit, 150);
        assert_eq!(opts.backend, RenderBackend::Direct);
        assert!(!opts.allow_private_networks);
    }

    #[test]
    fn test_builder_cleans_hashtags() {
        let opts = CrawlerBuilder::new()
            .hashtags(["#ghanauknurses", " GhanaInUK ", "#", ""])
            .options();
        assert_eq!(opts.hashtags, vec!["ghanauknurses", "GhanaInUK"]);
    }

    #[test]
    fn test_delay_bounds_are_ordered() {
        let opts = CrawlerBuilder::new()
            .delay_range(Duration::from_millis(900), Duration::from_millis(100))
            .options();
        assert_eq!(
            opts.delay_bounds(),
            (Duration::from_millis(100), Duration::from_millis(900))
        );
    }

    #[test]
    fn test_feed_url() {
        let opts = CrawlerBuilder::new().base_url("http://127.0.0.1:8080/").options();
        assert_eq!(opts.feed_url("nurses"), "http://127.0.0.1:8080/tag/nurses");
    }

    #[test]
    fn test_without_waits() {
        let opts = CrawlerBuilder::new().without_waits().options();
        assert_eq!(opts.delay_bounds(), (Duration::ZERO, Duration::ZERO));
        assert_eq!(opts.feed_settle, Duration::ZERO);
        assert_eq!(opts.comment_settle, Duration::ZERO);
    }
}
