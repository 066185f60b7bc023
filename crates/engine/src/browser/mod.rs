// ABOUTME: The navigation collaborator: an async Browser trait the crawler drives page by page.
// ABOUTME: Also provides the snapshot helper that parses the current page into an extract::Page.

use std::time::Duration;

use async_trait::async_trait;
use clipcrawl_extract::Page;

use crate::error::CrawlError;

#[cfg(feature = "chrome")]
mod chrome;
mod fetch;
mod http;

#[cfg(feature = "chrome")]
pub use chrome::ChromeBrowser;
pub use fetch::{fetch_page, is_private_ip, FetchedPage, MAX_CONTENT_LENGTH};
pub use http::HttpBrowser;

/// A single browsing session showing one page at a time.
///
/// Every call is fallible; callers treat a failure as "value absent" except
/// for `goto` on a feed, which fails the hashtag.
#[async_trait]
pub trait Browser: Send {
    /// Loads `url`, failing with a timeout error once `timeout` elapses.
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), CrawlError>;

    /// Suspends the current task.
    async fn wait(&mut self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }

    /// Scrolls the current page to the bottom to trigger lazy loading.
    async fn scroll_to_bottom(&mut self) -> Result<(), CrawlError>;

    /// Raw markup of the current page.
    async fn content(&mut self) -> Result<String, CrawlError>;

    /// URL of the current page, if one is loaded.
    fn current_url(&self) -> Option<&str>;
}

/// Captures the current page as a parsed snapshot.
pub async fn snapshot<B: Browser + ?Sized>(browser: &mut B) -> Result<Page, CrawlError> {
    let markup = browser.content().await?;
    let url = browser.current_url().unwrap_or_default().to_string();
    Ok(Page::parse(url, markup))
}
