// ABOUTME: Crawl orchestrator: hashtag → feed discovery → capped, rate-limited item visits.
// ABOUTME: Tracks each hashtag through its state machine and isolates per-item failures.

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use clipcrawl_extract::{all_selectors, precompile_selectors};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::aggregate::ResultSet;
use crate::browser::Browser;
use crate::frontier::discover;
use crate::options::CrawlOptions;
use crate::video::{build_record, ItemOutcome};

/// Lifecycle of one hashtag within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HashtagState {
    Pending,
    Discovering,
    Visiting,
    Done,
    Failed,
}

impl fmt::Display for HashtagState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HashtagState::Pending => "pending",
            HashtagState::Discovering => "discovering",
            HashtagState::Visiting => "visiting",
            HashtagState::Done => "done",
            HashtagState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Outcome of one hashtag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HashtagReport {
    pub hashtag: String,
    pub state: HashtagState,
    /// Item URLs found on the feed, before run-wide dedup and capping.
    pub discovered: usize,
    pub visited: usize,
    pub skipped: usize,
    /// Why the hashtag failed, if it did.
    pub error: Option<String>,
}

impl HashtagReport {
    pub fn new(hashtag: impl Into<String>, state: HashtagState) -> Self {
        Self {
            hashtag: hashtag.into(),
            state,
            discovered: 0,
            visited: 0,
            skipped: 0,
            error: None,
        }
    }

    fn advance(&mut self, next: HashtagState) {
        debug!(hashtag = %self.hashtag, from = %self.state, to = %next, "hashtag state");
        self.state = next;
    }
}

/// Drives one browser through every configured hashtag, strictly sequentially.
pub struct Crawler<B: Browser> {
    browser: B,
    opts: CrawlOptions,
    visited: HashSet<String>,
}

impl<B: Browser> Crawler<B> {
    pub fn new(browser: B, opts: CrawlOptions) -> Self {
        precompile_selectors(all_selectors());
        Self {
            browser,
            opts,
            visited: HashSet::new(),
        }
    }

    pub fn options(&self) -> &CrawlOptions {
        &self.opts
    }

    /// Gives the browser back, e.g. to inspect a test double.
    pub fn into_browser(self) -> B {
        self.browser
    }

    /// Crawls every configured hashtag in order. Never fails.
    pub async fn run(&mut self) -> ResultSet {
        let mut results = ResultSet::new();
        let hashtags = self.opts.hashtags.clone();

        for hashtag in &hashtags {
            let report = self.crawl_hashtag(hashtag, &mut results).await;
            results.record_hashtag(report);
        }

        info!(
            videos = results.videos.len(),
            comments = results.comments.len(),
            hashtags = hashtags.len(),
            "crawl finished"
        );
        results
    }

    /// Runs one hashtag through discovery and visiting, appending to `results`.
    pub async fn crawl_hashtag(&mut self, hashtag: &str, results: &mut ResultSet) -> HashtagReport {
        let mut report = HashtagReport::new(hashtag, HashtagState::Pending);
        let feed_url = self.opts.feed_url(hashtag);

        report.advance(HashtagState::Discovering);
        info!(hashtag, url = %feed_url, "discovering");
        let frontier = match discover(&mut self.browser, &feed_url, &self.opts).await {
            Ok(frontier) => frontier,
            Err(err) => {
                warn!(hashtag, error = %err, "feed failed to load");
                report.error = Some(err.to_string());
                report.advance(HashtagState::Failed);
                return report;
            }
        };
        report.discovered = frontier.len();

        let to_visit: Vec<String> = frontier
            .into_visit_list()
            .into_iter()
            .filter(|url| !self.visited.contains(url))
            .take(self.opts.max_videos_per_hashtag)
            .collect();

        if to_visit.is_empty() {
            info!(hashtag, "no items found");
            report.advance(HashtagState::Done);
            return report;
        }

        report.advance(HashtagState::Visiting);
        info!(hashtag, items = to_visit.len(), "visiting");

        for (index, url) in to_visit.iter().enumerate() {
            if index > 0 {
                let pause = self.jitter();
                self.browser.wait(pause).await;
            }
            self.visited.insert(url.clone());

            match build_record(&mut self.browser, url, hashtag, &self.opts).await {
                ItemOutcome::Built { video, comments } => {
                    report.visited += 1;
                    results.push_item(video, comments);
                }
                ItemOutcome::Skipped { url, reason } => {
                    report.skipped += 1;
                    warn!(hashtag, url = %url, error = %reason, "item skipped");
                }
            }
        }

        report.advance(HashtagState::Done);
        info!(
            hashtag,
            visited = report.visited,
            skipped = report.skipped,
            "hashtag done"
        );
        report
    }

    /// A uniformly random pause within the configured delay bounds.
    fn jitter(&self) -> Duration {
        let (min, max) = self.opts.delay_bounds();
        if min == max {
            return min;
        }
        rand::rng().random_range(min..=max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CrawlError;
    use async_trait::async_trait;

    struct NullBrowser;

    #[async_trait]
    impl Browser for NullBrowser {
        async fn goto(&mut self, url: &str, _timeout: Duration) -> Result<(), CrawlError> {
            Err(CrawlError::navigation(url, "Goto", None))
        }

        async fn wait(&mut self, _duration: Duration) {}

        async fn scroll_to_bottom(&mut self) -> Result<(), CrawlError> {
            Ok(())
        }

        async fn content(&mut self) -> Result<String, CrawlError> {
            Ok(String::new())
        }

        fn current_url(&self) -> Option<&str> {
            None
        }
    }

    #[test]
    fn test_jitter_stays_within_bounds() {
        let mut opts = CrawlOptions::default();
        opts.min_delay = Duration::from_millis(300);
        opts.max_delay = Duration::from_millis(100);
        let crawler = Crawler::new(NullBrowser, opts);
        for _ in 0..50 {
            let pause = crawler.jitter();
            assert!(pause >= Duration::from_millis(100) && pause <= Duration::from_millis(300));
        }
    }

    #[tokio::test]
    async fn test_unreachable_feed_fails_hashtag() {
        let mut opts = CrawlOptions::default();
        opts.hashtags = vec!["nurses".to_string()];
        let mut crawler = Crawler::new(NullBrowser, opts);
        let results = crawler.run().await;
        assert!(results.is_empty());
        assert_eq!(results.reports.len(), 1);
        assert_eq!(results.reports[0].state, HashtagState::Failed);
        assert!(results.reports[0].error.is_some());
    }
}
