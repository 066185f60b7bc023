// ABOUTME: Optional TOML configuration file mirroring CrawlOptions with millisecond durations.
// ABOUTME: Values present in the file are applied onto a CrawlerBuilder before CLI overrides.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::CrawlError;
use crate::options::{CrawlerBuilder, RenderBackend};

/// On-disk crawl configuration. Every key is optional.
///
/// ```toml
/// hashtags = ["ghanauknurses", "nursesinuk"]
/// max_videos = 20
/// min_delay_ms = 1000
/// max_delay_ms = 3000
///
/// [browserless]
/// url = "http://localhost:3000"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub hashtags: Vec<String>,
    pub max_videos: Option<usize>,
    pub scroll_rounds: Option<usize>,
    pub comment_cap: Option<usize>,
    pub min_delay_ms: Option<u64>,
    pub max_delay_ms: Option<u64>,
    pub navigation_timeout_ms: Option<u64>,
    pub feed_timeout_ms: Option<u64>,
    pub feed_settle_ms: Option<u64>,
    pub item_settle_ms: Option<u64>,
    pub scroll_settle_ms: Option<u64>,
    pub comment_settle_ms: Option<u64>,
    pub link_scan_limit: Option<usize>,
    pub base_url: Option<String>,
    pub user_agent: Option<String>,
    pub allow_private_networks: Option<bool>,
    pub browserless: Option<BrowserlessConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BrowserlessConfig {
    pub url: String,
    pub token: Option<String>,
}

impl FileConfig {
    /// Reads and parses a TOML file.
    pub fn load(path: &Path) -> Result<Self, CrawlError> {
        let target = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CrawlError::config(&target, "LoadConfig", Some(anyhow::Error::new(e)))
        })?;
        Self::from_toml_str(&content).map_err(|mut e| {
            e.target = target;
            e
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, CrawlError> {
        toml::from_str(content).map_err(|e| {
            CrawlError::config("<inline>", "ParseConfig", Some(anyhow::Error::new(e)))
        })
    }

    /// Applies every value present in the file onto `builder`.
    pub fn apply(self, mut builder: CrawlerBuilder) -> CrawlerBuilder {
        let ms = Duration::from_millis;
        let current = builder.clone().options();

        builder = builder.hashtags(&self.hashtags);
        if let Some(v) = self.max_videos {
            builder = builder.max_videos_per_hashtag(v);
        }
        if let Some(v) = self.scroll_rounds {
            builder = builder.scroll_rounds(v);
        }
        if let Some(v) = self.comment_cap {
            builder = builder.comment_cap(v);
        }
        if self.min_delay_ms.is_some() || self.max_delay_ms.is_some() {
            builder = builder.delay_range(
                self.min_delay_ms.map_or(current.min_delay, ms),
                self.max_delay_ms.map_or(current.max_delay, ms),
            );
        }
        if let Some(v) = self.navigation_timeout_ms {
            builder = builder.navigation_timeout(ms(v));
        }
        if let Some(v) = self.feed_timeout_ms {
            builder = builder.feed_timeout(ms(v));
        }
        if let Some(v) = self.feed_settle_ms {
            builder = builder.feed_settle(ms(v));
        }
        if let Some(v) = self.item_settle_ms {
            builder = builder.item_settle(ms(v));
        }
        if let Some(v) = self.scroll_settle_ms {
            builder = builder.scroll_settle(ms(v));
        }
        if let Some(v) = self.comment_settle_ms {
            builder = builder.comment_settle(ms(v));
        }
        if let Some(v) = self.link_scan_limit {
            builder = builder.link_scan_limit(v);
        }
        if let Some(v) = self.base_url {
            builder = builder.base_url(v);
        }
        if let Some(v) = self.user_agent {
            builder = builder.user_agent(v);
        }
        if let Some(v) = self.allow_private_networks {
            builder = builder.allow_private_networks(v);
        }
        if let Some(b) = self.browserless {
            builder = builder.backend(RenderBackend::Browserless {
                endpoint: b.url,
                token: b.token,
            });
        }
        builder
    }
}
