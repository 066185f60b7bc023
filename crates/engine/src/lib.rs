// ABOUTME: Main library entry point for the clipcrawl hashtag crawl engine.
// ABOUTME: Re-exports the public API: Crawler, CrawlerBuilder, Browser, records, output and errors.

//! clipcrawl - crawls a video site by hashtag and tabulates what it finds.
//!
//! For every hashtag the crawler loads the tag feed, collects item links,
//! visits a capped number of them with randomized pauses, and builds one
//! [`VideoRecord`] per item plus its top [`CommentRecord`]s. Field values come
//! from ordered selector fallbacks and the page's embedded JSON payload (see
//! the `clipcrawl-extract` crate). Nothing in a run is fatal: failed items
//! are skipped and failed hashtags are reported.
//!
//! # Example
//!
//! ```no_run
//! use clipcrawl::{output, CrawlError, CrawlerBuilder, OutputPaths};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), CrawlError> {
//!     let mut crawler = CrawlerBuilder::new()
//!         .hashtags(["ghanauknurses", "nursesinuk"])
//!         .max_videos_per_hashtag(20)
//!         .build()?;
//!     let results = crawler.run().await;
//!     let paths = OutputPaths::timestamped(std::path::Path::new("out"), chrono::Utc::now());
//!     output::persist(&results, &paths);
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod browser;
pub mod comments;
pub mod config;
pub mod crawler;
pub mod error;
pub mod frontier;
pub mod options;
pub mod output;
pub mod records;
pub mod video;

pub use crate::aggregate::ResultSet;
#[cfg(feature = "chrome")]
pub use crate::browser::ChromeBrowser;
pub use crate::browser::{Browser, HttpBrowser};
pub use crate::config::FileConfig;
pub use crate::crawler::{Crawler, HashtagReport, HashtagState};
pub use crate::error::{CrawlError, ErrorCode};
pub use crate::options::{CrawlOptions, CrawlerBuilder, RenderBackend};
pub use crate::output::{OutputPaths, PersistReport};
pub use crate::records::{CommentRecord, RunSummary, VideoRecord};
pub use crate::video::ItemOutcome;
