// ABOUTME: Pure extraction library for clipcrawl: strategies, field extraction, and count normalization.
// ABOUTME: Re-exports the public API used by the crawl engine; performs no I/O.

//! Extraction primitives for video pages.
//!
//! Everything here works on an already-captured [`Page`] snapshot and never
//! fails: missing values are `None`, unparseable counts are `"0"`.
//!
//! # Example
//!
//! ```
//! use clipcrawl_extract::{extract_strict, normalize_count, FieldKind, Page};
//!
//! let page = Page::parse(
//!     "https://www.tiktok.com/@alice/video/1",
//!     r#"<strong data-e2e="like-count">1.2K</strong>"#,
//! );
//! let likes = extract_strict(&page, FieldKind::Likes.strategies(), FieldKind::Likes.min_length())
//!     .map(|e| normalize_count(&e.value));
//! assert_eq!(likes.as_deref(), Some("1200"));
//! ```

pub mod catalog;
pub mod compiled;
pub mod count;
pub mod field;
pub mod page;
pub mod strategy;
pub mod structured;

pub use crate::catalog::{
    all_selectors, FieldKind, CAPTION_META, COMMENTS_DISABLED_PHRASES, COMMENTS_DISABLED_SELECTORS,
    COMMENT_CONTAINER_SELECTORS, COMMENT_NOTICE_SELECTORS, ITEM_LINK_SELECTOR,
};
pub use crate::compiled::precompile_selectors;
pub use crate::count::{normalize_count, parse_count};
pub use crate::field::{
    extract, extract_strict, raw_text_fallback, Extraction, Origin, Scope, DEFAULT_MIN_LENGTH,
};
pub use crate::page::{inner_text, read_attribute, read_text, Page};
pub use crate::strategy::{Filter, Locator, Strategy};
pub use crate::structured::{scan_embedded, EmbeddedStats};
pub use scraper::ElementRef;
