// ABOUTME: Fixed strategy chains for every field read from a video page or comment container.
// ABOUTME: Also lists comment container selectors, the "comments disabled" markers, and notice slots.

//! Field catalog.
//!
//! The strategy list for a field depends only on the field kind. Order is
//! priority: the stable `data-e2e` hooks come first, class-name fragments
//! (which change with every frontend deploy) come last.

use crate::strategy::Strategy;

/// Every value-bearing field the crawler reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Caption,
    Views,
    Likes,
    Shares,
    CommentCount,
    CommentText,
    CommentAuthor,
    CommentLikes,
}

const CAPTION: &[Strategy] = &[
    Strategy::text("[data-e2e='video-desc'] span"),
    Strategy::text("[data-e2e='video-desc']"),
    Strategy::text("[data-e2e='browse-video-desc']"),
    Strategy::text("h1[data-e2e='video-desc']"),
    Strategy::text(".video-meta-caption"),
    Strategy::text("[class*='video-meta'] span"),
    Strategy::text("[class*='Caption']"),
    Strategy::text("[class*='description']"),
    Strategy::text("span[class*='SpanText']"),
];

/// Last-resort caption source, consulted after the embedded payload.
pub const CAPTION_META: &[Strategy] = &[Strategy::attr("meta[property='og:description']", "content")];

const VIEWS: &[Strategy] = &[
    Strategy::text("strong[data-e2e='video-views']").numeric(),
    Strategy::text("[data-e2e='browse-video-views']").numeric(),
    Strategy::text("[data-e2e='video-views']").numeric(),
];

const LIKES: &[Strategy] = &[
    Strategy::text("strong[data-e2e='like-count']").numeric(),
    Strategy::text("strong[data-e2e='browse-like-count']").numeric(),
    Strategy::text("[data-e2e='like-count']").numeric(),
];

const SHARES: &[Strategy] = &[
    Strategy::text("strong[data-e2e='share-count']").numeric(),
    Strategy::text("[data-e2e='share-count']").numeric(),
];

const COMMENT_COUNT: &[Strategy] = &[
    Strategy::text("strong[data-e2e='comment-count']").numeric(),
    Strategy::text("strong[data-e2e='browse-comment-count']").numeric(),
    Strategy::text("[data-e2e='comment-count']").numeric(),
];

const COMMENT_TEXT: &[Strategy] = &[
    Strategy::text("[data-e2e='comment-text']"),
    Strategy::text("span[data-e2e='comment-text']"),
    Strategy::text("p[data-e2e='comment-text']"),
    Strategy::text("span[class*='text']"),
    Strategy::text("p[class*='text']"),
    Strategy::text("div[class*='text']"),
    Strategy::text("span"),
    Strategy::text("p"),
];

const COMMENT_AUTHOR: &[Strategy] = &[
    Strategy::text("[data-e2e='comment-author-nickname']"),
    Strategy::text("[data-e2e='comment-username']"),
    Strategy::text("span[class*='author']"),
    Strategy::text("a[class*='author']"),
    Strategy::text("span[class*='nickname']"),
    Strategy::text("a[class*='nickname']"),
];

const COMMENT_LIKES: &[Strategy] = &[
    Strategy::text("[data-e2e='comment-like-count']").numeric(),
    Strategy::text("span[class*='like']").numeric(),
    Strategy::text("span[class*='count']").numeric(),
];

/// Selectors for comment containers, tried in order; the first yielding any element wins.
pub const COMMENT_CONTAINER_SELECTORS: &[&str] = &[
    "[data-e2e='comment-level-1']",
    "[data-e2e='comment-item']",
    "div[class*='CommentItemContainer']",
    ".comment-container",
    "div[class*='comment']",
    "div[class*='Comment']",
];

/// Elements that only render when comments are switched off.
pub const COMMENTS_DISABLED_SELECTORS: &[&str] = &[
    "[data-e2e='comment-disabled']",
    "[data-e2e='comments-disabled']",
    "[class*='CommentDisabled']",
];

/// Comment-panel notice slots: empty-state and status messages, never comment bodies.
pub const COMMENT_NOTICE_SELECTORS: &[&str] = &[
    "[data-e2e='comment-empty']",
    "[data-e2e='comment-list-empty']",
    "[data-e2e='comment-notice']",
    "[class*='CommentEmpty']",
    "[class*='DivCommentNotice']",
];

/// Notice texts meaning comments are switched off (matched case-insensitively
/// inside [`COMMENT_NOTICE_SELECTORS`] elements only).
pub const COMMENTS_DISABLED_PHRASES: &[&str] = &[
    "comments are turned off",
    "comments have been turned off",
    "comments are disabled",
];

/// Anchors that may lead to an item page.
pub const ITEM_LINK_SELECTOR: &str = "a[href*='/video/']";

impl FieldKind {
    pub const ALL: [FieldKind; 8] = [
        FieldKind::Caption,
        FieldKind::Views,
        FieldKind::Likes,
        FieldKind::Shares,
        FieldKind::CommentCount,
        FieldKind::CommentText,
        FieldKind::CommentAuthor,
        FieldKind::CommentLikes,
    ];

    /// The ordered strategy chain for this field.
    pub fn strategies(self) -> &'static [Strategy] {
        match self {
            FieldKind::Caption => CAPTION,
            FieldKind::Views => VIEWS,
            FieldKind::Likes => LIKES,
            FieldKind::Shares => SHARES,
            FieldKind::CommentCount => COMMENT_COUNT,
            FieldKind::CommentText => COMMENT_TEXT,
            FieldKind::CommentAuthor => COMMENT_AUTHOR,
            FieldKind::CommentLikes => COMMENT_LIKES,
        }
    }

    /// Values must be strictly longer than this many characters to be accepted.
    pub fn min_length(self) -> usize {
        match self {
            FieldKind::Caption => 2,
            FieldKind::CommentText => 3,
            FieldKind::Views
            | FieldKind::Likes
            | FieldKind::Shares
            | FieldKind::CommentCount
            | FieldKind::CommentAuthor
            | FieldKind::CommentLikes => 0,
        }
    }
}

/// Every selector the catalog can issue, for cache warming.
pub fn all_selectors() -> impl Iterator<Item = &'static str> {
    FieldKind::ALL
        .iter()
        .flat_map(|kind| kind.strategies().iter().map(|s| s.locator.selector()))
        .chain(CAPTION_META.iter().map(|s| s.locator.selector()))
        .chain(COMMENT_CONTAINER_SELECTORS.iter().copied())
        .chain(COMMENTS_DISABLED_SELECTORS.iter().copied())
        .chain(COMMENT_NOTICE_SELECTORS.iter().copied())
        .chain(std::iter::once(ITEM_LINK_SELECTOR))
}
