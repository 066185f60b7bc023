// ABOUTME: Comment collector: reads up to a capped number of top-level comments from a video page.
// ABOUTME: Returns nothing when the page shows a "comments disabled" marker.

use std::time::Duration;

use clipcrawl_extract::{
    extract, extract_strict, inner_text, normalize_count, ElementRef, FieldKind, Page,
    COMMENTS_DISABLED_PHRASES, COMMENTS_DISABLED_SELECTORS, COMMENT_CONTAINER_SELECTORS,
    COMMENT_NOTICE_SELECTORS,
};
use tracing::{debug, warn};

use crate::browser::{snapshot, Browser};
use crate::frontier::load_more;
use crate::records::{CommentRecord, UNKNOWN_AUTHOR, ZERO_COUNT};

/// Comment text must be longer than this after trimming.
const MIN_COMMENT_CHARS: usize = 3;

/// True when the page explicitly says comments are switched off.
///
/// Only dedicated marker elements and comment-panel notices count; captions
/// and comment bodies mentioning the phrase do not.
pub fn comments_disabled(page: &Page) -> bool {
    if COMMENTS_DISABLED_SELECTORS
        .iter()
        .any(|css| page.query(css).is_some())
    {
        return true;
    }
    COMMENT_NOTICE_SELECTORS
        .iter()
        .flat_map(|css| page.query_all(css))
        .any(|notice| {
            let text = inner_text(notice).to_lowercase();
            COMMENTS_DISABLED_PHRASES
                .iter()
                .any(|phrase| text.contains(phrase))
        })
}

/// Containers from the first selector that matches anything.
fn comment_containers(page: &Page) -> Vec<ElementRef<'_>> {
    COMMENT_CONTAINER_SELECTORS
        .iter()
        .map(|css| page.query_all(css))
        .find(|found| !found.is_empty())
        .unwrap_or_default()
}

fn comment_from_container(container: &ElementRef<'_>, video_url: &str) -> Option<CommentRecord> {
    let text = extract(
        container,
        FieldKind::CommentText.strategies(),
        FieldKind::CommentText.min_length(),
    )?
    .value;
    if text.trim().chars().count() <= MIN_COMMENT_CHARS {
        return None;
    }

    let author = extract_strict(
        container,
        FieldKind::CommentAuthor.strategies(),
        FieldKind::CommentAuthor.min_length(),
    )
    .map(|e| e.value)
    .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());

    let like_count = extract_strict(
        container,
        FieldKind::CommentLikes.strategies(),
        FieldKind::CommentLikes.min_length(),
    )
    .map(|e| normalize_count(&e.value))
    .unwrap_or_else(|| ZERO_COUNT.to_string());

    Some(CommentRecord {
        source_url: video_url.to_string(),
        author_handle: author,
        text,
        like_count,
    })
}

/// Reads comments from an already captured page.
pub fn comments_from_page(page: &Page, video_url: &str, cap: usize) -> Vec<CommentRecord> {
    if comments_disabled(page) {
        debug!(url = video_url, "comments disabled");
        return Vec::new();
    }

    let comments: Vec<CommentRecord> = comment_containers(page)
        .iter()
        .take(cap)
        .filter_map(|container| comment_from_container(container, video_url))
        .collect();
    debug!(url = video_url, count = comments.len(), "comments read");
    comments
}

/// Surfaces the comment region of the current page and reads its comments.
///
/// Never fails: a browser error is logged and yields no comments.
pub async fn collect_comments<B: Browser + ?Sized>(
    browser: &mut B,
    video_url: &str,
    cap: usize,
    settle: Duration,
) -> Vec<CommentRecord> {
    load_more(browser, 1, settle).await;
    match snapshot(browser).await {
        Ok(page) => comments_from_page(&page, video_url, cap),
        Err(err) => {
            warn!(url = video_url, error = %err, "could not read comments");
            Vec::new()
        }
    }
}
