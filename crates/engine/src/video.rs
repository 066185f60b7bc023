// ABOUTME: Video record builder: visits one item page and turns it into a VideoRecord plus comments.
// ABOUTME: Combines strategy extraction, the embedded payload scan, and the comment collector.

use chrono::{DateTime, SecondsFormat};
use clipcrawl_extract::{
    extract_strict, normalize_count, scan_embedded, EmbeddedStats, FieldKind, Origin, Page,
    CAPTION_META,
};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::browser::{snapshot, Browser};
use crate::comments::collect_comments;
use crate::error::CrawlError;
use crate::options::CrawlOptions;
use crate::records::{CommentRecord, VideoRecord, NO_CAPTION, UNKNOWN_AUTHOR, ZERO_COUNT};

static AUTHOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/@([^/?#]+)/video/").expect("valid author regex"));

/// Handle between `@` and `/video/` in an item URL.
pub fn author_from_url(url: &str) -> Option<String> {
    AUTHOR_RE
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Values read from one item page before defaults are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedVideo {
    pub caption: Option<String>,
    pub views: Option<String>,
    pub likes: Option<String>,
    pub shares: Option<String>,
    pub comments: Option<String>,
    pub posted_at: Option<String>,
}

impl ExtractedVideo {
    /// Resolves missing values to their defaults.
    pub fn into_record(self, hashtag: &str, url: &str) -> VideoRecord {
        VideoRecord {
            hashtag: hashtag.to_string(),
            source_url: url.to_string(),
            author_handle: author_from_url(url).unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
            caption: self.caption.unwrap_or_else(|| NO_CAPTION.to_string()),
            view_count: self.views.unwrap_or_else(|| ZERO_COUNT.to_string()),
            like_count: self.likes.unwrap_or_else(|| ZERO_COUNT.to_string()),
            share_count: self.shares.unwrap_or_else(|| ZERO_COUNT.to_string()),
            comment_count: self.comments,
            posted_at: self.posted_at,
        }
    }
}

fn visible_count(page: &Page, kind: FieldKind) -> Option<String> {
    let found = extract_strict(page, kind.strategies(), kind.min_length())?;
    if let Origin::Strategy(index) = found.origin {
        debug!(?kind, index, value = %found.value, "visible counter");
    }
    Some(normalize_count(&found.value))
}

/// Picks the embedded counter when the payload is preferred, the visible one otherwise,
/// falling back to whichever exists.
fn pick_count(
    embedded: Option<u64>,
    visible: Option<String>,
    prefer_embedded: bool,
) -> Option<String> {
    let embedded = embedded.map(|n| n.to_string());
    if prefer_embedded {
        embedded.or(visible)
    } else {
        visible.or(embedded)
    }
}

/// Reads every video field from a captured item page.
pub fn extract_video(page: &Page) -> ExtractedVideo {
    let stats: EmbeddedStats = scan_embedded(page.source());
    let prefer_embedded = stats.has_nonzero_counts();

    let caption = extract_strict(
        page,
        FieldKind::Caption.strategies(),
        FieldKind::Caption.min_length(),
    )
    .map(|e| e.value)
    .or_else(|| stats.description.clone())
    .or_else(|| {
        extract_strict(page, CAPTION_META, FieldKind::Caption.min_length()).map(|e| e.value)
    });

    ExtractedVideo {
        caption,
        views: pick_count(stats.plays, visible_count(page, FieldKind::Views), prefer_embedded),
        likes: pick_count(stats.likes, visible_count(page, FieldKind::Likes), prefer_embedded),
        shares: pick_count(stats.shares, visible_count(page, FieldKind::Shares), prefer_embedded),
        comments: pick_count(
            stats.comments,
            visible_count(page, FieldKind::CommentCount),
            prefer_embedded,
        ),
        posted_at: stats
            .created_at
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true)),
    }
}

/// Result of visiting one item.
#[derive(Debug)]
pub enum ItemOutcome {
    Built {
        video: VideoRecord,
        comments: Vec<CommentRecord>,
    },
    Skipped {
        url: String,
        reason: CrawlError,
    },
}

/// Visits `url` and builds its record, or reports why it was skipped.
pub async fn build_record<B: Browser + ?Sized>(
    browser: &mut B,
    url: &str,
    hashtag: &str,
    opts: &CrawlOptions,
) -> ItemOutcome {
    if let Err(reason) = browser.goto(url, opts.navigation_timeout).await {
        return ItemOutcome::Skipped {
            url: url.to_string(),
            reason,
        };
    }
    browser.wait(opts.item_settle).await;

    let extracted = match snapshot(browser).await {
        Ok(page) => extract_video(&page),
        Err(reason) => {
            return ItemOutcome::Skipped {
                url: url.to_string(),
                reason,
            }
        }
    };

    let comments = if opts.comment_cap == 0 {
        Vec::new()
    } else {
        collect_comments(browser, url, opts.comment_cap, opts.comment_settle).await
    };
    if comments.is_empty() && extracted.comments.as_deref().is_some_and(|c| c != ZERO_COUNT) {
        debug!(url, "comment count present but no comments read");
    }

    let video = extracted.into_record(hashtag, url);
    debug!(
        url,
        author = %video.author_handle,
        views = %video.view_count,
        comments = comments.len(),
        "item built"
    );
    ItemOutcome::Built { video, comments }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const URL: &str = "https://www.tiktok.com/@nurse.amy/video/7312";

    #[test]
    fn test_author_from_url() {
        assert_eq!(author_from_url(URL).as_deref(), Some("nurse.amy"));
        assert_eq!(author_from_url("https://www.tiktok.com/video/1"), None);
        assert_eq!(author_from_url("https://www.tiktok.com/@amy"), None);
    }

    #[test]
    fn test_embedded_counts_preferred_when_nonzero() {
        let page = Page::parse(
            URL,
            r#"<html><head><script>{"itemStruct":{"desc":"payload caption","createTime":1700000000,
                "stats":{"playCount":45000,"diggCount":1500,"shareCount":0}}}</script></head>
               <body><strong data-e2e="like-count">1.4K</strong>
               <strong data-e2e="comment-count">12</strong></body></html>"#,
        );
        let got = extract_video(&page);
        assert_eq!(
            got,
            ExtractedVideo {
                caption: Some("payload caption".to_string()),
                views: Some("45000".to_string()),
                likes: Some("1500".to_string()),
                shares: Some("0".to_string()),
                comments: Some("12".to_string()),
                posted_at: Some("2023-11-14T22:13:20Z".to_string()),
            }
        );
    }

    #[test]
    fn test_visible_counts_when_payload_missing() {
        let page = Page::parse(
            URL,
            r#"<h1 data-e2e="video-desc">First week on the ward</h1>
               <strong data-e2e="video-views">2.5M</strong>
               <strong data-e2e="like-count">1.2K</strong>"#,
        );
        let record = extract_video(&page).into_record("nurses", URL);
        assert_eq!(
            record,
            VideoRecord {
                hashtag: "nurses".to_string(),
                source_url: URL.to_string(),
                author_handle: "nurse.amy".to_string(),
                caption: "First week on the ward".to_string(),
                view_count: "2500000".to_string(),
                like_count: "1200".to_string(),
                share_count: "0".to_string(),
                comment_count: None,
                posted_at: None,
            }
        );
    }

    #[test]
    fn test_caption_order_dom_then_payload_then_meta() {
        let meta = r#"<meta property="og:description" content="1.2K Likes, 30 Comments. video from amy">"#;
        let payload = r#"<script>{"itemStruct":{"desc":"payload caption"}}</script>"#;

        let page = Page::parse(URL, format!("<head>{meta}{payload}</head>"));
        assert_eq!(extract_video(&page).caption.as_deref(), Some("payload caption"));

        let page = Page::parse(
            URL,
            format!(r#"<head>{meta}{payload}</head><body><h1 data-e2e="video-desc">visible caption</h1></body>"#),
        );
        assert_eq!(extract_video(&page).caption.as_deref(), Some("visible caption"));

        let page = Page::parse(URL, format!("<head>{meta}</head>"));
        assert_eq!(
            extract_video(&page).caption.as_deref(),
            Some("1.2K Likes, 30 Comments. video from amy")
        );
    }

    #[test]
    fn test_empty_page_gets_defaults() {
        let record = extract_video(&Page::parse("https://x.test/p", "")).into_record("t", "https://x.test/p");
        assert_eq!(record.author_handle, UNKNOWN_AUTHOR);
        assert_eq!(record.caption, NO_CAPTION);
        assert_eq!(record.view_count, ZERO_COUNT);
        assert_eq!(record.comment_count, None);
    }
}
