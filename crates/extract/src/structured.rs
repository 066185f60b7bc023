// ABOUTME: Pattern scan of the JSON payload that video pages embed for client-side hydration.
// ABOUTME: Pulls play/like/share/comment counters, the description, and the creation time.

//! Embedded payload scan.
//!
//! Video pages ship the item being viewed as JSON inside a script tag. Its
//! counters are exact integers, unlike the abbreviated visible text, so they
//! are preferred whenever they carry any non-zero value. The payload shape
//! moves around between deploys, so keys are found by pattern rather than by
//! walking a fixed path.

use once_cell::sync::Lazy;
use regex::Regex;

/// Marker of the viewed item's own record; later occurrences of the same keys
/// usually belong to recommended videos.
const ITEM_ANCHOR: &str = "\"itemStruct\"";

fn counter_re(key: &str) -> Regex {
    Regex::new(&format!(r#""{key}"\s*:\s*"?(\d+)"?"#)).expect("valid counter regex")
}

static PLAY_COUNT_RE: Lazy<Regex> = Lazy::new(|| counter_re("playCount"));
static DIGG_COUNT_RE: Lazy<Regex> = Lazy::new(|| counter_re("diggCount"));
static SHARE_COUNT_RE: Lazy<Regex> = Lazy::new(|| counter_re("shareCount"));
static COMMENT_COUNT_RE: Lazy<Regex> = Lazy::new(|| counter_re("commentCount"));
static CREATE_TIME_RE: Lazy<Regex> = Lazy::new(|| counter_re("createTime"));
static DESC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""desc"\s*:\s*"((?:[^"\\]|\\.)*)""#).expect("valid desc regex")
});

/// Values found in the embedded payload. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbeddedStats {
    pub plays: Option<u64>,
    pub likes: Option<u64>,
    pub shares: Option<u64>,
    pub comments: Option<u64>,
    pub description: Option<String>,
    /// Unix seconds.
    pub created_at: Option<i64>,
}

impl EmbeddedStats {
    /// True when any engagement counter is present and non-zero.
    pub fn has_nonzero_counts(&self) -> bool {
        [self.plays, self.likes, self.shares, self.comments]
            .iter()
            .any(|c| c.is_some_and(|n| n > 0))
    }
}

fn capture_u64(re: &Regex, haystack: &str) -> Option<u64> {
    re.captures(haystack)?.get(1)?.as_str().parse().ok()
}

/// Decodes a JSON string body (without quotes), falling back to the raw text.
fn decode_json_string(body: &str) -> String {
    serde_json::from_str::<String>(&format!("\"{body}\"")).unwrap_or_else(|_| body.to_string())
}

/// Scans raw page markup for the embedded item payload.
pub fn scan_embedded(markup: &str) -> EmbeddedStats {
    let scope = markup
        .find(ITEM_ANCHOR)
        .map_or(markup, |start| &markup[start..]);

    let description = DESC_RE
        .captures(scope)
        .and_then(|c| c.get(1))
        .map(|m| decode_json_string(m.as_str()))
        .map(|d| d.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|d| !d.is_empty());

    EmbeddedStats {
        plays: capture_u64(&PLAY_COUNT_RE, scope),
        likes: capture_u64(&DIGG_COUNT_RE, scope),
        shares: capture_u64(&SHARE_COUNT_RE, scope),
        comments: capture_u64(&COMMENT_COUNT_RE, scope),
        description,
        created_at: capture_u64(&CREATE_TIME_RE, scope).and_then(|t| i64::try_from(t).ok()),
    }
}
