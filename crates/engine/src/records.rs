// ABOUTME: Output record types: one VideoRecord per visited item and its CommentRecords.
// ABOUTME: Serde renames give the CSV column names; RunSummary is the run-level JSON summary.

use serde::{Deserialize, Serialize};

pub const UNKNOWN_AUTHOR: &str = "Unknown";
pub const NO_CAPTION: &str = "No caption";
pub const ZERO_COUNT: &str = "0";

/// One visited video. Identity is `source_url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub hashtag: String,
    #[serde(rename = "video_url")]
    pub source_url: String,
    #[serde(rename = "username")]
    pub author_handle: String,
    pub caption: String,
    #[serde(rename = "views")]
    pub view_count: String,
    #[serde(rename = "likes")]
    pub like_count: String,
    #[serde(rename = "shares")]
    pub share_count: String,
    /// Absent when no source on the page carried a comment count.
    #[serde(rename = "comments")]
    pub comment_count: Option<String>,
    /// RFC 3339 UTC.
    pub posted_at: Option<String>,
}

/// One top-level comment on a video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRecord {
    #[serde(rename = "video_url")]
    pub source_url: String,
    #[serde(rename = "comment_author")]
    pub author_handle: String,
    #[serde(rename = "comment_text")]
    pub text: String,
    #[serde(rename = "comment_likes")]
    pub like_count: String,
}

/// Totals over a whole run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_videos: usize,
    pub total_comments: usize,
    pub hashtags_scraped: usize,
    pub avg_comments_per_video: f64,
    pub total_views: u64,
    pub total_likes: u64,
    pub unique_users: usize,
    pub videos_with_captions: usize,
}
