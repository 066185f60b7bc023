// ABOUTME: Result aggregation across a whole run: video and comment tables plus per-hashtag reports.
// ABOUTME: Computes the RunSummary handed to persistence and printed by the CLI.

use std::collections::HashSet;

use clipcrawl_extract::parse_count;

use crate::crawler::{HashtagReport, HashtagState};
use crate::records::{CommentRecord, RunSummary, VideoRecord, NO_CAPTION, UNKNOWN_AUTHOR};

/// Append-only accumulator for one run.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    pub videos: Vec<VideoRecord>,
    pub comments: Vec<CommentRecord>,
    pub reports: Vec<HashtagReport>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one visited item and its comments.
    pub fn push_item(&mut self, video: VideoRecord, comments: Vec<CommentRecord>) {
        self.videos.push(video);
        self.comments.extend(comments);
    }

    pub fn record_hashtag(&mut self, report: HashtagReport) {
        self.reports.push(report);
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    pub fn summary(&self) -> RunSummary {
        let total_videos = self.videos.len();
        let total_comments = self.comments.len();
        let avg_comments_per_video = if total_videos == 0 {
            0.0
        } else {
            total_comments as f64 / total_videos as f64
        };

        let unique_users = self
            .videos
            .iter()
            .map(|v| v.author_handle.as_str())
            .filter(|handle| *handle != UNKNOWN_AUTHOR)
            .collect::<HashSet<_>>()
            .len();

        RunSummary {
            total_videos,
            total_comments,
            hashtags_scraped: self
                .reports
                .iter()
                .filter(|r| r.state == HashtagState::Done)
                .count(),
            avg_comments_per_video,
            total_views: self
                .videos
                .iter()
                .map(|v| parse_count(&v.view_count))
                .fold(0u64, u64::saturating_add),
            total_likes: self
                .videos
                .iter()
                .map(|v| parse_count(&v.like_count))
                .fold(0u64, u64::saturating_add),
            unique_users,
            videos_with_captions: self
                .videos
                .iter()
                .filter(|v| v.caption != NO_CAPTION)
                .count(),
        }
    }
}
