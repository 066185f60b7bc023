// ABOUTME: Persistence of run results: timestamped CSV tables for videos and comments plus a JSON summary.
// ABOUTME: Empty tables are skipped with a warning; each write reports success or failure independently.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::aggregate::ResultSet;
use crate::error::CrawlError;
use crate::records::RunSummary;

/// Destination files for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub videos: PathBuf,
    pub comments: PathBuf,
    pub summary: PathBuf,
}

impl OutputPaths {
    /// `videos_YYYYmmdd_HHMMSS.csv`, `comments_…csv`, `summary_…json` under `dir`.
    pub fn timestamped(dir: &Path, now: DateTime<Utc>) -> Self {
        let stamp = now.format("%Y%m%d_%H%M%S");
        Self {
            videos: dir.join(format!("videos_{stamp}.csv")),
            comments: dir.join(format!("comments_{stamp}.csv")),
            summary: dir.join(format!("summary_{stamp}.json")),
        }
    }
}

/// Writes `records` as CSV with a header row; returns the number of rows written.
///
/// An empty slice writes nothing and returns `Ok(0)`.
pub fn write_csv<T: Serialize>(records: &[T], path: &Path) -> Result<usize, CrawlError> {
    if records.is_empty() {
        warn!(path = %path.display(), "no records, skipping write");
        return Ok(0);
    }

    let target = path.display().to_string();
    let err = |e: csv::Error| CrawlError::output(&target, "WriteCsv", Some(anyhow::Error::new(e)));

    let mut writer = csv::Writer::from_path(path).map_err(err)?;
    for record in records {
        writer.serialize(record).map_err(err)?;
    }
    writer.flush().map_err(|e| {
        CrawlError::output(&target, "WriteCsv", Some(anyhow::Error::new(e)))
    })?;

    info!(path = %target, rows = records.len(), "table written");
    Ok(records.len())
}

/// Writes the run summary as pretty JSON.
pub fn write_summary(summary: &RunSummary, path: &Path) -> Result<(), CrawlError> {
    let target = path.display().to_string();
    let json = serde_json::to_string_pretty(summary).map_err(|e| {
        CrawlError::output(&target, "WriteSummary", Some(anyhow::Error::new(e)))
    })?;
    fs::write(path, json).map_err(|e| {
        CrawlError::output(&target, "WriteSummary", Some(anyhow::Error::new(e)))
    })?;
    info!(path = %target, "summary written");
    Ok(())
}

/// What `persist` managed to write.
#[derive(Debug, Default)]
pub struct PersistReport {
    pub videos_written: usize,
    pub comments_written: usize,
    pub summary_written: bool,
    pub errors: Vec<CrawlError>,
}

impl PersistReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Writes every output of a run. Failures are collected, never raised.
///
/// The summary is written only when at least one video was collected.
pub fn persist(results: &ResultSet, paths: &OutputPaths) -> PersistReport {
    let mut report = PersistReport::default();

    if results.is_empty() {
        warn!("no videos collected, nothing to write");
        return report;
    }

    if let Some(dir) = paths.videos.parent() {
        if let Err(e) = fs::create_dir_all(dir) {
            report.errors.push(CrawlError::output(
                dir.display().to_string(),
                "CreateDir",
                Some(anyhow::Error::new(e)),
            ));
            return report;
        }
    }

    match write_csv(&results.videos, &paths.videos) {
        Ok(n) => report.videos_written = n,
        Err(e) => report.errors.push(e),
    }
    match write_csv(&results.comments, &paths.comments) {
        Ok(n) => report.comments_written = n,
        Err(e) => report.errors.push(e),
    }
    match write_summary(&results.summary(), &paths.summary) {
        Ok(()) => report.summary_written = true,
        Err(e) => report.errors.push(e),
    }

    for err in &report.errors {
        warn!(error = %err, "output failed");
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{CommentRecord, VideoRecord};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn video() -> VideoRecord {
        VideoRecord {
            hashtag: "nurses".to_string(),
            source_url: "https://www.tiktok.com/@amy/video/1".to_string(),
            author_handle: "amy".to_string(),
            caption: "Day one, \"finally\"".to_string(),
            view_count: "1200".to_string(),
            like_count: "30".to_string(),
            share_count: "0".to_string(),
            comment_count: None,
            posted_at: None,
        }
    }

    #[test]
    fn test_timestamped_names() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        let paths = OutputPaths::timestamped(Path::new("out"), now);
        assert_eq!(paths.videos, Path::new("out/videos_20240309_070501.csv"));
        assert_eq!(paths.comments, Path::new("out/comments_20240309_070501.csv"));
        assert_eq!(paths.summary, Path::new("out/summary_20240309_070501.json"));
    }

    #[test]
    fn test_write_csv_header_and_quoting() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("videos.csv");
        assert_eq!(write_csv(&[video()], &path).unwrap(), 1);

        let written = fs::read_to_string(&path).unwrap();
        let mut lines = written.lines();
        assert_eq!(
            lines.next(),
            Some("hashtag,video_url,username,caption,views,likes,shares,comments,posted_at")
        );
        assert_eq!(
            lines.next(),
            Some("nurses,https://www.tiktok.com/@amy/video/1,amy,\"Day one, \"\"finally\"\"\",1200,30,0,,")
        );
    }

    #[test]
    fn test_empty_table_is_not_written() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("comments.csv");
        assert_eq!(write_csv::<CommentRecord>(&[], &path).unwrap(), 0);
        assert!(!path.exists());
    }

    #[test]
    fn test_persist_writes_all_outputs() {
        let dir = TempDir::new().unwrap();
        let paths = OutputPaths::timestamped(&dir.path().join("nested"), Utc::now());
        let mut results = ResultSet::new();
        results.push_item(video(), Vec::new());

        let report = persist(&results, &paths);
        assert!(report.is_ok());
        assert_eq!(report.videos_written, 1);
        assert_eq!(report.comments_written, 0);
        assert!(report.summary_written);
        assert!(paths.videos.exists());
        assert!(!paths.comments.exists());

        let summary: RunSummary =
            serde_json::from_str(&fs::read_to_string(&paths.summary).unwrap()).unwrap();
        assert_eq!(summary.total_videos, 1);
        assert_eq!(summary.total_views, 1200);
    }

    #[test]
    fn test_persist_empty_run_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let paths = OutputPaths::timestamped(dir.path(), Utc::now());
        let report = persist(&ResultSet::new(), &paths);
        assert!(report.is_ok());
        assert!(!report.summary_written);
        assert!(!paths.videos.exists());
    }
}
