// ABOUTME: Error types for the crawl engine: an ErrorCode category plus the CrawlError struct.
// ABOUTME: Every error names the operation and URL or path it concerns, with an optional cause.

use std::fmt;

/// Categories of crawl failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidUrl,
    Navigation,
    Timeout,
    Ssrf,
    Render,
    Output,
    Config,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::InvalidUrl => "invalid URL",
            ErrorCode::Navigation => "navigation failed",
            ErrorCode::Timeout => "timeout",
            ErrorCode::Ssrf => "private network blocked",
            ErrorCode::Render => "render service error",
            ErrorCode::Output => "output error",
            ErrorCode::Config => "configuration error",
        };
        write!(f, "{}", s)
    }
}

/// The error type shared by the navigation, persistence, and config layers.
#[derive(Debug, thiserror::Error)]
pub struct CrawlError {
    pub code: ErrorCode,
    /// URL, file path, or other target of the failed operation.
    pub target: String,
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for CrawlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "clipcrawl: {} {}: {}", self.op, self.target, self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl CrawlError {
    fn new(
        code: ErrorCode,
        target: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code,
            target: target.into(),
            op: op.into(),
            source,
        }
    }

    pub fn invalid_url(
        target: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::InvalidUrl, target, op, source)
    }

    pub fn navigation(
        target: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Navigation, target, op, source)
    }

    pub fn timeout(
        target: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Timeout, target, op, source)
    }

    pub fn ssrf(
        target: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Ssrf, target, op, source)
    }

    pub fn render(
        target: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Render, target, op, source)
    }

    pub fn output(
        target: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Output, target, op, source)
    }

    pub fn config(
        target: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Config, target, op, source)
    }

    /// Maps a reqwest failure to Timeout or Navigation.
    pub fn from_request(target: impl Into<String>, op: impl Into<String>, err: reqwest::Error) -> Self {
        let code = if err.is_timeout() {
            ErrorCode::Timeout
        } else {
            ErrorCode::Navigation
        };
        Self::new(code, target, op, Some(anyhow::Error::new(err)))
    }

    pub fn is_timeout(&self) -> bool {
        self.code == ErrorCode::Timeout
    }

    pub fn is_navigation(&self) -> bool {
        self.code == ErrorCode::Navigation
    }

    pub fn is_ssrf(&self) -> bool {
        self.code == ErrorCode::Ssrf
    }

    pub fn is_invalid_url(&self) -> bool {
        self.code == ErrorCode::InvalidUrl
    }

    pub fn is_render(&self) -> bool {
        self.code == ErrorCode::Render
    }

    pub fn is_output(&self) -> bool {
        self.code == ErrorCode::Output
    }

    pub fn is_config(&self) -> bool {
        self.code == ErrorCode::Config
    }
}
