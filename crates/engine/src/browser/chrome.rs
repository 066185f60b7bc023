// ABOUTME: ChromeBrowser implements Browser over a local headless Chrome tab (feature "chrome").
// ABOUTME: Scrolling runs in the live page, so lazy-loaded feed items and comments render.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use headless_chrome::{Browser as Chrome, LaunchOptions, Tab};
use tracing::debug;

use super::fetch::{ensure_public, parse_target};
use super::Browser;
use crate::error::CrawlError;
use crate::options::CrawlOptions;

const SCROLL_TO_BOTTOM_JS: &str = "window.scrollTo(0, document.body.scrollHeight)";

/// Idle time after which Chrome shuts itself down.
const IDLE_BROWSER_TIMEOUT: Duration = Duration::from_secs(300);

type ErrorCtor = fn(String, &'static str, Option<anyhow::Error>) -> CrawlError;

/// A [`Browser`] driving one headless Chrome tab.
///
/// `headless_chrome` is blocking, so every tab call runs on tokio's blocking pool.
pub struct ChromeBrowser {
    // Keeps the Chrome process alive for as long as the tab is used.
    _chrome: Chrome,
    tab: Arc<Tab>,
    allow_private_networks: bool,
    current: Option<String>,
}

impl ChromeBrowser {
    /// Launches headless Chrome and opens a tab with the configured user agent.
    pub fn launch(opts: &CrawlOptions) -> Result<Self, CrawlError> {
        let err = |e: anyhow::Error| CrawlError::config("chrome", "Launch", Some(e));

        let launch_options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(false)
            .idle_browser_timeout(IDLE_BROWSER_TIMEOUT)
            .build()
            .map_err(|e| err(anyhow::anyhow!("invalid launch options: {}", e)))?;

        let chrome = Chrome::new(launch_options).map_err(err)?;
        let tab = chrome.new_tab().map_err(err)?;
        tab.set_user_agent(&opts.user_agent, None, None).map_err(err)?;

        Ok(Self {
            _chrome: chrome,
            tab,
            allow_private_networks: opts.allow_private_networks,
            current: None,
        })
    }

    async fn on_tab<T, F>(&self, url: &str, op: &'static str, ctor: ErrorCtor, f: F) -> Result<T, CrawlError>
    where
        T: Send + 'static,
        F: FnOnce(&Tab) -> anyhow::Result<T> + Send + 'static,
    {
        let tab = Arc::clone(&self.tab);
        tokio::task::spawn_blocking(move || f(&tab))
            .await
            .map_err(|e| ctor(url.to_string(), op, Some(anyhow::Error::new(e))))?
            .map_err(|e| ctor(url.to_string(), op, Some(e)))
    }

    fn current_or_empty(&self) -> String {
        self.current.clone().unwrap_or_default()
    }
}

#[async_trait]
impl Browser for ChromeBrowser {
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), CrawlError> {
        let target = parse_target(url)?;
        if !self.allow_private_networks {
            ensure_public(&target, url, "private IP addresses are not allowed").await?;
        }

        let navigate = self.on_tab(url, "Goto", CrawlError::navigation, move |tab| {
            tab.set_default_timeout(timeout);
            tab.navigate_to(target.as_str())?;
            tab.wait_until_navigated()?;
            Ok(tab.get_url())
        });
        let final_url = tokio::time::timeout(timeout, navigate)
            .await
            .map_err(|_| {
                CrawlError::timeout(
                    url,
                    "Goto",
                    Some(anyhow::anyhow!("no response within {} ms", timeout.as_millis())),
                )
            })??;

        if !self.allow_private_networks {
            if let Ok(landed) = url::Url::parse(&final_url) {
                ensure_public(&landed, url, "redirect to private IP address is not allowed").await?;
            }
        }
        debug!(url, final_url = %final_url, "page rendered");
        self.current = Some(final_url);
        Ok(())
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), CrawlError> {
        let url = self.current_or_empty();
        self.on_tab(&url, "Scroll", CrawlError::render, |tab| {
            tab.evaluate(SCROLL_TO_BOTTOM_JS, false)?;
            Ok(())
        })
        .await
    }

    async fn content(&mut self) -> Result<String, CrawlError> {
        if self.current.is_none() {
            return Err(CrawlError::navigation(
                "",
                "Content",
                Some(anyhow::anyhow!("no page loaded")),
            ));
        }
        let url = self.current_or_empty();
        self.on_tab(&url, "Content", CrawlError::render, |tab| tab.get_content())
            .await
    }

    fn current_url(&self) -> Option<&str> {
        self.current.as_deref()
    }
}
