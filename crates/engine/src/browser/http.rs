// ABOUTME: HttpBrowser implements Browser over reqwest, with a direct and a Browserless backend.
// ABOUTME: It holds the last loaded page so content() can be read repeatedly without refetching.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use super::fetch::{fetch_page, parse_target};
use super::Browser;
use crate::error::CrawlError;
use crate::options::{CrawlOptions, RenderBackend};

#[derive(Debug, Clone)]
struct Loaded {
    url: String,
    markup: String,
}

/// A [`Browser`] that loads pages over HTTP.
///
/// With [`RenderBackend::Direct`] it reads the server-rendered source, which
/// already carries the embedded item payload. With
/// [`RenderBackend::Browserless`] a remote headless browser renders the page.
/// Both produce static snapshots, so scrolling is a no-op; use
/// `ChromeBrowser` (feature `chrome`) when feeds must lazy-load.
pub struct HttpBrowser {
    client: reqwest::Client,
    backend: RenderBackend,
    allow_private_networks: bool,
    current: Option<Loaded>,
}

impl HttpBrowser {
    pub fn new(opts: &CrawlOptions) -> Result<Self, CrawlError> {
        let client = reqwest::Client::builder()
            .user_agent(opts.user_agent.clone())
            .cookie_store(true)
            .build()
            .map_err(|e| {
                CrawlError::config("http client", "BuildClient", Some(anyhow::Error::new(e)))
            })?;
        Ok(Self::with_client(client, opts))
    }

    /// Uses a caller-supplied reqwest client.
    pub fn with_client(client: reqwest::Client, opts: &CrawlOptions) -> Self {
        Self {
            client,
            backend: opts.backend.clone(),
            allow_private_networks: opts.allow_private_networks,
            current: None,
        }
    }

    async fn load(&self, url: &str) -> Result<Loaded, CrawlError> {
        match &self.backend {
            RenderBackend::Direct => {
                let page = fetch_page(&self.client, url, self.allow_private_networks).await?;
                Ok(Loaded {
                    url: page.final_url,
                    markup: page.markup,
                })
            }
            RenderBackend::Browserless { endpoint, token } => {
                parse_target(url)?;
                let markup = self.render(endpoint, token.as_deref(), url).await?;
                Ok(Loaded {
                    url: url.to_string(),
                    markup,
                })
            }
        }
    }

    /// Fetches rendered HTML from a Browserless `/content` endpoint.
    async fn render(
        &self,
        endpoint: &str,
        token: Option<&str>,
        url: &str,
    ) -> Result<String, CrawlError> {
        let mut content_url = Url::parse(&format!("{}/content", endpoint.trim_end_matches('/')))
            .map_err(|e| {
                CrawlError::config(
                    endpoint,
                    "Render",
                    Some(anyhow::anyhow!("invalid Browserless endpoint: {}", e)),
                )
            })?;
        if let Some(token) = token {
            content_url.query_pairs_mut().append_pair("token", token);
        }

        let resp = self
            .client
            .post(content_url)
            .json(&serde_json::json!({ "url": url }))
            .send()
            .await
            .map_err(|e| CrawlError::from_request(url, "Render", e))?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(CrawlError::render(
                url,
                "Render",
                Some(anyhow::anyhow!("status {}: {}", status.as_u16(), message.trim())),
            ));
        }

        resp.text()
            .await
            .map_err(|e| CrawlError::from_request(url, "Render", e))
    }
}

#[async_trait]
impl Browser for HttpBrowser {
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), CrawlError> {
        let loaded = tokio::time::timeout(timeout, self.load(url))
            .await
            .map_err(|_| {
                CrawlError::timeout(
                    url,
                    "Goto",
                    Some(anyhow::anyhow!("no response within {} ms", timeout.as_millis())),
                )
            })??;
        debug!(url, bytes = loaded.markup.len(), "page loaded");
        self.current = Some(loaded);
        Ok(())
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), CrawlError> {
        debug!("static snapshot, nothing to scroll");
        Ok(())
    }

    async fn content(&mut self) -> Result<String, CrawlError> {
        self.current
            .as_ref()
            .map(|loaded| loaded.markup.clone())
            .ok_or_else(|| CrawlError::navigation("", "Content", Some(anyhow::anyhow!("no page loaded"))))
    }

    fn current_url(&self) -> Option<&str> {
        self.current.as_ref().map(|loaded| loaded.url.as_str())
    }
}
