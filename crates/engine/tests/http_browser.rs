// ABOUTME: Tests for HttpBrowser against mock HTTP servers.
// ABOUTME: Exercises the direct backend, the Browserless backend, timeouts, and the private network guard.

use std::time::Duration;

use clipcrawl::{Browser, CrawlerBuilder, HttpBrowser, RenderBackend};
use httpmock::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::json;

const FEED: &str = r#"<html><body><a href="/@amy/video/1">watch</a></body></html>"#;

fn browser(backend: RenderBackend, allow_private: bool) -> HttpBrowser {
    let opts = CrawlerBuilder::new()
        .backend(backend)
        .allow_private_networks(allow_private)
        .options();
    HttpBrowser::new(&opts).expect("client builds")
}

#[tokio::test]
async fn direct_backend_serves_page_source() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/tag/nurses");
        then.status(200)
            .header("content-type", "text/html; charset=utf-8")
            .body(FEED);
    });

    let mut browser = browser(RenderBackend::Direct, true);
    assert_eq!(browser.current_url(), None);

    let url = server.url("/tag/nurses");
    browser.goto(&url, Duration::from_secs(5)).await.expect("goto succeeds");
    mock.assert();

    assert_eq!(browser.current_url(), Some(url.as_str()));
    assert_eq!(browser.content().await.unwrap(), FEED);
    // scrolling a static snapshot changes nothing
    browser.scroll_to_bottom().await.unwrap();
    assert_eq!(browser.content().await.unwrap(), FEED);
}

#[tokio::test]
async fn direct_backend_reports_http_errors_as_navigation() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/tag/gone");
        then.status(503);
    });

    let mut browser = browser(RenderBackend::Direct, true);
    let err = browser
        .goto(&server.url("/tag/gone"), Duration::from_secs(5))
        .await
        .unwrap_err();
    assert!(err.is_navigation());
    assert!(browser.content().await.is_err());
}

#[tokio::test]
async fn slow_page_times_out() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/slow");
        then.status(200).body(FEED).delay(Duration::from_secs(3));
    });

    let mut browser = browser(RenderBackend::Direct, true);
    let err = browser
        .goto(&server.url("/slow"), Duration::from_millis(200))
        .await
        .unwrap_err();
    assert!(err.is_timeout());
}

#[tokio::test]
async fn private_network_blocked_by_default() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/tag/nurses");
        then.status(200).body(FEED);
    });

    let mut browser = browser(RenderBackend::Direct, false);
    let err = browser
        .goto(&server.url("/tag/nurses"), Duration::from_secs(5))
        .await
        .unwrap_err();
    assert!(err.is_ssrf());
    assert_eq!(mock.calls(), 0);
}

#[tokio::test]
async fn browserless_backend_posts_target_url() {
    let server = MockServer::start();
    let target = "https://www.tiktok.com/tag/nurses";
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/content")
            .query_param("token", "secret")
            .json_body(json!({ "url": target }));
        then.status(200)
            .header("content-type", "text/html")
            .body(FEED);
    });

    let mut browser = browser(
        RenderBackend::Browserless {
            endpoint: server.base_url(),
            token: Some("secret".to_string()),
        },
        false,
    );
    browser.goto(target, Duration::from_secs(5)).await.expect("render succeeds");
    mock.assert();

    assert_eq!(browser.current_url(), Some(target));
    assert_eq!(browser.content().await.unwrap(), FEED);
}

#[tokio::test]
async fn browserless_token_is_percent_encoded() {
    let server = MockServer::start();
    let token = "a&b=c/d";
    let mock = server.mock(|when, then| {
        when.method(POST).path("/content").query_param("token", token);
        then.status(200).body(FEED);
    });

    let mut browser = browser(
        RenderBackend::Browserless {
            endpoint: server.base_url(),
            token: Some(token.to_string()),
        },
        false,
    );
    browser
        .goto("https://www.tiktok.com/tag/nurses", Duration::from_secs(5))
        .await
        .expect("render succeeds");
    mock.assert();
}

#[tokio::test]
async fn browserless_failure_is_render_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/content");
        then.status(429).body("too many requests");
    });

    let mut browser = browser(
        RenderBackend::Browserless {
            endpoint: format!("{}/", server.base_url()),
            token: None,
        },
        false,
    );
    let err = browser
        .goto("https://www.tiktok.com/tag/nurses", Duration::from_secs(5))
        .await
        .unwrap_err();
    assert!(err.is_render());
    assert!(err.to_string().contains("too many requests"));
}

#[tokio::test]
async fn invalid_url_is_rejected_before_any_request() {
    let mut browser = browser(RenderBackend::Direct, true);
    let err = browser
        .goto("ftp://example.com/file", Duration::from_secs(5))
        .await
        .unwrap_err();
    assert!(err.is_invalid_url());
}
