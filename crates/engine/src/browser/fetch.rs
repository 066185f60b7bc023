// ABOUTME: Page source fetching with SSRF protection, content-length limits, and charset decoding.
// ABOUTME: Backs the direct rendering mode of HttpBrowser.

use std::net::IpAddr;

use bytes::Bytes;
use ipnet::IpNet;
use once_cell::sync::Lazy;
use url::Url;

use crate::error::CrawlError;

/// Maximum allowed page size (10 MB).
pub const MAX_CONTENT_LENGTH: usize = 10 * 1024 * 1024;

const OP: &str = "Goto";

static PRIVATE_RANGES: Lazy<Vec<IpNet>> = Lazy::new(|| {
    [
        // "This" network
        "0.0.0.0/8",
        // RFC1918
        "10.0.0.0/8",
        "172.16.0.0/12",
        "192.168.0.0/16",
        // Loopback
        "127.0.0.0/8",
        // Carrier-grade NAT
        "100.64.0.0/10",
        // Link-local
        "169.254.0.0/16",
        // IPv4-mapped
        "::ffff:0:0/96",
        // Unique local
        "fc00::/7",
        "fe80::/10",
    ]
    .iter()
    .filter_map(|cidr| cidr.parse().ok())
    .collect()
});

/// Check if an IP address is in a private/reserved range.
///
/// IPv4-mapped IPv6 addresses are judged by the IPv4 address they carry.
pub fn is_private_ip(addr: &IpAddr) -> bool {
    let addr = match addr {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map_or(*addr, IpAddr::V4),
        IpAddr::V4(_) => *addr,
    };
    addr.is_loopback()
        || addr.is_unspecified()
        || PRIVATE_RANGES.iter().any(|net| net.contains(&addr))
}

/// Parses `url` and requires an http(s) scheme.
pub(crate) fn parse_target(url: &str) -> Result<Url, CrawlError> {
    if url.is_empty() {
        return Err(CrawlError::invalid_url(url, OP, None));
    }
    let parsed = Url::parse(url).map_err(|e| {
        CrawlError::invalid_url(url, OP, Some(anyhow::anyhow!("invalid URL: {}", e)))
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        _ => Err(CrawlError::invalid_url(
            url,
            OP,
            Some(anyhow::anyhow!("scheme must be http or https")),
        )),
    }
}

/// Rejects hosts that are, or resolve to, private addresses.
pub(crate) async fn ensure_public(target: &Url, url: &str, reason: &str) -> Result<(), CrawlError> {
    let Some(host) = target.host_str() else {
        return Ok(());
    };
    let host = host.trim_start_matches('[').trim_end_matches(']');

    if let Ok(ip) = host.parse::<IpAddr>() {
        if is_private_ip(&ip) {
            return Err(CrawlError::ssrf(
                url,
                OP,
                Some(anyhow::anyhow!("{}", reason)),
            ));
        }
        return Ok(());
    }

    let port = target.port_or_known_default().unwrap_or(80);
    let addrs = tokio::net::lookup_host((host, port)).await.map_err(|e| {
        CrawlError::navigation(
            url,
            OP,
            Some(anyhow::anyhow!("DNS lookup failed: {}", e)),
        )
    })?;

    for socket_addr in addrs {
        if is_private_ip(&socket_addr.ip()) {
            return Err(CrawlError::ssrf(
                url,
                OP,
                Some(anyhow::anyhow!("{}", reason)),
            ));
        }
    }
    Ok(())
}

/// Decode body bytes to a String using charset from content-type header or detection.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    if let Some(encoding) = content_type
        .and_then(extract_charset)
        .and_then(|charset| encoding_rs::Encoding::for_label(charset.as_bytes()))
    {
        let (decoded, _, _) = encoding.decode(body);
        return decoded.into_owned();
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

/// Extract charset value from Content-Type header.
fn extract_charset(content_type: &str) -> Option<String> {
    content_type.to_lowercase().split(';').find_map(|part| {
        part.trim()
            .strip_prefix("charset=")
            .map(|c| c.trim_matches('"').trim_matches('\'').to_string())
    })
}

/// A fetched page: final URL after redirects plus decoded markup.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub final_url: String,
    pub markup: String,
}

/// GETs `url` and returns its decoded markup.
pub async fn fetch_page(
    client: &reqwest::Client,
    url: &str,
    allow_private_networks: bool,
) -> Result<FetchedPage, CrawlError> {
    let target = parse_target(url)?;
    if !allow_private_networks {
        ensure_public(&target, url, "private IP addresses are not allowed").await?;
    }

    let response = client
        .get(target.as_str())
        .send()
        .await
        .map_err(|e| CrawlError::from_request(url, OP, e))?;

    if !allow_private_networks {
        let final_target = response.url().clone();
        ensure_public(&final_target, url, "redirect to private IP address is not allowed")
            .await?;
    }

    if let Some(len) = response.content_length() {
        if len as usize > MAX_CONTENT_LENGTH {
            return Err(CrawlError::navigation(
                url,
                OP,
                Some(anyhow::anyhow!("content too large")),
            ));
        }
    }

    let status = response.status().as_u16();
    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_lowercase);

    let body: Bytes = response
        .bytes()
        .await
        .map_err(|e| CrawlError::from_request(url, OP, e))?;

    if body.len() > MAX_CONTENT_LENGTH {
        return Err(CrawlError::navigation(
            url,
            OP,
            Some(anyhow::anyhow!("content too large")),
        ));
    }

    if status != 200 {
        return Err(CrawlError::navigation(
            url,
            OP,
            Some(anyhow::anyhow!("HTTP status {}", status)),
        ));
    }

    Ok(FetchedPage {
        final_url,
        markup: decode_body(&body, content_type.as_deref()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn create_test_client() -> reqwest::Client {
        reqwest::Client::builder()
            .user_agent("test-agent")
            .build()
            .unwrap()
    }

    #[test]
    fn test_private_ranges() {
        for ip in ["10.1.2.3", "172.20.0.1", "192.168.1.1", "127.0.0.1", "169.254.1.1", "::1", "fd00::1"] {
            assert!(is_private_ip(&ip.parse().unwrap()), "{ip} should be private");
        }
        for ip in ["8.8.8.8", "172.32.0.1", "2606:4700::1111", "::ffff:8.8.8.8"] {
            assert!(!is_private_ip(&ip.parse().unwrap()), "{ip} should be public");
        }
    }

    #[test]
    fn test_mapped_and_unspecified_addresses_are_private() {
        for ip in [
            "::ffff:127.0.0.1",
            "::ffff:169.254.169.254",
            "::ffff:10.0.0.1",
            "0.0.0.0",
            "0.1.2.3",
            "::",
            "100.64.0.1",
        ] {
            assert!(is_private_ip(&ip.parse().unwrap()), "{ip} should be private");
        }
    }

    #[test]
    fn test_extract_charset() {
        assert_eq!(
            extract_charset("text/html; charset=\"ISO-8859-1\"").as_deref(),
            Some("iso-8859-1")
        );
        assert_eq!(extract_charset("text/html"), None);
    }

    #[test]
    fn test_decode_latin1_by_header() {
        let body = [0x63, 0x61, 0x66, 0xe9];
        assert_eq!(decode_body(&body, Some("text/html; charset=iso-8859-1")), "café");
    }

    #[test]
    fn test_parse_target_rejects_other_schemes() {
        assert!(parse_target("ftp://example.com/x").unwrap_err().is_invalid_url());
        assert!(parse_target("").unwrap_err().is_invalid_url());
        assert!(parse_target("not a url").unwrap_err().is_invalid_url());
    }

    #[tokio::test]
    async fn test_fetch_ok_utf8() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/tag/nurses");
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body("<html><body>hello</body></html>");
        });

        let client = create_test_client();
        let page = fetch_page(&client, &server.url("/tag/nurses"), true)
            .await
            .expect("fetch should succeed");
        mock.assert();
        assert!(page.markup.contains("hello"));
        assert!(page.final_url.ends_with("/tag/nurses"));
    }

    #[tokio::test]
    async fn test_fetch_non_200_rejected() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/missing");
            then.status(404).body("not found");
        });

        let client = create_test_client();
        let err = fetch_page(&client, &server.url("/missing"), true)
            .await
            .expect_err("should fail on 404");
        mock.assert();
        assert!(err.is_navigation());
    }

    #[tokio::test]
    async fn test_fetch_blocks_loopback_by_default() {
        let server = MockServer::start();
        let client = create_test_client();
        let err = fetch_page(&client, &server.url("/tag/x"), false)
            .await
            .expect_err("loopback should be blocked");
        assert!(err.is_ssrf());
    }

    #[tokio::test]
    async fn test_fetch_blocks_mapped_loopback_and_unspecified_hosts() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/@amy/video/1");
            then.status(200).body("secret");
        });

        let client = create_test_client();
        for host in ["[::ffff:127.0.0.1]", "0.0.0.0", "[::]"] {
            let url = format!("http://{host}:{}/@amy/video/1", server.port());
            let err = fetch_page(&client, &url, false)
                .await
                .expect_err("private host should be blocked");
            assert!(err.is_ssrf(), "{url} should be rejected as SSRF");
        }
        assert_eq!(mock.calls(), 0);
    }
}
