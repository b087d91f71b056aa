// ABOUTME: Resource fetching: the Fetcher trait and its reqwest-backed HttpFetcher.
// ABOUTME: Handles scheme checks, the optional private-network guard, size limits and charset decoding.

use std::collections::HashMap;
use std::net::IpAddr;

use async_trait::async_trait;
use bytes::Bytes;
use ipnet::{Ipv4Net, Ipv6Net};
use once_cell::sync::Lazy;

use crate::error::ScrapeError;
use crate::options::Options;

/// Maximum allowed content length (10 MB).
pub const MAX_CONTENT_LENGTH: usize = 10 * 1024 * 1024;

/// Result of a successful fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub status: u16,
    pub url: String,
    pub final_url: String,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl FetchResult {
    /// Decode the body as text, using the content-type charset or detection.
    pub fn text(&self) -> String {
        decode_body(&self.body, self.content_type.as_deref())
    }
}

/// A single-attempt asynchronous GET.
///
/// Implementations return `ScrapeError::Fetch` for transport failures and
/// for any non-2xx status. No retries, no implicit timeout.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn get(&self, url: &str) -> Result<FetchResult, ScrapeError>;
}

/// Options for the default HTTP fetcher.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub headers: HashMap<String, String>,
    pub allow_private_networks: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            headers: HashMap::new(),
            allow_private_networks: true,
        }
    }
}

/// [`Fetcher`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    opts: FetchOptions,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client, opts: FetchOptions) -> Self {
        Self { client, opts }
    }

    /// Build the fetcher described by scraper [`Options`].
    pub fn from_options(opts: &Options) -> Result<Self, ScrapeError> {
        let client = match &opts.http_client {
            Some(client) => client.clone(),
            None => {
                let mut builder = reqwest::Client::builder()
                    .user_agent(&opts.user_agent)
                    .gzip(true)
                    .brotli(true)
                    .deflate(true);
                if let Some(timeout) = opts.timeout {
                    builder = builder.timeout(timeout);
                }
                builder.build().map_err(|e| {
                    ScrapeError::invalid_argument(format!("failed to build HTTP client: {}", e))
                })?
            }
        };
        Ok(Self::new(
            client,
            FetchOptions {
                headers: opts.headers.clone(),
                allow_private_networks: opts.allow_private_networks,
            },
        ))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get(&self, url: &str) -> Result<FetchResult, ScrapeError> {
        fetch(&self.client, url, &self.opts).await
    }
}

static PRIVATE_V4: Lazy<Vec<Ipv4Net>> = Lazy::new(|| {
    [
        "10.0.0.0/8",
        "172.16.0.0/12",
        "192.168.0.0/16",
        "127.0.0.0/8",
        "169.254.0.0/16",
    ]
    .iter()
    .filter_map(|net| net.parse().ok())
    .collect()
});

static PRIVATE_V6: Lazy<Vec<Ipv6Net>> = Lazy::new(|| {
    ["fc00::/7", "fe80::/10"]
        .iter()
        .filter_map(|net| net.parse().ok())
        .collect()
});

/// Check if an IP address is in a private/reserved range.
pub(crate) fn is_private_ip(addr: &IpAddr) -> bool {
    match addr {
        IpAddr::V4(ip) => PRIVATE_V4.iter().any(|net| net.contains(ip)),
        IpAddr::V6(ip) => ip.is_loopback() || PRIVATE_V6.iter().any(|net| net.contains(ip)),
    }
}

/// Refuse hosts that are, or resolve to, private addresses.
async fn guard_private(request_url: &str, target: &url::Url) -> Result<(), ScrapeError> {
    let Some(host) = target.host_str() else {
        return Ok(());
    };
    let host = host.trim_start_matches('[').trim_end_matches(']');

    if let Ok(ip) = host.parse::<IpAddr>() {
        if is_private_ip(&ip) {
            return Err(ScrapeError::fetch(
                request_url,
                anyhow::anyhow!("private IP addresses are not allowed"),
            ));
        }
        return Ok(());
    }

    let port = target.port_or_known_default().unwrap_or(443);
    let addrs = tokio::net::lookup_host((host, port)).await.map_err(|e| {
        ScrapeError::fetch(request_url, anyhow::anyhow!("DNS lookup failed: {}", e))
    })?;
    for socket_addr in addrs {
        if is_private_ip(&socket_addr.ip()) {
            return Err(ScrapeError::fetch(
                request_url,
                anyhow::anyhow!("{} resolves to a private address", host),
            ));
        }
    }
    Ok(())
}

/// Decode body bytes to a String using charset from content-type header or detection.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    if let Some(charset) = content_type.and_then(extract_charset) {
        if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
            let (decoded, _, _) = encoding.decode(body);
            return decoded.into_owned();
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

/// Extract charset value from Content-Type header.
fn extract_charset(content_type: &str) -> Option<String> {
    let lower = content_type.to_lowercase();
    lower.split(';').find_map(|part| {
        part.trim()
            .strip_prefix("charset=")
            .map(|charset| charset.trim_matches('"').trim_matches('\'').to_string())
    })
}

/// Fetch a resource from the given URL with a single GET.
pub async fn fetch(
    client: &reqwest::Client,
    url: &str,
    opts: &FetchOptions,
) -> Result<FetchResult, ScrapeError> {
    let parsed_url = url::Url::parse(url)
        .map_err(|e| ScrapeError::invalid_argument(format!("invalid URL {}: {}", url, e)))?;

    let scheme = parsed_url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(ScrapeError::invalid_argument(format!(
            "scheme must be http or https: {}",
            url
        )));
    }

    if !opts.allow_private_networks {
        guard_private(url, &parsed_url).await?;
    }

    let mut request = client.get(parsed_url);
    for (key, value) in &opts.headers {
        request = request.header(key, value);
    }

    tracing::debug!(url, "fetching page");
    let response = request
        .send()
        .await
        .map_err(|e| ScrapeError::fetch(url, anyhow::anyhow!("request failed: {}", e)))?;

    // Redirects may land somewhere the initial host check did not cover.
    if !opts.allow_private_networks {
        guard_private(url, response.url()).await?;
    }

    let status = response.status();
    if !status.is_success() {
        return Err(ScrapeError::status(url, status.as_u16()));
    }

    if let Some(len) = response.content_length() {
        if len as usize > MAX_CONTENT_LENGTH {
            return Err(ScrapeError::fetch(url, anyhow::anyhow!("content too large")));
        }
    }

    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_lowercase());

    let body = response
        .bytes()
        .await
        .map_err(|e| ScrapeError::fetch(url, anyhow::anyhow!("failed to read body: {}", e)))?;

    if body.len() > MAX_CONTENT_LENGTH {
        return Err(ScrapeError::fetch(url, anyhow::anyhow!("content too large")));
    }

    tracing::debug!(url, status = status.as_u16(), bytes = body.len(), "fetched page");
    Ok(FetchResult {
        status: status.as_u16(),
        url: url.to_string(),
        final_url,
        content_type,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use pretty_assertions::assert_eq;

    fn create_test_client() -> reqwest::Client {
        reqwest::Client::builder()
            .user_agent("test-agent")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_ok_utf8() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/test");
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body("<p>hello</p>");
        });

        let result = fetch(
            &create_test_client(),
            &server.url("/test"),
            &FetchOptions::default(),
        )
        .await;
        mock.assert();

        let result = result.expect("fetch should succeed");
        assert_eq!(result.status, 200);
        assert_eq!(result.content_type.as_deref(), Some("text/html; charset=utf-8"));
        assert_eq!(result.text(), "<p>hello</p>");
    }

    #[tokio::test]
    async fn test_fetch_non_2xx_is_fetch_error() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/notfound");
            then.status(404).body("not found");
        });

        let err = fetch(
            &create_test_client(),
            &server.url("/notfound"),
            &FetchOptions::default(),
        )
        .await
        .expect_err("should fail on 404");
        mock.assert();

        assert!(err.is_fetch());
        assert_eq!(err.http_status(), Some(404));
    }

    #[tokio::test]
    async fn test_fetch_2xx_other_than_200_accepted() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/partial");
            then.status(203).body("ok");
        });

        let result = fetch(
            &create_test_client(),
            &server.url("/partial"),
            &FetchOptions::default(),
        )
        .await
        .expect("203 is a success status");
        assert_eq!(result.status, 203);
    }

    #[tokio::test]
    async fn test_fetch_sends_custom_headers() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/h").header("x-probe", "1");
            then.status(200).body("ok");
        });

        let mut opts = FetchOptions::default();
        opts.headers.insert("x-probe".to_string(), "1".to_string());
        fetch(&create_test_client(), &server.url("/h"), &opts)
            .await
            .expect("fetch should succeed");
        mock.assert();
    }

    #[tokio::test]
    async fn test_private_ip_block() {
        let server = MockServer::start();
        let opts = FetchOptions {
            allow_private_networks: false,
            ..Default::default()
        };

        let url = format!("http://127.0.0.1:{}/test", server.port());
        let err = fetch(&create_test_client(), &url, &opts)
            .await
            .expect_err("should fail on private IP");
        assert!(err.is_fetch());
        assert_eq!(err.http_status(), None);
    }

    #[tokio::test]
    async fn test_unsupported_scheme() {
        let err = fetch(
            &create_test_client(),
            "ftp://example.com/file",
            &FetchOptions::default(),
        )
        .await
        .expect_err("ftp is not fetchable");
        assert!(err.is_invalid_argument());
    }

    #[tokio::test]
    async fn test_connection_refused_is_fetch_error() {
        // Bind and drop to get a port nothing listens on.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let err = fetch(
            &create_test_client(),
            &format!("http://127.0.0.1:{}/", port),
            &FetchOptions::default(),
        )
        .await
        .expect_err("nothing is listening");
        assert!(err.is_fetch());
    }

    #[test]
    fn test_max_content_length_constant() {
        assert_eq!(MAX_CONTENT_LENGTH, 10 * 1024 * 1024);
    }

    #[test]
    fn test_is_private_ip() {
        assert!(is_private_ip(&"10.0.0.1".parse().unwrap()));
        assert!(is_private_ip(&"172.31.255.255".parse().unwrap()));
        assert!(is_private_ip(&"192.168.1.1".parse().unwrap()));
        assert!(is_private_ip(&"127.0.0.1".parse().unwrap()));
        assert!(is_private_ip(&"169.254.0.1".parse().unwrap()));
        assert!(is_private_ip(&"::1".parse().unwrap()));
        assert!(is_private_ip(&"fd00::1".parse().unwrap()));
        assert!(is_private_ip(&"fe80::1".parse().unwrap()));

        assert!(!is_private_ip(&"8.8.8.8".parse().unwrap()));
        assert!(!is_private_ip(&"172.32.0.1".parse().unwrap()));
        assert!(!is_private_ip(&"2001:4860:4860::8888".parse().unwrap()));
    }

    #[test]
    fn test_decode_iso_8859_1_with_charset() {
        let iso_bytes: &[u8] = &[0x63, 0x61, 0x66, 0xe9];
        let decoded = decode_body(iso_bytes, Some("text/html; charset=iso-8859-1"));
        assert_eq!(decoded, "café");
    }

    #[test]
    fn test_extract_charset() {
        assert_eq!(
            extract_charset("text/html; charset=utf-8"),
            Some("utf-8".to_string())
        );
        assert_eq!(
            extract_charset("text/html; charset=\"ISO-8859-1\""),
            Some("iso-8859-1".to_string())
        );
        assert_eq!(extract_charset("text/html"), None);
    }
}
