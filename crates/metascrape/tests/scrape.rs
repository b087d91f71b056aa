// ABOUTME: End-to-end tests for Scraper against a local mock HTTP server.
// ABOUTME: Covers fetch + parse, url/host+path targets, overrides, fetch failures and concurrent scrapes.

use std::fs;
use std::time::Duration;

use futures::future::join_all;
use httpmock::prelude::*;
use metascrape::{parse_meta, ScrapeConfig, ScrapeError, Scraper};
use pretty_assertions::assert_eq;

fn load_html_fixture(name: &str) -> String {
    let path = format!(
        "{}/tests/fixtures/{}.html",
        env!("CARGO_MANIFEST_DIR"),
        name
    );
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read fixture {}: {}", path, e))
}

fn serve_fixture<'a>(server: &'a MockServer, path: &str) -> httpmock::Mock<'a> {
    let body = load_html_fixture("parsetest");
    server.mock(|when, then| {
        when.method(GET).path(path);
        then.status(200)
            .header("content-type", "text/html; charset=utf-8")
            .body(body);
    })
}

#[test]
fn parse_fixture_fields() {
    let record = parse_meta(&load_html_fixture("parsetest"));

    assert_eq!(record.get("twitterAppIdIpad"), Some("544007664"));
    assert_eq!(
        record.get("alAndroidPackage"),
        Some("com.google.android.youtube")
    );
    assert_eq!(record.get("alIosAppStoreId"), Some("544007664"));
    assert_eq!(
        record.get("alIosUrl"),
        Some("vnd.youtube://www.youtube.com/watch?v=oWnAvDsZKaY&feature=applinks")
    );
    assert_eq!(
        record.get("ogTitle"),
        Some("Rick Astley - Never Gonna Give You Up")
    );
    assert_eq!(record.get("ogType"), Some("video"));
    assert_eq!(record.get("twitterCard"), Some("player"));
    assert_eq!(
        record.get("canonical"),
        Some("https://www.youtube.com/watch?v=oWnAvDsZKaY")
    );
    assert_eq!(record.get("themeColor"), Some("#e62117"));
    assert_eq!(record.get("manifest"), Some("/manifest.json"));

    // Present in the page but not part of the recognized vocabulary.
    assert!(!record.contains("duration"));
    assert!(!record.contains("alternate"));
    assert!(!record.contains("stylesheet"));
}

#[tokio::test]
async fn scrape_host_and_path() {
    let server = MockServer::start();
    let mock = serve_fixture(&server, "/watch");

    let scraper = Scraper::new(Some(ScrapeConfig::host_path(
        format!("http://{}", server.address()),
        "/watch?v=oWnAvDsZKaY",
    )))
    .unwrap();
    assert_eq!(scraper.host(), server.address().to_string());

    let record = scraper.scrape().await.expect("scrape should succeed");
    mock.assert();
    assert_eq!(
        record.get("alAndroidPackage"),
        Some("com.google.android.youtube")
    );
}

#[tokio::test]
async fn scrape_from_url_only() {
    let server = MockServer::start();
    let mock = serve_fixture(&server, "/watch");

    let scraper = Scraper::new(Some(ScrapeConfig::url(server.url("/watch?v=oWnAvDsZKaY")))).unwrap();
    let record = scraper.scrape().await.expect("scrape should succeed");
    mock.assert();
    assert_eq!(record.get("twitterAppIdIpad"), Some("544007664"));
}

#[tokio::test]
async fn scrape_override_target() {
    let server = MockServer::start();
    let mock = serve_fixture(&server, "/other");

    let scraper = Scraper::new(Some(ScrapeConfig::host("www.google.com"))).unwrap();
    let record = scraper
        .scrape_target(&ScrapeConfig::url(server.url("/other")))
        .await
        .expect("override scrape should succeed");
    mock.assert();
    assert_eq!(record.get("ogSiteName"), Some("YouTube"));
    assert_eq!(scraper.host(), "www.google.com");
}

#[tokio::test]
async fn scrape_non_2xx_is_fetch_error() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/gone");
        then.status(410)
            .header("content-type", "text/html")
            .body(r#"<meta property="og:title" content="error page">"#);
    });

    let scraper = Scraper::new(Some(ScrapeConfig::url(server.url("/gone")))).unwrap();
    let err = scraper.scrape().await.expect_err("410 should fail");
    mock.assert();

    assert!(err.is_fetch());
    assert_eq!(err.http_status(), Some(410));
}

#[tokio::test]
async fn scrape_blocked_private_network() {
    let server = MockServer::start();
    let mock = serve_fixture(&server, "/");

    let scraper = Scraper::builder()
        .url(server.url("/"))
        .allow_private_networks(false)
        .build()
        .unwrap();
    let err = scraper.scrape().await.expect_err("loopback should be refused");
    assert!(matches!(err, ScrapeError::Fetch { status: None, .. }));
    mock.assert_hits(0);
}

#[tokio::test]
async fn scrape_empty_body_gives_empty_record() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/empty");
        then.status(200).header("content-type", "text/html").body("");
    });

    let scraper = Scraper::new(Some(ScrapeConfig::url(server.url("/empty")))).unwrap();
    let record = scraper.scrape().await.expect("empty page is not an error");
    assert!(record.is_empty());
}

#[tokio::test]
async fn concurrent_scrapes_share_nothing() {
    let server = MockServer::start();
    let fixture = serve_fixture(&server, "/a");
    let other = server.mock(|when, then| {
        when.method(GET).path("/b");
        then.status(200)
            .header("content-type", "text/html")
            .body(r#"<meta property="og:title" content="Page B">"#);
    });

    let scraper = Scraper::new(Some(ScrapeConfig::url(server.url("/a")))).unwrap();
    let b = ScrapeConfig::url(server.url("/b"));

    let futures = (0..4).map(|i| {
        let scraper = scraper.clone();
        let b = b.clone();
        async move {
            if i % 2 == 0 {
                scraper.scrape().await
            } else {
                scraper.scrape_target(&b).await
            }
        }
    });
    let results = join_all(futures).await;

    fixture.assert_hits(2);
    other.assert_hits(2);
    for (i, result) in results.into_iter().enumerate() {
        let record = result.expect("scrape should succeed");
        if i % 2 == 0 {
            assert_eq!(
                record.get("ogTitle"),
                Some("Rick Astley - Never Gonna Give You Up")
            );
        } else {
            assert_eq!(record.get("ogTitle"), Some("Page B"));
            assert_eq!(record.len(), 1);
        }
    }
}

#[tokio::test]
async fn caller_imposed_timeout() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/slow");
        then.status(200)
            .delay(Duration::from_secs(5))
            .body("<meta name=\"description\" content=\"late\">");
    });

    let scraper = Scraper::new(Some(ScrapeConfig::url(server.url("/slow")))).unwrap();
    let outcome = tokio::time::timeout(Duration::from_millis(200), scraper.scrape()).await;
    assert!(outcome.is_err(), "caller timeout should fire first");
}

#[tokio::test]
#[ignore = "requires network access"]
async fn live_youtube_app_links() {
    let scraper = Scraper::new(Some(ScrapeConfig::url(
        "https://www.youtube.com/watch?v=oWnAvDsZKaY",
    )))
    .unwrap();
    let record = scraper.scrape().await.expect("live scrape should succeed");
    assert_eq!(
        record.get("alAndroidPackage"),
        Some("com.google.android.youtube")
    );
}
