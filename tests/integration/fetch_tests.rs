//! Proxy fetcher tests against mock proxies

use crate::common::{fetcher_config, TEST_USER_AGENT};
use sitemap_harvest::extractor::{ProxyFetcher, SitemapSource};
use sitemap_harvest::ExtractError;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TARGET: &str = "https://example.com/sitemap.xml";

fn proxies(server: &MockServer) -> Vec<String> {
    vec![
        format!("{}/first?url=", server.uri()),
        format!("{}/second?url=", server.uri()),
    ]
}

#[tokio::test]
async fn test_first_proxy_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/first"))
        .and(query_param("url", TARGET))
        .and(header("user-agent", TEST_USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_string("<urlset/>"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/second"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let fetcher = ProxyFetcher::from_config(&fetcher_config(proxies(&server))).unwrap();
    let body = fetcher.fetch_sitemap(TARGET).await.unwrap();

    assert_eq!(body, "<urlset/>");
}

#[tokio::test]
async fn test_retries_then_next_proxy() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/first"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/second"))
        .and(query_param("url", TARGET))
        .respond_with(ResponseTemplate::new(200).set_body_string("<urlset/>"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = ProxyFetcher::from_config(&fetcher_config(proxies(&server))).unwrap();
    let body = fetcher.fetch_sitemap(TARGET).await.unwrap();

    assert_eq!(body, "<urlset/>");
}

#[tokio::test]
async fn test_recovers_within_retries() {
    let server = MockServer::start().await;

    // Mounted first, so it answers until its budget is spent
    Mock::given(method("GET"))
        .and(path("/first"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/first"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<urlset/>"))
        .mount(&server)
        .await;

    let fetcher = ProxyFetcher::from_config(&fetcher_config(proxies(&server))).unwrap();
    let body = fetcher
        .fetch_through_proxy(TARGET, &proxies(&server)[0])
        .await
        .unwrap();

    assert_eq!(body, "<urlset/>");
}

#[tokio::test]
async fn test_all_proxies_fail() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(6)
        .mount(&server)
        .await;

    let fetcher = ProxyFetcher::from_config(&fetcher_config(proxies(&server))).unwrap();
    let err = fetcher.fetch_sitemap(TARGET).await.unwrap_err();

    match err {
        ExtractError::Network(message) => assert_eq!(message, "HTTP 503"),
        other => panic!("expected network error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_http_status_reported() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = ProxyFetcher::from_config(&fetcher_config(proxies(&server))).unwrap();
    let err = fetcher
        .fetch_through_proxy(TARGET, &proxies(&server)[0])
        .await
        .unwrap_err();

    assert_eq!(err, ExtractError::Http { status: 404 });
}

#[tokio::test]
async fn test_attempt_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<urlset/>")
                .set_delay(Duration::from_millis(1000)),
        )
        .mount(&server)
        .await;

    let mut config = fetcher_config(proxies(&server));
    config.timeout_ms = 100;
    config.max_retries = 1;
    let fetcher = ProxyFetcher::from_config(&config).unwrap();

    let err = fetcher
        .fetch_through_proxy(TARGET, &proxies(&server)[0])
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ExtractError::Timeout {
            url: TARGET.to_string(),
            timeout_ms: 100,
        }
    );
}
