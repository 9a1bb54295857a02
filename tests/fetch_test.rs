use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use deskchat::fetch::{FetchError, HostGuard, HttpFetcher, PageFetcher};

fn local_fetcher(timeout: Duration) -> HttpFetcher {
    HttpFetcher::with_guard(timeout, HostGuard::allow_private_hosts()).unwrap()
}

#[tokio::test]
async fn test_fetch_returns_raw_body() {
    let server = MockServer::start().await;
    let body = "<html><body><p>unchanged &amp; raw</p></body></html>";

    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let fetcher = local_fetcher(Duration::from_secs(5));
    let fetched = fetcher
        .fetch(&format!("{}/page", server.uri()))
        .await
        .unwrap();
    assert_eq!(fetched, body);
}

#[tokio::test]
async fn test_fetch_non_success_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = local_fetcher(Duration::from_secs(5));
    let err = fetcher
        .fetch(&format!("{}/missing", server.uri()))
        .await
        .unwrap_err();
    assert_eq!(err, FetchError::Status(404));
}

#[tokio::test]
async fn test_fetch_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let fetcher = local_fetcher(Duration::from_secs(1));
    let err = fetcher
        .fetch(&format!("{}/slow", server.uri()))
        .await
        .unwrap_err();
    assert_eq!(err, FetchError::Timeout(1));
}

#[tokio::test]
async fn test_fetch_default_guard_blocks_loopback() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();
    let err = fetcher.fetch(&server.uri()).await.unwrap_err();
    assert!(matches!(err, FetchError::Blocked(_)));
}

#[tokio::test]
async fn test_fetch_invalid_url() {
    let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();
    let err = fetcher.fetch("not a url").await.unwrap_err();
    assert!(matches!(err, FetchError::InvalidUrl(_)));
}

#[tokio::test]
async fn test_redirects_are_checked_by_guard() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/hop"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "file:///etc/passwd"))
        .mount(&server)
        .await;

    let fetcher = local_fetcher(Duration::from_secs(5));
    let err = fetcher
        .fetch(&format!("{}/hop", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Blocked(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_allowed_redirect_is_followed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("Location", format!("{}/new", server.uri()).as_str()),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string("moved here"))
        .mount(&server)
        .await;

    let fetcher = local_fetcher(Duration::from_secs(5));
    let fetched = fetcher
        .fetch(&format!("{}/old", server.uri()))
        .await
        .unwrap();
    assert_eq!(fetched, "moved here");
}
