use harvest_core::Source;
use harvest_engine::{ContentFetcher, FailureKind, FirecrawlFetcher, FirecrawlSettings};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher(server: &MockServer, api_key: Option<&str>) -> FirecrawlFetcher {
    FirecrawlFetcher::new(FirecrawlSettings {
        base_url: server.uri(),
        api_key: api_key.map(str::to_string),
        ..FirecrawlSettings::default()
    })
    .unwrap()
}

fn source() -> Source {
    Source::new("https://huggingface.co/models", "models").unwrap()
}

#[tokio::test]
async fn scrape_returns_markdown() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .and(header("authorization", "Bearer fc-test"))
        .and(body_partial_json(json!({
            "url": "https://huggingface.co/models",
            "formats": ["markdown"],
            "onlyMainContent": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "markdown": "# Models\n\n- new-model-7b" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let text = fetcher(&server, Some("fc-test"))
        .fetch(&source())
        .await
        .expect("scrape ok");

    assert_eq!(text, "# Models\n\n- new-model-7b");
}

#[tokio::test]
async fn missing_key_fails_without_a_request() {
    let server = MockServer::start().await;

    let err = fetcher(&server, None).fetch(&source()).await.unwrap_err();

    assert_eq!(err.kind, FailureKind::MissingCredential);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn reported_failure_is_a_backend_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "blocked by robots"
        })))
        .mount(&server)
        .await;

    let err = fetcher(&server, Some("fc-test"))
        .fetch(&source())
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::Backend);
    assert_eq!(err.message, "blocked by robots");
}

#[tokio::test]
async fn throttling_is_transient() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let err = fetcher(&server, Some("fc-test"))
        .fetch(&source())
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::HttpStatus(429));
    assert!(err.is_transient());
}

#[tokio::test]
async fn missing_markdown_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/scrape"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {}
        })))
        .mount(&server)
        .await;

    let err = fetcher(&server, Some("fc-test"))
        .fetch(&source())
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::MalformedResponse);
}
