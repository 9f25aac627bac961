use std::sync::Arc;
use std::time::Duration;

use harvest_core::Source;
use harvest_engine::{
    empty_content_placeholder, ContentFetcher, FailureKind, FetchError, FetchSettings, PageFetcher,
    SourceFetcher,
};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn source(locator: &str) -> Source {
    Source::new(locator, "finance").unwrap()
}

async fn serve(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn html_page_is_reduced_to_article_text() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/doc",
        ResponseTemplate::new(200).set_body_raw(
            "<html><head><title>Markets</title></head><body><nav>menu</nav>\
             <article><p>Stocks rose today.</p></article></body></html>",
            "text/html; charset=utf-8",
        ),
    )
    .await;

    let fetcher = PageFetcher::new(FetchSettings::default()).unwrap();
    let text = fetcher
        .fetch(&source(&format!("{}/doc", server.uri())))
        .await
        .expect("fetch ok");

    assert!(text.starts_with("# Markets"));
    assert!(text.contains("Stocks rose today."));
    assert!(!text.contains("menu"));
}

#[tokio::test]
async fn http_errors_carry_status() {
    let server = MockServer::start().await;
    serve(&server, "/missing", ResponseTemplate::new(404)).await;

    let fetcher = PageFetcher::new(FetchSettings::default()).unwrap();
    let err = fetcher
        .fetch(&source(&format!("{}/missing", server.uri())))
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::HttpStatus(404));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn server_errors_are_transient() {
    let server = MockServer::start().await;
    serve(&server, "/busy", ResponseTemplate::new(503)).await;

    let fetcher = PageFetcher::new(FetchSettings::default()).unwrap();
    let err = fetcher
        .fetch(&source(&format!("{}/busy", server.uri())))
        .await
        .unwrap_err();

    assert!(err.is_transient());
}

#[tokio::test]
async fn slow_server_times_out() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/slow",
        ResponseTemplate::new(200)
            .set_body_raw("late", "text/plain")
            .set_delay(Duration::from_millis(500)),
    )
    .await;

    let settings = FetchSettings {
        request_timeout: Duration::from_millis(50),
        ..FetchSettings::default()
    };
    let fetcher = PageFetcher::new(settings).unwrap();
    let err = fetcher
        .fetch(&source(&format!("{}/slow", server.uri())))
        .await
        .unwrap_err();

    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn oversized_bodies_are_rejected() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/big",
        ResponseTemplate::new(200).set_body_raw("x".repeat(64), "text/plain"),
    )
    .await;

    let settings = FetchSettings {
        max_bytes: 16,
        ..FetchSettings::default()
    };
    let fetcher = PageFetcher::new(settings).unwrap();
    let err = fetcher
        .fetch(&source(&format!("{}/big", server.uri())))
        .await
        .unwrap_err();

    assert!(matches!(err.kind, FailureKind::TooLarge { max_bytes: 16, .. }));
}

#[tokio::test]
async fn binary_content_types_are_rejected() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/image",
        ResponseTemplate::new(200).set_body_raw(vec![0x89, 0x50, 0x4e, 0x47], "image/png"),
    )
    .await;

    let fetcher = PageFetcher::new(FetchSettings::default()).unwrap();
    let err = fetcher
        .fetch(&source(&format!("{}/image", server.uri())))
        .await
        .unwrap_err();

    assert_eq!(
        err.kind,
        FailureKind::UnsupportedContentType {
            content_type: "image/png".to_string()
        }
    );
}

#[tokio::test]
async fn blank_pages_become_a_visible_placeholder() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/blank",
        ResponseTemplate::new(200).set_body_raw("   \n", "text/plain"),
    )
    .await;

    let fetcher = PageFetcher::new(FetchSettings::default()).unwrap();
    let src = source(&format!("{}/blank", server.uri()));
    let text = fetcher.fetch(&src).await.unwrap();

    assert_eq!(text, empty_content_placeholder(&src));
    assert!(text.contains("/blank"));
}

#[tokio::test]
async fn page_fetcher_refuses_subreddits() {
    let fetcher = PageFetcher::new(FetchSettings::default()).unwrap();
    let err = fetcher.fetch(&source("r/OpenAI")).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidLocator);
}

struct Fixed(&'static str);

#[async_trait::async_trait]
impl ContentFetcher for Fixed {
    async fn fetch(&self, _source: &Source) -> Result<String, FetchError> {
        Ok(self.0.to_string())
    }
}

#[tokio::test]
async fn source_fetcher_routes_by_locator() {
    let fetcher = SourceFetcher::new(Arc::new(Fixed("web")), Arc::new(Fixed("reddit")));

    assert_eq!(
        fetcher.fetch(&source("https://example.com/")).await.unwrap(),
        "web"
    );
    assert_eq!(fetcher.fetch(&source("r/LocalLLaMA")).await.unwrap(), "reddit");
}
