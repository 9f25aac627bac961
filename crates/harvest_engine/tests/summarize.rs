use harvest_engine::{ChatSummarizer, SummarizerSettings, SummaryError, Summarizer};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn summarizer(server: &MockServer, api_key: Option<&str>, max_input_chars: usize) -> ChatSummarizer {
    ChatSummarizer::new(SummarizerSettings {
        base_url: server.uri(),
        api_key: api_key.map(str::to_string),
        max_input_chars,
        ..SummarizerSettings::default()
    })
    .unwrap()
}

fn reply(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [ { "message": { "role": "assistant", "content": content } } ]
    }))
}

#[tokio::test]
async fn summary_comes_from_first_choice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer gsk-test"))
        .and(body_partial_json(json!({ "model": "openai/gpt-oss-120b" })))
        .respond_with(reply("  - model X released\n"))
        .expect(1)
        .mount(&server)
        .await;

    let summary = summarizer(&server, Some("gsk-test"), 5_000)
        .summarize("long scraped text", Some("models"))
        .await
        .unwrap();

    assert_eq!(summary, "- model X released");
}

#[tokio::test]
async fn prompt_carries_context_and_truncated_input() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(reply("ok"))
        .mount(&server)
        .await;

    summarizer(&server, Some("gsk-test"), 10)
        .summarize("0123456789ABCDEF", Some("finance"))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages[0]["role"], "system");
    let user = messages[1]["content"].as_str().unwrap();
    assert!(user.contains("(finance)"));
    assert!(user.ends_with("0123456789"));
    assert!(!user.contains("ABCDEF"));
}

#[tokio::test]
async fn blank_reply_is_an_empty_summary() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(reply("   "))
        .mount(&server)
        .await;

    let err = summarizer(&server, Some("gsk-test"), 5_000)
        .summarize("text", None)
        .await
        .unwrap_err();

    assert_eq!(err, SummaryError::Empty);
}

#[tokio::test]
async fn http_failure_is_reported_with_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = summarizer(&server, Some("gsk-test"), 5_000)
        .summarize("text", None)
        .await
        .unwrap_err();

    assert_eq!(err, SummaryError::HttpStatus(500));
}

#[tokio::test]
async fn missing_key_fails_without_a_request() {
    let server = MockServer::start().await;

    let err = summarizer(&server, None, 5_000)
        .summarize("text", None)
        .await
        .unwrap_err();

    assert_eq!(err, SummaryError::MissingCredential);
    assert!(server.received_requests().await.unwrap().is_empty());
}
