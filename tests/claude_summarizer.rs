//! Claude summarizer against a mocked messages endpoint.

use secrecy::SecretString;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use headline_digest::config::InsightConfig;
use headline_digest::summarizer::claude::ClaudeSummarizer;
use headline_digest::summarizer::{Summarizer, SummarizerError};

fn summarizer_for(server: &MockServer) -> ClaudeSummarizer {
    let config = InsightConfig {
        api_base_url: server.uri(),
        timeout_seconds: 5,
        requests_per_second: 50,
        burst_size: 50,
        ..InsightConfig::default()
    };
    ClaudeSummarizer::new(SecretString::from("test-key".to_string()), &config).unwrap()
}

fn text_reply(text: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "msg_01",
        "type": "message",
        "role": "assistant",
        "content": [{"type": "text", "text": text}],
        "usage": {"input_tokens": 120, "output_tokens": 60}
    })
}

// ──────────────────────────────────────────
// Successful replies
// ──────────────────────────────────────────

#[tokio::test]
async fn parses_fenced_json_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "test-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply(
            "```json\n{\"trade\": \"대미 수출 선적 지연\", \"logistics\": \"부산항 대체 선석 확보\", \"scm\": \"안전재고 2주 상향\"}\n```",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let insights = summarizer_for(&server)
        .summarize("부산항 파업 2주째", "하역 작업 중단")
        .await
        .unwrap();

    assert_eq!(insights.trade.as_deref(), Some("대미 수출 선적 지연"));
    assert_eq!(insights.logistics.as_deref(), Some("부산항 대체 선석 확보"));
    assert_eq!(insights.scm.as_deref(), Some("안전재고 2주 상향"));
}

#[tokio::test]
async fn partial_reply_keeps_present_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(text_reply("분석 결과: {\"trade\": \"관세 부담 확대\"}")),
        )
        .mount(&server)
        .await;

    let insights = summarizer_for(&server).summarize("t", "s").await.unwrap();
    assert_eq!(insights.trade.as_deref(), Some("관세 부담 확대"));
    assert!(insights.logistics.is_none());
    assert!(insights.scm.is_none());
}

// ──────────────────────────────────────────
// Failures
// ──────────────────────────────────────────

#[tokio::test]
async fn rate_limited_maps_to_quota() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate_limit_error"))
        .mount(&server)
        .await;

    let err = summarizer_for(&server).summarize("t", "s").await.unwrap_err();
    assert!(matches!(err, SummarizerError::Quota(body) if body.contains("rate_limit")));
}

#[tokio::test]
async fn server_error_maps_to_api() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = summarizer_for(&server).summarize("t", "s").await.unwrap_err();
    assert!(matches!(err, SummarizerError::Api { status: 500, .. }));
}

#[tokio::test]
async fn prose_reply_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(text_reply("죄송하지만 분석할 수 없습니다.")),
        )
        .mount(&server)
        .await;

    let err = summarizer_for(&server).summarize("t", "s").await.unwrap_err();
    assert!(matches!(err, SummarizerError::Malformed(_)));
}

#[tokio::test]
async fn unexpected_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = summarizer_for(&server).summarize("t", "s").await.unwrap_err();
    assert!(matches!(err, SummarizerError::Malformed(_)));
}
