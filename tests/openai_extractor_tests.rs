use eventscout::config::model::OpenAiConfig;
use eventscout::event::normalizer::to_event;
use eventscout::extractor::openai::api::OpenAiExtractor;
use eventscout::extractor::{EventExtractor, ExtractionError};
use eventscout::page::model::Page;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE_URL: &str = "https://example.com/events/";

fn extractor(server: &MockServer) -> OpenAiExtractor {
    OpenAiExtractor::new(OpenAiConfig {
        api_key: "test-key".to_string(),
        model: "gpt-4o-mini".to_string(),
        api_base: format!("{}/v1/", server.uri()),
        max_content_chars: 60_000,
    })
    .unwrap()
}

fn page() -> Page {
    Page::new(
        PAGE_URL.to_string(),
        "# Spring Fest\nAugust 8 - 11, 2025\nMasonic Hall, Brookfield, WI".to_string(),
    )
}

fn completion(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    }))
}

#[test_log::test(tokio::test)]
async fn should_extract_events_from_completion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "response_format": { "type": "json_object" }
        })))
        .respond_with(completion(
            r#"{"events": [{"title": "Spring Fest", "from": "August 8, 2025", "to": "2025-08-11", "place": "Masonic Hall, Brookfield, WI", "link": "spring-fest"}]}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let raw_events = extractor(&server).extract(&page()).await.unwrap();
    let events: Vec<_> = raw_events.iter().map(|raw| to_event(raw, PAGE_URL)).collect();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].name, "Spring Fest");
    assert_eq!(events[0].start_date, "08/08/2025");
    assert_eq!(events[0].end_date, "11/08/2025");
    assert_eq!(events[0].location, "Masonic Hall, Brookfield, WI");
    assert_eq!(events[0].url, "https://example.com/events/spring-fest");
}

#[test_log::test(tokio::test)]
async fn when_completion_is_not_json_should_return_no_events() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(completion("I could not find any events on this page."))
        .mount(&server)
        .await;

    let events = extractor(&server).extract(&page()).await.unwrap();

    assert!(events.is_empty());
}

#[test_log::test(tokio::test)]
async fn when_response_body_is_malformed_should_return_no_events() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let events = extractor(&server).extract(&page()).await.unwrap();

    assert!(events.is_empty());
}

#[test_log::test(tokio::test)]
async fn when_backend_fails_should_return_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let result = extractor(&server).extract(&page()).await;

    match result {
        Err(ExtractionError::Status { status, body }) => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(body, "overloaded");
        }
        other => panic!("Expected a status error, got {:?}", other),
    }
}
