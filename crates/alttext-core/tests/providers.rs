//! Provider clients and the reachability probe against a mock HTTP server.

use std::time::Duration;

use alttext_core::config::ProviderDescriptor;
use alttext_core::llm::{ChatCompletionsClient, ClientSettings, MessagesClient};
use alttext_core::{AltTextClient, GenerateOptions, HttpProbe, ImageSource, ReachabilityProbe};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(name: &str, descriptor: ProviderDescriptor) -> ClientSettings {
    ClientSettings::from_descriptor(name, &descriptor, Duration::from_secs(5))
}

fn anthropic(server: &MockServer) -> MessagesClient {
    MessagesClient::new(settings(
        "anthropic",
        ProviderDescriptor {
            api_key: "ak-test".into(),
            endpoint: format!("{}/v1/messages", server.uri()),
            ..ProviderDescriptor::anthropic()
        },
    ))
    .unwrap()
}

fn openai(server: &MockServer) -> ChatCompletionsClient {
    ChatCompletionsClient::new(settings(
        "openai",
        ProviderDescriptor {
            api_key: "sk-test".into(),
            endpoint: format!("{}/v1/chat/completions", server.uri()),
            ..ProviderDescriptor::openai()
        },
    ))
    .unwrap()
}

#[tokio::test]
async fn test_messages_request_shape_with_inline_image() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "ak-test"))
        .and(header("anthropic-version", "2023-06-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{ "type": "text", "text": " A red kite over dunes " }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = anthropic(&server);
    let options = GenerateOptions {
        max_tokens: None,
        image: ImageSource::Base64("data:image/png;base64,iVBORw0K".into()),
    };
    let text = client.generate_alt_text("Describe", &options).await.unwrap();
    assert_eq!(text, "A red kite over dunes");

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = requests[0].body_json().unwrap();
    assert_eq!(body["model"], "claude-3-5-sonnet-latest");
    assert_eq!(body["max_tokens"], 180);
    let content = &body["messages"][0]["content"];
    assert_eq!(content[0]["type"], "text");
    assert_eq!(content[1]["type"], "image");
    assert_eq!(content[1]["source"]["type"], "base64");
    assert_eq!(content[1]["source"]["media_type"], "image/png");
    assert_eq!(content[1]["source"]["data"], "iVBORw0K");
}

#[tokio::test]
async fn test_explicit_max_tokens_wins() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": "ok" } }]
        })))
        .mount(&server)
        .await;

    let options = GenerateOptions {
        max_tokens: Some(32),
        image: ImageSource::None,
    };
    openai(&server)
        .generate_alt_text("Describe", &options)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = requests[0].body_json().unwrap();
    assert_eq!(body["max_tokens"], 32);
    assert_eq!(body["messages"][1]["content"], "Describe");
}

#[tokio::test]
async fn test_error_status_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let err = openai(&server)
        .generate_alt_text("Describe", &GenerateOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "transport");
    assert_eq!(err.status_code(), Some(429));
    assert!(err.to_string().contains("slow down"));
}

#[tokio::test]
async fn test_non_json_body_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let err = anthropic(&server)
        .generate_alt_text("Describe", &GenerateOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "transport");
}

#[tokio::test]
async fn test_missing_text_is_empty_suggestion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let text = openai(&server)
        .generate_alt_text("Describe", &GenerateOptions::default())
        .await
        .unwrap();
    assert_eq!(text, "");
}

#[tokio::test]
async fn test_http_probe() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/ok.jpg"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/gone.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let probe = HttpProbe::new(Duration::from_secs(2));
    assert!(probe.is_reachable(&format!("{}/ok.jpg", server.uri())).await);
    assert!(!probe.is_reachable(&format!("{}/gone.jpg", server.uri())).await);
    assert!(!probe.is_reachable("http://127.0.0.1:9/unreachable.jpg").await);
}

#[tokio::test]
async fn test_request_timeout_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "choices": [{ "message": { "content": "late" } }] }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = ChatCompletionsClient::new(ClientSettings::from_descriptor(
        "openai",
        &ProviderDescriptor {
            api_key: "sk-test".into(),
            endpoint: format!("{}/v1/chat/completions", server.uri()),
            ..ProviderDescriptor::openai()
        },
        Duration::from_millis(300),
    ))
    .unwrap();

    let err = client
        .generate_alt_text("Describe", &GenerateOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "transport");
    assert_eq!(err.status_code(), None);
    assert!(err.to_string().contains("timed out"));
}
