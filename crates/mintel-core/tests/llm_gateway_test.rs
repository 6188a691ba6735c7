//! Integration test: the three HTTP backends and gateway selection against mock servers.

use mintel_core::llm::{AnthropicProvider, GeminiProvider, OpenAiProvider};
use mintel_core::{GenerateOptions, LlmError, LlmGateway, LlmProvider, ProviderKind};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn anthropic_sends_versioned_request_and_joins_text_blocks() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "sk-ant"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({
            "model": "claude-3-5-sonnet-20241022",
            "max_tokens": 3000,
            "messages": [{ "role": "user", "content": "hello" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [
                { "type": "text", "text": "## Summary" },
                { "type": "tool_use", "id": "x" },
                { "type": "text", "text": "Done." }
            ]
        })))
        .mount(&server)
        .await;

    let provider = AnthropicProvider::new("sk-ant", TIMEOUT).with_base_url(server.uri());
    let options = GenerateOptions::default().with_max_output_tokens(3000);
    let text = provider.generate("hello", &options).await.expect("anthropic reply");
    assert_eq!(text, "## Summary\nDone.");
}

#[tokio::test]
async fn anthropic_error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(529).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let provider = AnthropicProvider::new("sk-ant", TIMEOUT).with_base_url(server.uri());
    let err = provider
        .generate("hello", &GenerateOptions::default())
        .await
        .expect_err("529 should fail");
    match err {
        LlmError::Status { provider, status, body } => {
            assert_eq!(provider, ProviderKind::Anthropic);
            assert_eq!(status, 529);
            assert_eq!(body, "overloaded");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn openai_uses_bearer_auth_and_first_choice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-oai"))
        .and(body_partial_json(json!({ "model": "gpt-4o", "max_tokens": 4096 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [
                { "message": { "role": "assistant", "content": "first" } },
                { "message": { "role": "assistant", "content": "second" } }
            ]
        })))
        .mount(&server)
        .await;

    let provider = OpenAiProvider::new("sk-oai", TIMEOUT).with_base_url(server.uri());
    let text = provider
        .generate("hello", &GenerateOptions::default())
        .await
        .expect("openai reply");
    assert_eq!(text, "first");
}

#[tokio::test]
async fn openai_empty_choices_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let provider = OpenAiProvider::new("sk-oai", TIMEOUT).with_base_url(server.uri());
    let err = provider
        .generate("hello", &GenerateOptions::default())
        .await
        .expect_err("no choices");
    assert!(matches!(err, LlmError::EmptyResponse(ProviderKind::OpenAi)));
}

#[tokio::test]
async fn gemini_defaults_temperature_and_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.0-flash-thinking-exp-1219:generateContent"))
        .and(header("x-goog-api-key", "g-key"))
        .and(body_partial_json(json!({
            "generationConfig": { "maxOutputTokens": 4096, "temperature": 1.0 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [
                { "content": { "parts": [ { "text": "part one, " }, { "text": "part two" } ] } }
            ]
        })))
        .mount(&server)
        .await;

    let provider = GeminiProvider::new("g-key", TIMEOUT).with_base_url(server.uri());
    let text = provider
        .generate("hello", &GenerateOptions::default())
        .await
        .expect("gemini reply");
    assert_eq!(text, "part one, part two");
}

#[tokio::test]
async fn gateway_prefers_openai_over_gemini() {
    let openai = MockServer::start().await;
    let gemini = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [ { "message": { "content": "from openai" } } ]
        })))
        .expect(1)
        .mount(&openai)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&gemini)
        .await;

    let gateway = LlmGateway::new()
        .with_backend(
            ProviderKind::Gemini,
            Box::new(GeminiProvider::new("g", TIMEOUT).with_base_url(gemini.uri())),
        )
        .with_backend(
            ProviderKind::OpenAi,
            Box::new(OpenAiProvider::new("o", TIMEOUT).with_base_url(openai.uri())),
        );
    assert!(gateway.is_configured());
    assert_eq!(gateway.active_provider(), Some(ProviderKind::OpenAi));

    let text = gateway
        .generate("hello", &GenerateOptions::default())
        .await
        .expect("gateway reply");
    assert_eq!(text, "from openai");
}

#[tokio::test]
async fn slow_backend_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(500))
                .set_body_json(json!({ "choices": [ { "message": { "content": "late" } } ] })),
        )
        .mount(&server)
        .await;

    let provider =
        OpenAiProvider::new("o", Duration::from_millis(50)).with_base_url(server.uri());
    let err = provider
        .generate("hello", &GenerateOptions::default())
        .await
        .expect_err("should time out");
    assert!(err.is_timeout());
}

#[tokio::test]
async fn zero_timeout_waits_for_slow_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(300))
                .set_body_json(json!({ "choices": [ { "message": { "content": "late" } } ] })),
        )
        .mount(&server)
        .await;

    let provider = OpenAiProvider::new("o", Duration::ZERO).with_base_url(server.uri());
    let text = provider
        .generate("hello", &GenerateOptions::default())
        .await
        .expect("no timeout applied");
    assert_eq!(text, "late");
}
