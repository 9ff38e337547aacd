//! Relay endpoint integration tests
//!
//! - POST /api/chat - success, validation, upstream failures, transport failures
//! - Other methods on /api/chat - 405 with a JSON error

use std::time::Duration;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::{
    chat_body, constants::*, relay_server, relay_server_with, test_config, unreachable_upstream,
};
use crate::mocks::{AnthropicTestData, MockAnthropic};

#[tokio::test]
async fn test_chat_returns_flattened_text() {
    let upstream = MockAnthropic::start().await;
    upstream
        .mock_message_success(AnthropicTestData::reply(vec![
            json!({ "type": "text", "text": "A" }),
            json!({ "type": "image", "source": { "type": "base64", "media_type": "image/png", "data": "eA==" } }),
            json!({ "type": "text", "text": "B" }),
        ]))
        .await;
    let server = relay_server(&upstream.base_url());

    let response = server.post("/api/chat").json(&chat_body("Hello")).await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json, json!({ "content": "A\nB" }));
}

#[tokio::test]
async fn test_chat_without_text_blocks_returns_empty_content() {
    let upstream = MockAnthropic::start().await;
    upstream
        .mock_message_success(AnthropicTestData::reply(vec![json!({
            "type": "tool_use", "id": "toolu_01", "name": "lookup", "input": {}
        })]))
        .await;
    let server = relay_server(&upstream.base_url());

    let response = server.post("/api/chat").json(&chat_body("Hello")).await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["content"], "");
}

#[tokio::test]
async fn test_upstream_request_shape() {
    let upstream = MockAnthropic::start().await;
    upstream
        .mock_message_success(AnthropicTestData::text_reply("ok"))
        .await;
    let server = relay_server(&upstream.base_url());

    let messages = json!([
        { "role": "user", "content": "Earlier question" },
        { "role": "assistant", "content": "Earlier answer" },
        {
            "role": "user",
            "content": [
                { "type": "image", "source": { "type": "base64", "media_type": "image/jpeg", "data": "/9j/4AAQ" } },
                { "type": "document", "source": { "type": "base64", "media_type": "application/pdf", "data": "JVBERi0x" } },
                { "type": "text", "text": "Summarise both" }
            ]
        }
    ]);

    server
        .post("/api/chat")
        .json(&json!({ "messages": messages, "model": TEST_MODEL, "apiKey": TEST_API_KEY }))
        .await
        .assert_status_ok();

    let received = upstream.received().await;
    assert_eq!(received.len(), 1);

    let request = &received[0];
    assert_eq!(request.headers.get("x-api-key").unwrap(), TEST_API_KEY);
    assert_eq!(request.headers.get("anthropic-version").unwrap(), "2023-06-01");

    let body: Value = request.body_json().unwrap();
    assert_eq!(
        body,
        json!({ "model": TEST_MODEL, "max_tokens": 4096, "messages": messages })
    );
}

#[tokio::test]
async fn test_non_post_methods_return_405_without_upstream_call() {
    let upstream = MockAnthropic::start().await;
    upstream.expect_no_calls().await;
    let server = relay_server(&upstream.base_url());

    for response in [
        server.get("/api/chat").await,
        server.put("/api/chat").json(&chat_body("Hello")).await,
        server.delete("/api/chat").await,
        server.patch("/api/chat").await,
    ] {
        response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
        let json: Value = response.json();
        assert_eq!(json, json!({ "error": "Method not allowed" }));
    }

    upstream.verify().await;
}

#[tokio::test]
async fn test_missing_credential_returns_400_without_upstream_call() {
    let upstream = MockAnthropic::start().await;
    upstream.expect_no_calls().await;
    let server = relay_server(&upstream.base_url());

    let bodies = [
        json!({ "messages": [{ "role": "user", "content": "Hi" }], "model": TEST_MODEL }),
        json!({ "messages": [{ "role": "user", "content": "Hi" }], "model": TEST_MODEL, "apiKey": "" }),
        json!({ "messages": [{ "role": "user", "content": "Hi" }], "model": TEST_MODEL, "apiKey": null }),
    ];

    for body in bodies {
        let response = server.post("/api/chat").json(&body).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let json: Value = response.json();
        assert_eq!(json["error"], "API key is required");
    }

    upstream.verify().await;
}

#[tokio::test]
async fn test_malformed_credential_returns_400() {
    let upstream = MockAnthropic::start().await;
    upstream.expect_no_calls().await;
    let server = relay_server(&upstream.base_url());

    let response = server
        .post("/api/chat")
        .json(&json!({ "messages": [], "model": TEST_MODEL, "apiKey": "sk-proj-openai" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let json: Value = response.json();
    assert_eq!(
        json["error"],
        "Invalid API key format - should start with sk-ant-"
    );

    upstream.verify().await;
}

#[tokio::test]
async fn test_format_check_can_be_disabled() {
    let upstream = MockAnthropic::start().await;
    upstream
        .mock_message_success(AnthropicTestData::text_reply("ok"))
        .await;

    let mut config = test_config(&upstream.base_url());
    config.credential_pattern = None;
    let server = relay_server_with(config);

    let response = server
        .post("/api/chat")
        .json(&json!({
            "messages": [{ "role": "user", "content": "Hi" }],
            "model": TEST_MODEL,
            "apiKey": "proxy-issued-key"
        }))
        .await;

    response.assert_status_ok();
}

#[tokio::test]
async fn test_invalid_json_body_returns_400() {
    let upstream = MockAnthropic::start().await;
    upstream.expect_no_calls().await;
    let server = relay_server(&upstream.base_url());

    let response = server
        .post("/api/chat")
        .content_type("application/json")
        .bytes("not valid json".as_bytes().to_vec().into())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let json: Value = response.json();
    assert!(json["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid request body"));
}

#[tokio::test]
async fn test_upstream_rate_limit_is_mirrored() {
    let upstream = MockAnthropic::start().await;
    upstream
        .mock_message_error(429, json!({ "error": { "message": "rate limited" } }))
        .await;
    let server = relay_server(&upstream.base_url());

    let response = server.post("/api/chat").json(&chat_body("Hello")).await;

    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    let json: Value = response.json();
    assert_eq!(json["error"], "rate limited");
    assert_eq!(json["details"], json!({ "error": { "message": "rate limited" } }));
    assert_eq!(
        json["debugInfo"],
        json!({ "model": TEST_MODEL, "hasApiKey": true, "status": 429 })
    );
}

#[tokio::test]
async fn test_upstream_unparsable_error_body_falls_back() {
    let upstream = MockAnthropic::start().await;
    upstream
        .mock_message_raw(401, "<html>Unauthorized</html>")
        .await;
    let server = relay_server(&upstream.base_url());

    let response = server.post("/api/chat").json(&chat_body("Hello")).await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let json: Value = response.json();
    assert_eq!(json["error"], "API request failed");
    assert!(json.get("details").is_none());
    assert_eq!(json["debugInfo"]["status"], 401);
}

#[tokio::test]
async fn test_upstream_server_error_is_mirrored() {
    let upstream = MockAnthropic::start().await;
    upstream
        .mock_message_error(529, AnthropicTestData::error("overloaded_error", "Overloaded"))
        .await;
    let server = relay_server(&upstream.base_url());

    let response = server.post("/api/chat").json(&chat_body("Hello")).await;

    assert_eq!(response.status_code().as_u16(), 529);
    let json: Value = response.json();
    assert_eq!(json["error"], "Overloaded");
}

#[tokio::test]
async fn test_upstream_validation_errors_surface_as_upstream_errors() {
    let upstream = MockAnthropic::start().await;
    upstream
        .mock_message_error(
            400,
            AnthropicTestData::error("invalid_request_error", "model: Field required"),
        )
        .await;
    let server = relay_server(&upstream.base_url());

    let response = server
        .post("/api/chat")
        .json(&json!({
            "messages": [{ "role": "user", "content": "Hi" }],
            "apiKey": TEST_API_KEY
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let json: Value = response.json();
    assert_eq!(json["error"], "model: Field required");
    assert_eq!(json["debugInfo"]["model"], Value::Null);

    // model was absent, so it is absent upstream too
    let body: Value = upstream.received().await[0].body_json().unwrap();
    assert!(body.get("model").is_none());
}

#[tokio::test]
async fn test_connection_refused_returns_500() {
    let server = relay_server(&unreachable_upstream());

    let response = server.post("/api/chat").json(&chat_body("Hello")).await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let json: Value = response.json();
    assert!(!json["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_success_body_returns_500() {
    let upstream = MockAnthropic::start().await;
    upstream.mock_message_raw(200, "definitely not json").await;
    let server = relay_server(&upstream.base_url());

    let response = server.post("/api/chat").json(&chat_body("Hello")).await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let json: Value = response.json();
    assert!(!json["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_upstream_timeout_returns_500() {
    let upstream = MockAnthropic::start().await;
    upstream
        .mock_message_delayed(AnthropicTestData::text_reply("late"), Duration::from_secs(5))
        .await;

    let mut config = test_config(&upstream.base_url());
    config.upstream_timeout_seconds = 1;
    let server = relay_server_with(config);

    let response = server.post("/api/chat").json(&chat_body("Hello")).await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let json: Value = response.json();
    assert_eq!(json["error"], "Upstream request timed out");
}

#[tokio::test]
async fn test_repeated_requests_yield_same_result() {
    let upstream = MockAnthropic::start().await;
    upstream
        .mock_message_success(AnthropicTestData::text_reply("stable"))
        .await;
    let server = relay_server(&upstream.base_url());

    let first: Value = server.post("/api/chat").json(&chat_body("Hello")).await.json();
    let second: Value = server.post("/api/chat").json(&chat_body("Hello")).await.json();

    assert_eq!(first, second);
    assert_eq!(first, json!({ "content": "stable" }));
    assert_eq!(upstream.received().await.len(), 2);
}

#[tokio::test]
async fn test_oversized_body_is_rejected_as_json() {
    let upstream = MockAnthropic::start().await;
    upstream.expect_no_calls().await;

    let mut config = test_config(&upstream.base_url());
    config.max_body_bytes = 256;
    let server = relay_server_with(config);

    let response = server
        .post("/api/chat")
        .json(&chat_body(&"x".repeat(1024)))
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    let json: Value = response.json();
    assert!(!json["error"].as_str().unwrap().is_empty());

    upstream.verify().await;
}

#[tokio::test]
async fn test_unknown_role_is_left_to_upstream() {
    let upstream = MockAnthropic::start().await;
    upstream
        .mock_message_error(
            400,
            AnthropicTestData::error(
                "invalid_request_error",
                "messages.0.role: Input should be 'user' or 'assistant'",
            ),
        )
        .await;
    let server = relay_server(&upstream.base_url());

    let messages = json!([{ "role": "system", "content": "hi" }]);
    let response = server
        .post("/api/chat")
        .json(&json!({ "messages": messages, "model": TEST_MODEL, "apiKey": TEST_API_KEY }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let json: Value = response.json();
    assert_eq!(
        json["error"],
        "messages.0.role: Input should be 'user' or 'assistant'"
    );
    assert_eq!(json["debugInfo"]["status"], 400);

    let body: Value = upstream.received().await[0].body_json().unwrap();
    assert_eq!(body["messages"], messages);
}

#[tokio::test]
async fn test_non_array_messages_are_forwarded_verbatim() {
    for messages in [json!("x"), Value::Null] {
        let upstream = MockAnthropic::start().await;
        upstream
            .mock_message_error(
                400,
                AnthropicTestData::error(
                    "invalid_request_error",
                    "messages: Input should be a valid list",
                ),
            )
            .await;
        let server = relay_server(&upstream.base_url());

        let response = server
            .post("/api/chat")
            .json(&json!({ "messages": messages, "model": TEST_MODEL, "apiKey": TEST_API_KEY }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let json: Value = response.json();
        assert_eq!(json["error"], "messages: Input should be a valid list");

        let received = upstream.received().await;
        assert_eq!(received.len(), 1);
        let body: Value = received[0].body_json().unwrap();
        assert_eq!(
            body,
            json!({ "model": TEST_MODEL, "max_tokens": 4096, "messages": messages })
        );
    }
}

#[tokio::test]
async fn test_credential_is_checked_before_message_shape() {
    let upstream = MockAnthropic::start().await;
    upstream.expect_no_calls().await;
    let server = relay_server(&upstream.base_url());

    let bodies = [
        json!({ "messages": "hello", "model": TEST_MODEL }),
        json!({ "messages": null, "apiKey": "" }),
        json!({ "messages": [{ "role": "system" }], "apiKey": null }),
        json!(["not", "an", "object"]),
    ];

    for body in bodies {
        let response = server.post("/api/chat").json(&body).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let json: Value = response.json();
        assert_eq!(json["error"], "API key is required");
    }

    upstream.verify().await;
}

#[tokio::test]
async fn test_empty_body_reports_missing_credential() {
    let upstream = MockAnthropic::start().await;
    upstream.expect_no_calls().await;
    let server = relay_server(&upstream.base_url());

    let response = server
        .post("/api/chat")
        .content_type("application/json")
        .bytes(Vec::<u8>::new().into())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let json: Value = response.json();
    assert_eq!(json["error"], "API key is required");

    upstream.verify().await;
}

#[tokio::test]
async fn test_non_string_credential_returns_400() {
    let upstream = MockAnthropic::start().await;
    upstream.expect_no_calls().await;
    let server = relay_server(&upstream.base_url());

    let response = server
        .post("/api/chat")
        .json(&json!({ "messages": [], "model": TEST_MODEL, "apiKey": 12345 }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let json: Value = response.json();
    assert_eq!(json["error"], "Invalid API key format - must be a string");

    upstream.verify().await;
}
