use finagent_llm::client::LlmClient;
use finagent_llm::error::LlmError;
use finagent_llm::openai::OpenAIClient;
use finagent_llm::tools::{Tool, ToolChoice};
use finagent_llm::types::{CompletionRequest, ContentBlock, Message};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
struct QuoteArgs {
    symbol: String,
}

fn request_with(messages: Vec<Message>, tools: Option<Vec<Tool>>) -> CompletionRequest {
    CompletionRequest {
        messages,
        max_tokens: 256,
        model: "gpt-4o".to_string(),
        system: Some("You are a stock assistant.".to_string()),
        temperature: Some(0.2),
        top_p: None,
        stop_sequences: None,
        tool_choice: tools.as_ref().map(|_| ToolChoice::Auto),
        tools,
    }
}

#[tokio::test]
async fn complete_returns_text_answer() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "id": "chatcmpl-1",
                "object": "chat.completion",
                "created": 1724400000,
                "model": "gpt-4o",
                "choices": [{
                    "index": 0,
                    "message": { "role": "assistant", "content": "AAPL closed higher today." },
                    "finish_reason": "stop"
                }],
                "usage": { "prompt_tokens": 12, "completion_tokens": 8, "total_tokens": 20 }
            }"#,
        )
        .create_async()
        .await;

    let client = OpenAIClient::new("test-key")
        .unwrap()
        .with_base_url(server.url());

    let response = client
        .complete(request_with(vec![Message::user("How did AAPL do?")], None))
        .await
        .unwrap();

    mock.assert_async().await;
    match &response.content[0] {
        ContentBlock::Text { text } => assert_eq!(text, "AAPL closed higher today."),
    }
    assert!(response.tool_calls.is_none());
    assert_eq!(response.usage.input_tokens, 12);
    assert_eq!(response.usage.output_tokens, 8);
}

#[tokio::test]
async fn complete_extracts_tool_calls() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "id": "chatcmpl-2",
                "object": "chat.completion",
                "created": 1724400000,
                "model": "gpt-4o",
                "choices": [{
                    "index": 0,
                    "message": {
                        "role": "assistant",
                        "content": null,
                        "tool_calls": [{
                            "id": "call_abc",
                            "type": "function",
                            "function": { "name": "stock_quote", "arguments": "{\"symbol\": \"AAPL\"}" }
                        }]
                    },
                    "finish_reason": "tool_calls"
                }],
                "usage": { "prompt_tokens": 20, "completion_tokens": 10, "total_tokens": 30 }
            }"#,
        )
        .create_async()
        .await;

    let client = OpenAIClient::new("test-key")
        .unwrap()
        .with_base_url(server.url());

    let tools = vec![Tool::from_type::<QuoteArgs>()
        .name("stock_quote")
        .description("Look up the latest quote for a ticker symbol")
        .build()];

    let response = client
        .complete(request_with(
            vec![Message::user("Quote AAPL please")],
            Some(tools),
        ))
        .await
        .unwrap();

    mock.assert_async().await;
    let calls = response.tool_calls.expect("tool calls expected");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].id(), "call_abc");
    assert_eq!(calls[0].name(), "stock_quote");

    let args: QuoteArgs = calls[0].parse_arguments().unwrap();
    assert_eq!(args.symbol, "AAPL");
    assert_eq!(response.stop_reason.as_deref(), Some("tool_calls"));
}

#[tokio::test]
async fn tool_result_turns_round_trip_through_the_wire_format() {
    let mut server = mockito::Server::new_async().await;
    // Echo a final answer; the interesting part is that the request body
    // containing an assistant tool-call turn and its tool result serializes.
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_body(mockito::Matcher::AllOf(vec![
            mockito::Matcher::Regex("\"tool_call_id\":\"call_abc\"".to_string()),
            mockito::Matcher::Regex("\"tool_calls\":".to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "id": "chatcmpl-3",
                "object": "chat.completion",
                "created": 1724400000,
                "model": "gpt-4o",
                "choices": [{
                    "index": 0,
                    "message": { "role": "assistant", "content": "AAPL trades at 212.30 USD." },
                    "finish_reason": "stop"
                }],
                "usage": { "prompt_tokens": 40, "completion_tokens": 9, "total_tokens": 49 }
            }"#,
        )
        .create_async()
        .await;

    let client = OpenAIClient::new("test-key")
        .unwrap()
        .with_base_url(server.url());

    let call = finagent_llm::tools::ToolCall::new(
        "call_abc".to_string(),
        "stock_quote".to_string(),
        serde_json::json!({ "symbol": "AAPL" }),
    );
    let messages = vec![
        Message::user("Quote AAPL please"),
        Message::assistant_with_tool_calls("", vec![call]),
        Message::tool_result("call_abc", "AAPL: 212.30 USD (+1.20, +0.57%)"),
    ];

    let response = client.complete(request_with(messages, None)).await.unwrap();

    mock.assert_async().await;
    match &response.content[0] {
        ContentBlock::Text { text } => assert_eq!(text, "AAPL trades at 212.30 USD."),
    }
}

#[tokio::test]
async fn authentication_errors_are_mapped() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(401)
        .with_body(r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#)
        .create_async()
        .await;

    let client = OpenAIClient::new("bad-key")
        .unwrap()
        .with_base_url(server.url());

    let err = client
        .complete(request_with(vec![Message::user("hi")], None))
        .await
        .unwrap_err();

    match err {
        LlmError::Authentication { message } => {
            assert_eq!(message, "Incorrect API key provided")
        }
        other => panic!("expected authentication error, got {:?}", other),
    }
}

#[tokio::test]
async fn rate_limit_errors_carry_retry_after() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(429)
        .with_header("retry-after", "30")
        .with_body(r#"{"error": {"message": "Rate limit reached", "type": "tokens"}}"#)
        .create_async()
        .await;

    let client = OpenAIClient::new("test-key")
        .unwrap()
        .with_base_url(server.url());

    let err = client
        .complete(request_with(vec![Message::user("hi")], None))
        .await
        .unwrap_err();

    match err {
        LlmError::RateLimit {
            message,
            retry_after,
        } => {
            assert_eq!(message, "Rate limit reached");
            assert_eq!(retry_after, Some(30));
        }
        other => panic!("expected rate limit error, got {:?}", other),
    }
}
