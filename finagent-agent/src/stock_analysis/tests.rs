use super::*;
use crate::storage::InMemoryStorage;
use crate::types::Session;
use finagent_llm::error::LlmError;
use finagent_llm::tools::ToolCall as LlmToolCall;
use finagent_llm::types::{CompletionRequest, CompletionResponse, ContentBlock, Role, Usage};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Mock LLM client that replays a scripted sequence of responses
struct MockLlmClient {
    responses: Mutex<Vec<CompletionResponse>>,
    call_count: AtomicUsize,
}

impl MockLlmClient {
    fn new(mut responses: Vec<CompletionResponse>) -> Self {
        responses.reverse();
        Self {
            responses: Mutex::new(responses),
            call_count: AtomicUsize::new(0),
        }
    }

    fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| LlmError::internal("Mock ran out of scripted responses"))
    }

    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

fn text_response(text: &str) -> CompletionResponse {
    CompletionResponse {
        content: vec![ContentBlock::Text {
            text: text.to_string(),
        }],
        role: Role::Assistant,
        usage: Usage {
            input_tokens: 10,
            output_tokens: 20,
        },
        stop_reason: Some("stop".to_string()),
        tool_calls: None,
    }
}

fn tool_call_response(calls: Vec<LlmToolCall>) -> CompletionResponse {
    CompletionResponse {
        content: vec![],
        role: Role::Assistant,
        usage: Usage {
            input_tokens: 10,
            output_tokens: 20,
        },
        stop_reason: Some("tool_calls".to_string()),
        tool_calls: Some(calls),
    }
}

async fn create_session(storage: &InMemoryStorage, user_prompt: &str) -> String {
    storage
        .create_session(Session {
            id: None,
            agent_name: "stock_analysis".to_string(),
            provider: "mock".to_string(),
            model: "mock-model".to_string(),
            system_prompt: None,
            user_prompt: user_prompt.to_string(),
            status: SessionStatus::Running,
            started_at: chrono::Utc::now().timestamp(),
            ended_at: None,
            result: None,
            error: None,
        })
        .await
        .unwrap()
}

fn quote_chart_body() -> &'static str {
    r#"{"chart": {"result": [{"meta": {
        "symbol": "AAPL",
        "currency": "USD",
        "exchangeName": "NasdaqGS",
        "regularMarketPrice": 212.3,
        "chartPreviousClose": 210.0
    }}]}}"#
}

#[tokio::test]
async fn plain_question_needs_one_model_invocation() {
    let client = Arc::new(MockLlmClient::new(vec![text_response(
        "A P/E ratio compares price to earnings per share.",
    )]));
    let storage = Arc::new(InMemoryStorage::new());
    let executor = Arc::new(ToolExecutor::new());
    let agent = StockAnalysisAgent::new(client.clone(), storage.clone(), executor);

    let session_id = create_session(&storage, "What is a P/E ratio?").await;
    let answer = agent
        .execute("What is a P/E ratio?", &session_id)
        .await
        .unwrap();

    assert!(answer.contains("P/E ratio"));
    assert_eq!(client.call_count(), 1);

    let session = storage.get_session(&session_id).await.unwrap().unwrap();
    assert_eq!(session.status, SessionStatus::Completed);
    assert_eq!(session.result.as_deref(), Some(answer.as_str()));
    assert!(session.ended_at.is_some());
}

#[tokio::test]
async fn tool_call_round_trip_feeds_result_back_to_model() {
    let mut server = mockito::Server::new_async().await;
    let quote_mock = server
        .mock("GET", "/v8/finance/chart/AAPL")
        .with_status(200)
        .with_body(quote_chart_body())
        .expect(1)
        .create_async()
        .await;

    let client = Arc::new(MockLlmClient::new(vec![
        tool_call_response(vec![LlmToolCall::new(
            "call_1".to_string(),
            "stock_quote".to_string(),
            json!({"symbol": "AAPL"}),
        )]),
        text_response("AAPL trades at 212.30 USD, up 1.10% on the day."),
    ]));
    let storage = Arc::new(InMemoryStorage::new());
    let executor = Arc::new(ToolExecutor::builder().market_base_url(server.url()).build());
    let agent = StockAnalysisAgent::new(client.clone(), storage.clone(), executor);

    let session_id = create_session(&storage, "How is AAPL doing?").await;
    let answer = agent.execute("How is AAPL doing?", &session_id).await.unwrap();

    quote_mock.assert_async().await;
    assert_eq!(client.call_count(), 2);
    assert!(answer.contains("212.30"));

    let messages = storage.get_messages(&session_id).await.unwrap();
    // user, assistant (tool calls), tool result, assistant (final)
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[1].role, MessageRole::Assistant);
    assert!(messages[1].tool_calls.is_some());
    assert_eq!(messages[2].role, MessageRole::Tool);
    assert_eq!(messages[2].tool_call_id.as_deref(), Some("call_1"));

    let tool_calls = storage.get_tool_calls(&session_id).await.unwrap();
    assert_eq!(tool_calls.len(), 1);
    assert_eq!(tool_calls[0].status, ToolCallStatus::Completed);
    assert_eq!(tool_calls[0].tool_call_id, "call_1");
    assert!(tool_calls[0].execution_time_ms.is_some());
}

#[tokio::test]
async fn sequential_tool_rounds_invoke_the_model_each_time() {
    let mut server = mockito::Server::new_async().await;
    let quote_mock = server
        .mock("GET", "/v8/finance/chart/AAPL")
        .with_status(200)
        .with_body(quote_chart_body())
        .expect(1)
        .create_async()
        .await;
    let financials_mock = server
        .mock(
            "GET",
            "/v10/finance/quoteSummary/AAPL?modules=summaryDetail,defaultKeyStatistics",
        )
        .with_status(200)
        .with_body(
            r#"{"quoteSummary": {"result": [{
                "summaryDetail": {
                    "marketCap": {"raw": 3.2e12},
                    "trailingPE": {"raw": 33.1}
                },
                "defaultKeyStatistics": {}
            }]}}"#,
        )
        .expect(1)
        .create_async()
        .await;

    let client = Arc::new(MockLlmClient::new(vec![
        tool_call_response(vec![LlmToolCall::new(
            "call_1".to_string(),
            "stock_quote".to_string(),
            json!({"symbol": "AAPL"}),
        )]),
        tool_call_response(vec![LlmToolCall::new(
            "call_2".to_string(),
            "stock_financials".to_string(),
            json!({"symbol": "AAPL"}),
        )]),
        text_response("AAPL trades at 212.30 USD with a trailing P/E of 33.1."),
    ]));
    let storage = Arc::new(InMemoryStorage::new());
    let executor = Arc::new(ToolExecutor::builder().market_base_url(server.url()).build());
    let agent = StockAnalysisAgent::new(client.clone(), storage.clone(), executor);

    let session_id = create_session(&storage, "Is AAPL expensive right now?").await;
    let answer = agent
        .execute("Is AAPL expensive right now?", &session_id)
        .await
        .unwrap();

    quote_mock.assert_async().await;
    financials_mock.assert_async().await;
    assert_eq!(client.call_count(), 3);
    assert!(answer.contains("P/E"));

    let tool_calls = storage.get_tool_calls(&session_id).await.unwrap();
    assert_eq!(tool_calls.len(), 2);
    assert!(tool_calls
        .iter()
        .all(|t| t.status == ToolCallStatus::Completed));
}

#[tokio::test]
async fn multiple_tool_calls_in_one_turn_all_execute() {
    let mut server = mockito::Server::new_async().await;
    let quote_mock = server
        .mock("GET", "/v8/finance/chart/AAPL")
        .with_status(200)
        .with_body(quote_chart_body())
        .expect(1)
        .create_async()
        .await;
    let news_mock = server
        .mock("GET", "/v1/finance/search?q=AAPL&newsCount=5&quotesCount=0")
        .with_status(200)
        .with_body(r#"{"news": [{"title": "Apple ships new phone", "publisher": "Newswire", "link": "https://example.com/a"}]}"#)
        .expect(1)
        .create_async()
        .await;

    let client = Arc::new(MockLlmClient::new(vec![
        tool_call_response(vec![
            LlmToolCall::new(
                "call_1".to_string(),
                "stock_quote".to_string(),
                json!({"symbol": "AAPL"}),
            ),
            LlmToolCall::new(
                "call_2".to_string(),
                "stock_news".to_string(),
                json!({"query": "AAPL"}),
            ),
        ]),
        text_response("AAPL is up on phone launch coverage."),
    ]));
    let storage = Arc::new(InMemoryStorage::new());
    let executor = Arc::new(ToolExecutor::builder().market_base_url(server.url()).build());
    let agent = StockAnalysisAgent::new(client.clone(), storage.clone(), executor);

    let session_id = create_session(&storage, "Quote and news for AAPL").await;
    agent
        .execute("Quote and news for AAPL", &session_id)
        .await
        .unwrap();

    quote_mock.assert_async().await;
    news_mock.assert_async().await;

    let messages = storage.get_messages(&session_id).await.unwrap();
    // user, assistant (2 tool calls), 2 tool results, assistant (final)
    assert_eq!(messages.len(), 5);
    assert_eq!(messages[2].tool_call_id.as_deref(), Some("call_1"));
    assert_eq!(messages[3].tool_call_id.as_deref(), Some("call_2"));
}

#[tokio::test]
async fn unknown_tool_name_fails_the_session() {
    let client = Arc::new(MockLlmClient::new(vec![tool_call_response(vec![
        LlmToolCall::new(
            "call_1".to_string(),
            "place_order".to_string(),
            json!({"symbol": "AAPL", "quantity": 100}),
        ),
    ])]));
    let storage = Arc::new(InMemoryStorage::new());
    let executor = Arc::new(ToolExecutor::new());
    let agent = StockAnalysisAgent::new(client, storage.clone(), executor);

    let session_id = create_session(&storage, "Buy some AAPL").await;
    let err = agent.execute("Buy some AAPL", &session_id).await.unwrap_err();
    assert!(err.to_string().contains("Unknown tool"));

    let session = storage.get_session(&session_id).await.unwrap().unwrap();
    assert_eq!(session.status, SessionStatus::Failed);
    assert!(session.error.is_some());
}

#[tokio::test]
async fn tool_failure_aborts_the_turn() {
    let mut server = mockito::Server::new_async().await;
    let quote_mock = server
        .mock("GET", "/v8/finance/chart/AAPL")
        .with_status(500)
        .with_body("upstream exploded")
        .expect(1)
        .create_async()
        .await;

    let client = Arc::new(MockLlmClient::new(vec![tool_call_response(vec![
        LlmToolCall::new(
            "call_1".to_string(),
            "stock_quote".to_string(),
            json!({"symbol": "AAPL"}),
        ),
    ])]));
    let storage = Arc::new(InMemoryStorage::new());
    let executor = Arc::new(ToolExecutor::builder().market_base_url(server.url()).build());
    let agent = StockAnalysisAgent::new(client.clone(), storage.clone(), executor);

    let session_id = create_session(&storage, "How is AAPL doing?").await;
    let err = agent
        .execute("How is AAPL doing?", &session_id)
        .await
        .unwrap_err();

    quote_mock.assert_async().await;
    assert!(err.to_string().contains("stock_quote"));
    assert_eq!(client.call_count(), 1);

    let session = storage.get_session(&session_id).await.unwrap().unwrap();
    assert_eq!(session.status, SessionStatus::Failed);

    let tool_calls = storage.get_tool_calls(&session_id).await.unwrap();
    assert_eq!(tool_calls.len(), 1);
    assert_eq!(tool_calls[0].status, ToolCallStatus::Failed);
    assert!(tool_calls[0].error_details.is_some());
}

#[tokio::test]
async fn iteration_cap_fails_a_looping_session() {
    let mut server = mockito::Server::new_async().await;
    let quote_mock = server
        .mock("GET", "/v8/finance/chart/AAPL")
        .with_status(200)
        .with_body(quote_chart_body())
        .expect(2)
        .create_async()
        .await;

    // Every response asks for another tool call; the cap must cut it off.
    let client = Arc::new(MockLlmClient::new(vec![
        tool_call_response(vec![LlmToolCall::new(
            "call_1".to_string(),
            "stock_quote".to_string(),
            json!({"symbol": "AAPL"}),
        )]),
        tool_call_response(vec![LlmToolCall::new(
            "call_2".to_string(),
            "stock_quote".to_string(),
            json!({"symbol": "AAPL"}),
        )]),
        text_response("never reached"),
    ]));
    let storage = Arc::new(InMemoryStorage::new());
    let executor = Arc::new(ToolExecutor::builder().market_base_url(server.url()).build());
    let agent = StockAnalysisAgent::new(client.clone(), storage.clone(), executor)
        .with_max_iterations(2);

    let session_id = create_session(&storage, "How is AAPL doing?").await;
    let err = agent
        .execute("How is AAPL doing?", &session_id)
        .await
        .unwrap_err();

    quote_mock.assert_async().await;
    assert!(err.to_string().contains("Maximum iteration limit"));
    assert_eq!(client.call_count(), 2);

    let session = storage.get_session(&session_id).await.unwrap().unwrap();
    assert_eq!(session.status, SessionStatus::Failed);
}

#[tokio::test]
async fn model_error_fails_the_session() {
    // Empty script: the first completion already errors
    let client = Arc::new(MockLlmClient::new(vec![]));
    let storage = Arc::new(InMemoryStorage::new());
    let executor = Arc::new(ToolExecutor::new());
    let agent = StockAnalysisAgent::new(client, storage.clone(), executor);

    let session_id = create_session(&storage, "How is AAPL doing?").await;
    let err = agent.execute("How is AAPL doing?", &session_id).await;
    assert!(err.is_err());

    let session = storage.get_session(&session_id).await.unwrap().unwrap();
    assert_eq!(session.status, SessionStatus::Failed);
}

#[test]
fn stock_analysis_agent_exposes_all_four_tools() {
    let client: Arc<dyn LlmClient> = Arc::new(MockLlmClient::new(vec![]));
    let storage = Arc::new(InMemoryStorage::new());
    let executor = Arc::new(ToolExecutor::new());
    let agent = StockAnalysisAgent::new(client, storage, executor);

    let tools = agent.tools();
    assert!(tools.contains(&AgentTool::StockQuote));
    assert!(tools.contains(&AgentTool::StockFinancials));
    assert!(tools.contains(&AgentTool::StockNews));
    assert!(tools.contains(&AgentTool::WebSearch));
    assert!(!agent.system_prompt().is_empty());
}
