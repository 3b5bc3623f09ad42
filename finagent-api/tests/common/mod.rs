use finagent_llm::client::LlmClient;
use finagent_llm::error::LlmError;
use finagent_llm::tools::ToolCall;
use finagent_llm::types::{CompletionRequest, CompletionResponse, ContentBlock, Role, Usage};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Mock LLM client that replays a scripted sequence of responses
pub struct MockLlmClient {
    responses: Mutex<Vec<CompletionResponse>>,
    call_count: AtomicUsize,
    delay: Option<Duration>,
}

impl MockLlmClient {
    pub fn new(mut responses: Vec<CompletionResponse>) -> Self {
        responses.reverse();
        Self {
            responses: Mutex::new(responses),
            call_count: AtomicUsize::new(0),
            delay: None,
        }
    }

    /// Hold each completion for `delay` before answering, to keep a turn
    /// in flight while another request races it.
    #[allow(dead_code)]
    pub fn with_delay(responses: Vec<CompletionResponse>, delay: Duration) -> Self {
        let mut client = Self::new(responses);
        client.delay = Some(delay);
        client
    }

    #[allow(dead_code)]
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
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

pub fn text_response(text: &str) -> CompletionResponse {
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

#[allow(dead_code)]
pub fn tool_call_response(calls: Vec<ToolCall>) -> CompletionResponse {
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
