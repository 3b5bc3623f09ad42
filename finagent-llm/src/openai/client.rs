use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::{
    error::LlmError,
    openai::types::{
        OpenAIChatCompletionRequest, OpenAIChatCompletionResponse, OpenAIErrorResponse,
        OpenAIFunctionCall, OpenAIMessage, OpenAIRole, OpenAIToolCall,
    },
    tools::{ProviderToolFormat, ToolCall},
    types::{CompletionRequest, CompletionResponse, ContentBlock, Message, Role, Usage},
};

/// OpenAI LLM client
pub struct OpenAIClient {
    api_key: String,
    base_url: String,
    model: String,
    http_client: reqwest::Client,
}

impl OpenAIClient {
    /// Create a new OpenAI client with the given API key
    pub fn new(api_key: impl Into<String>) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(LlmError::authentication("API key cannot be empty"));
        }

        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(300))
            .build()
            .map_err(|e| LlmError::Network { source: e })?;

        Ok(Self {
            api_key,
            base_url: "https://api.openai.com".to_string(),
            model: crate::models::openai::GPT_4O.to_string(),
            http_client,
        })
    }

    /// Set a custom base URL for the API
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the default model reported by [`crate::client::LlmClient::model_name`]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Create a chat completion using the OpenAI Chat Completions API
    pub async fn create_chat_completion(
        &self,
        request: OpenAIChatCompletionRequest,
    ) -> Result<OpenAIChatCompletionResponse, LlmError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|_| LlmError::authentication("Invalid API key format"))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let response = self
            .http_client
            .post(&url)
            .headers(headers)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Network { source: e })?;

        let status = response.status();

        if status.is_success() {
            let openai_response: OpenAIChatCompletionResponse = response
                .json()
                .await
                .map_err(|e| LlmError::internal(format!("Failed to parse response: {}", e)))?;
            return Ok(openai_response);
        }

        // Extract retry-after header before consuming the response
        let retry_after = if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            response
                .headers()
                .get("retry-after")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
        } else {
            None
        };

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        // Prefer the structured error message when the body parses
        let message = serde_json::from_str::<OpenAIErrorResponse>(&error_text)
            .map(|e| e.error.message)
            .unwrap_or(error_text);

        Err(error_from_status(status, message, retry_after))
    }
}

fn error_from_status(
    status: reqwest::StatusCode,
    message: String,
    retry_after: Option<u64>,
) -> LlmError {
    match status {
        reqwest::StatusCode::BAD_REQUEST => LlmError::invalid_request(message),
        reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
            LlmError::authentication(message)
        }
        reqwest::StatusCode::PAYLOAD_TOO_LARGE => LlmError::invalid_request("Request too large"),
        reqwest::StatusCode::TOO_MANY_REQUESTS => LlmError::rate_limit(message, retry_after),
        _ => LlmError::api_error(status.as_u16(), message),
    }
}

fn to_openai_message(message: Message) -> OpenAIMessage {
    let Message {
        role,
        content,
        tool_calls,
        tool_call_id,
    } = message;

    let text = content
        .into_iter()
        .map(|block| match block {
            ContentBlock::Text { text } => text,
        })
        .collect::<Vec<String>>()
        .join("");

    let role = match role {
        Role::User => OpenAIRole::User,
        Role::Assistant => OpenAIRole::Assistant,
        Role::System => OpenAIRole::System,
        Role::Tool => OpenAIRole::Tool,
    };

    let tool_calls = tool_calls.map(|calls| {
        calls
            .into_iter()
            .map(|call| OpenAIToolCall {
                id: call.id().to_string(),
                r#type: "function".to_string(),
                function: OpenAIFunctionCall {
                    name: call.name().to_string(),
                    arguments: call.arguments().to_string(),
                },
            })
            .collect::<Vec<_>>()
    });

    // Assistant turns that only request tools carry no content
    let content = if text.is_empty() && tool_calls.is_some() {
        None
    } else {
        Some(text)
    };

    OpenAIMessage {
        role,
        content,
        tool_calls,
        tool_call_id,
    }
}

impl OpenAIChatCompletionResponse {
    /// Extract tool calls from the first choice
    pub fn tool_calls(&self) -> Option<Vec<ToolCall>> {
        self.choices
            .first()?
            .message
            .tool_calls
            .as_ref()
            .map(|calls| {
                calls
                    .iter()
                    .map(|call| {
                        let arguments: serde_json::Value =
                            serde_json::from_str(&call.function.arguments)
                                .unwrap_or(serde_json::Value::Null);

                        ToolCall::new(call.id.clone(), call.function.name.clone(), arguments)
                    })
                    .collect()
            })
    }
}

#[async_trait]
impl crate::client::LlmClient for OpenAIClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let mut openai_messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system) = &request.system {
            openai_messages.push(OpenAIMessage::system(system.clone()));
        }
        for message in request.messages {
            openai_messages.push(to_openai_message(message));
        }

        let tools = request.tools.as_ref().map(|tools| {
            tools
                .iter()
                .map(crate::openai::tools::OpenAIToolFormat::to_provider_tool)
                .collect::<Vec<_>>()
        });
        let tool_choice = request
            .tool_choice
            .as_ref()
            .map(crate::openai::tools::OpenAIToolFormat::to_provider_tool_choice);

        let openai_request = OpenAIChatCompletionRequest {
            model: request.model,
            messages: openai_messages,
            max_completion_tokens: Some(request.max_tokens),
            temperature: request.temperature,
            top_p: request.top_p,
            stop: request.stop_sequences,
            stream: None,
            tools,
            tool_choice,
            parallel_tool_calls: None,
        };

        let openai_response = self.create_chat_completion(openai_request).await?;

        if openai_response.choices.is_empty() {
            return Err(LlmError::internal("No completion choices returned"));
        }

        let tool_calls = openai_response.tool_calls();
        let choice = &openai_response.choices[0];

        tracing::debug!(
            model = %openai_response.model,
            finish_reason = ?choice.finish_reason,
            tool_call_count = tool_calls.as_ref().map(|c| c.len()).unwrap_or(0),
            "Received chat completion"
        );

        let content = vec![ContentBlock::Text {
            text: choice.message.content.clone().unwrap_or_default(),
        }];

        Ok(CompletionResponse {
            content,
            role: Role::Assistant,
            usage: Usage {
                input_tokens: openai_response.usage.prompt_tokens,
                output_tokens: openai_response.usage.completion_tokens,
            },
            stop_reason: choice.finish_reason.clone(),
            tool_calls,
        })
    }

    fn provider_name(&self) -> &str {
        crate::providers::OPENAI
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
