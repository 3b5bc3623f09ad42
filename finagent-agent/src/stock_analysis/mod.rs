use crate::{
    storage::AgentStorage,
    types::{Message, MessageRole, Session, SessionStatus, ToolCall as StorageToolCall, ToolCallStatus},
    Agent, AgentTool,
};
use async_trait::async_trait;
use finagent_llm::client::LlmClient;
use finagent_llm::tools::{ToolCall as LlmToolCall, ToolChoice};
use finagent_llm::types::{CompletionRequest, ContentBlock, Message as LlmMessage};
use finagent_tools::ToolExecutor;
use std::sync::Arc;
use std::time::Instant;

#[cfg(test)]
mod tests;

/// Upper bound on model round trips for a single user turn
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// What the model asked for in one round trip. Every response is exactly
/// one of these; there is no third state.
enum AssistantAction {
    ToolCalls { text: String, calls: Vec<LlmToolCall> },
    Final(String),
}

impl AssistantAction {
    fn classify(text: String, tool_calls: Option<Vec<LlmToolCall>>) -> Self {
        match tool_calls {
            Some(calls) if !calls.is_empty() => AssistantAction::ToolCalls { text, calls },
            _ => AssistantAction::Final(text),
        }
    }
}

/// Agent that answers stock and market questions by calling data-retrieval
/// tools until it has enough grounding to respond.
pub struct StockAnalysisAgent<S: AgentStorage> {
    client: Arc<dyn LlmClient>,
    storage: Arc<S>,
    tool_executor: Arc<ToolExecutor>,
    max_iterations: usize,
}

impl<S: AgentStorage> StockAnalysisAgent<S> {
    /// Create a new StockAnalysisAgent with the given components
    pub fn new(
        client: Arc<dyn LlmClient>,
        storage: Arc<S>,
        tool_executor: Arc<ToolExecutor>,
    ) -> Self {
        Self {
            client,
            storage,
            tool_executor,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Override the iteration cap (used by tests)
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Get tool definitions for this agent
    fn get_tool_definitions(&self) -> Vec<finagent_llm::tools::Tool> {
        self.tools()
            .into_iter()
            .map(|tool| tool.to_tool_definition())
            .collect()
    }
}

#[async_trait]
impl<S: AgentStorage> Agent for StockAnalysisAgent<S> {
    fn objective(&self) -> &str {
        "Answer stock and market questions grounded in live market data"
    }

    fn system_prompt(&self) -> String {
        "You are a financial assistant specialized in stocks and markets. \
         Use the available tools to look up quotes, key statistics, recent news \
         and general market context before answering. Ground every factual claim \
         in tool results and say so when data is unavailable. Do not give \
         personalized investment advice."
            .to_string()
    }

    fn tools(&self) -> Vec<AgentTool> {
        vec![
            AgentTool::StockQuote,
            AgentTool::StockFinancials,
            AgentTool::StockNews,
            AgentTool::WebSearch,
        ]
    }

    async fn execute(&self, user_prompt: &str, session_id: &str) -> anyhow::Result<String> {
        let user_message = Message::user(session_id, user_prompt);
        self.storage.create_message(user_message).await?;

        let tools = self.get_tool_definitions();
        let mut iteration = 0;

        loop {
            iteration += 1;
            if iteration > self.max_iterations {
                let error = "Maximum iteration limit reached";
                self.fail_session(session_id, error).await?;
                return Err(anyhow::anyhow!(error));
            }

            tracing::debug!(session_id, iteration, "Requesting model completion");

            let messages = self.build_messages(session_id).await?;
            let request = CompletionRequest {
                messages,
                max_tokens: 4000,
                model: self.client.model_name().to_string(),
                system: Some(self.system_prompt()),
                temperature: Some(0.7),
                top_p: None,
                stop_sequences: None,
                tools: Some(tools.clone()),
                tool_choice: Some(ToolChoice::Auto),
            };

            let response = match self.client.complete(request).await {
                Ok(response) => response,
                Err(e) => {
                    self.fail_session(session_id, &e.to_string()).await?;
                    return Err(e.into());
                }
            };

            let text = extract_text_from_content(&response.content);

            match AssistantAction::classify(text, response.tool_calls) {
                AssistantAction::Final(answer) => {
                    let assistant_message = Message::assistant(session_id, answer.clone());
                    self.storage.create_message(assistant_message).await?;
                    self.complete_session(session_id, &answer).await?;
                    return Ok(answer);
                }
                AssistantAction::ToolCalls { text, calls: tool_calls } => {
                    let assistant_message = Message::assistant_with_tool_calls(
                        session_id,
                        text,
                        tool_calls.clone(),
                    );
                    let message_id = self.storage.create_message(assistant_message).await?;

                    for tool_call in &tool_calls {
                        if let Err(e) = self
                            .execute_tool_call(session_id, Some(&message_id), tool_call)
                            .await
                        {
                            self.fail_session(session_id, &format!("{:#}", e)).await?;
                            return Err(e);
                        }
                    }
                }
            }
        }
    }
}

impl<S: AgentStorage> StockAnalysisAgent<S> {
    async fn get_session(&self, session_id: &str) -> anyhow::Result<Session> {
        self.storage
            .get_session(session_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Session not found: {}", session_id))
    }

    async fn complete_session(&self, session_id: &str, result: &str) -> anyhow::Result<()> {
        let mut session = self.get_session(session_id).await?;
        session.status = SessionStatus::Completed;
        session.result = Some(result.to_string());
        session.ended_at = Some(chrono::Utc::now().timestamp());
        self.storage.update_session(session).await?;
        Ok(())
    }

    async fn fail_session(&self, session_id: &str, error: &str) -> anyhow::Result<()> {
        tracing::warn!(session_id, error, "Session failed");
        let mut session = self.get_session(session_id).await?;
        session.status = SessionStatus::Failed;
        session.error = Some(error.to_string());
        session.ended_at = Some(chrono::Utc::now().timestamp());
        self.storage.update_session(session).await?;
        Ok(())
    }

    /// Reconstruct the full conversation for the model, preserving tool-call
    /// requests on assistant turns and the tool_call_id on tool turns.
    async fn build_messages(&self, session_id: &str) -> anyhow::Result<Vec<LlmMessage>> {
        let stored = self.storage.get_messages(session_id).await?;

        stored
            .into_iter()
            .map(|msg| {
                let message = match msg.role {
                    MessageRole::User => LlmMessage::user(msg.content),
                    MessageRole::System => LlmMessage::system(msg.content),
                    MessageRole::Assistant => match msg.tool_calls {
                        Some(tool_calls) => {
                            LlmMessage::assistant_with_tool_calls(msg.content, tool_calls)
                        }
                        None => LlmMessage::assistant(msg.content),
                    },
                    MessageRole::Tool => {
                        let tool_call_id = msg.tool_call_id.ok_or_else(|| {
                            anyhow::anyhow!("Tool message without tool_call_id in session {}", session_id)
                        })?;
                        LlmMessage::tool_result(tool_call_id, msg.content)
                    }
                };
                Ok(message)
            })
            .collect()
    }

    async fn execute_tool_call(
        &self,
        session_id: &str,
        message_id: Option<&String>,
        tool_call: &LlmToolCall,
    ) -> anyhow::Result<()> {
        let tool_request =
            AgentTool::parse_tool_call(tool_call.name(), tool_call.arguments().clone())?;

        let mut tool_call_record = StorageToolCall {
            id: None,
            session_id: session_id.to_string(),
            message_id: message_id.cloned(),
            tool_call_id: tool_call.id().to_string(),
            tool_name: tool_call.name().to_string(),
            request: tool_call.arguments().clone(),
            response: None,
            status: ToolCallStatus::Pending,
            execution_time_ms: None,
            created_at: chrono::Utc::now().timestamp(),
            completed_at: None,
            error_details: None,
        };
        let record_id = self
            .storage
            .create_tool_call(tool_call_record.clone())
            .await?;

        let start = Instant::now();
        let result = self.tool_executor.execute(tool_request).await;
        let execution_time = start.elapsed().as_millis() as i64;

        match result {
            Ok(response) => {
                let response_json = serde_json::to_value(&response)?;
                tool_call_record.complete(response_json, execution_time);
                tool_call_record.id = Some(record_id);
                self.storage.update_tool_call(tool_call_record).await?;

                let result_text = crate::format_tool_response(&response);

                tracing::debug!(
                    tool_name = tool_call.name(),
                    tool_id = tool_call.id(),
                    execution_time_ms = execution_time,
                    "Sending tool result to model"
                );

                let tool_message =
                    Message::tool_result(session_id, tool_call.id(), result_text);
                self.storage.create_message(tool_message).await?;
                Ok(())
            }
            Err(e) => {
                let error_msg = e.to_string();
                tool_call_record.fail(error_msg.clone());
                tool_call_record.id = Some(record_id);
                self.storage.update_tool_call(tool_call_record).await?;

                tracing::warn!(
                    tool_name = tool_call.name(),
                    tool_id = tool_call.id(),
                    error = %error_msg,
                    "Tool execution failed, aborting turn"
                );

                Err(anyhow::anyhow!(
                    "Tool {} failed: {}",
                    tool_call.name(),
                    error_msg
                ))
            }
        }
    }
}

/// Helper function to extract text from content blocks
fn extract_text_from_content(content: &[ContentBlock]) -> String {
    content
        .iter()
        .map(|block| match block {
            ContentBlock::Text { text } => text.as_str(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
