use serde::{Deserialize, Serialize};

/// One turn in a conversation. Immutable once stored; the conversation is
/// an append-only ordered sequence of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Option<String>,
    pub session_id: String,
    pub role: MessageRole,
    pub content: String,
    /// Tool calls requested by an assistant turn
    pub tool_calls: Option<Vec<finagent_llm::tools::ToolCall>>,
    /// For tool turns: the identifier of the request this result answers
    pub tool_call_id: Option<String>,
    pub created_at: i64,
}

impl Message {
    fn new(session_id: impl Into<String>, role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: None,
            session_id: session_id.into(),
            role,
            content: content.into(),
            tool_calls: None,
            tool_call_id: None,
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    pub fn user(session_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(session_id, MessageRole::User, content)
    }

    pub fn assistant(session_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(session_id, MessageRole::Assistant, content)
    }

    pub fn assistant_with_tool_calls(
        session_id: impl Into<String>,
        content: impl Into<String>,
        tool_calls: Vec<finagent_llm::tools::ToolCall>,
    ) -> Self {
        let mut message = Self::new(session_id, MessageRole::Assistant, content);
        message.tool_calls = Some(tool_calls);
        message
    }

    pub fn tool_result(
        session_id: impl Into<String>,
        tool_call_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let mut message = Self::new(session_id, MessageRole::Tool, content);
        message.tool_call_id = Some(tool_call_id.into());
        message
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum MessageRole {
    User,
    Assistant,
    System,
    Tool,
}

impl MessageRole {
    pub fn as_str(&self) -> &str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::System => "system",
            MessageRole::Tool => "tool",
        }
    }
}
