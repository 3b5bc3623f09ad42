use crate::types::{Message, Session, ToolCall};
use async_trait::async_trait;

mod memory;

pub use memory::InMemoryStorage;

#[async_trait]
pub trait AgentStorage: Send + Sync {
    async fn create_session(&self, session: Session) -> Result<String, StorageError>;
    async fn get_session(&self, session_id: &str) -> Result<Option<Session>, StorageError>;
    async fn update_session(&self, session: Session) -> Result<(), StorageError>;
    async fn list_sessions(&self) -> Result<Vec<Session>, StorageError>;

    /// Claim a session for a new turn. Checks the status and marks the
    /// session running as one storage operation, so two callers racing on
    /// the same session cannot both claim it. Returns `false` when another
    /// turn is already running; `NotFound` when the session does not exist.
    async fn begin_turn(&self, session_id: &str) -> Result<bool, StorageError>;

    async fn create_message(&self, message: Message) -> Result<String, StorageError>;
    async fn get_messages(&self, session_id: &str) -> Result<Vec<Message>, StorageError>;

    async fn create_tool_call(&self, tool_call: ToolCall) -> Result<String, StorageError>;
    async fn update_tool_call(&self, tool_call: ToolCall) -> Result<(), StorageError>;
    async fn get_tool_calls(&self, session_id: &str) -> Result<Vec<ToolCall>, StorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage operation failed: {0}")]
    OperationFailed(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
