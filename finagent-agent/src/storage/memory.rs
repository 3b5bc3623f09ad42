use crate::storage::{AgentStorage, StorageError};
use crate::types::{Message, Session, SessionStatus, ToolCall};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Process-resident session storage. Conversations grow append-only and
/// vanish with the process; there is no durable backing store.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    sessions: Arc<Mutex<HashMap<String, Session>>>,
    messages: Arc<Mutex<HashMap<String, Vec<Message>>>>,
    tool_calls: Arc<Mutex<HashMap<String, Vec<ToolCall>>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl AgentStorage for InMemoryStorage {
    async fn create_session(&self, session: Session) -> Result<String, StorageError> {
        let session_id = uuid::Uuid::new_v4().to_string();
        let mut session_with_id = session;
        session_with_id.id = Some(session_id.clone());
        self.sessions
            .lock()
            .unwrap()
            .insert(session_id.clone(), session_with_id);
        Ok(session_id)
    }

    async fn get_session(&self, session_id: &str) -> Result<Option<Session>, StorageError> {
        Ok(self.sessions.lock().unwrap().get(session_id).cloned())
    }

    async fn update_session(&self, session: Session) -> Result<(), StorageError> {
        let session_id = session
            .id
            .clone()
            .ok_or_else(|| StorageError::OperationFailed("Session has no id".to_string()))?;
        self.sessions.lock().unwrap().insert(session_id, session);
        Ok(())
    }

    async fn list_sessions(&self) -> Result<Vec<Session>, StorageError> {
        let mut sessions: Vec<Session> = self.sessions.lock().unwrap().values().cloned().collect();
        sessions.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(sessions)
    }

    // Check-and-claim under a single lock; releasing the mutex between the
    // status read and the write would let two turns claim the same session.
    async fn begin_turn(&self, session_id: &str) -> Result<bool, StorageError> {
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| StorageError::NotFound(session_id.to_string()))?;
        if session.status == SessionStatus::Running {
            return Ok(false);
        }
        session.status = SessionStatus::Running;
        session.result = None;
        session.error = None;
        session.ended_at = None;
        Ok(true)
    }

    async fn create_message(&self, message: Message) -> Result<String, StorageError> {
        let message_id = uuid::Uuid::new_v4().to_string();
        let mut message_with_id = message;
        message_with_id.id = Some(message_id.clone());
        self.messages
            .lock()
            .unwrap()
            .entry(message_with_id.session_id.clone())
            .or_default()
            .push(message_with_id);
        Ok(message_id)
    }

    async fn get_messages(&self, session_id: &str) -> Result<Vec<Message>, StorageError> {
        Ok(self
            .messages
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_tool_call(&self, tool_call: ToolCall) -> Result<String, StorageError> {
        let record_id = uuid::Uuid::new_v4().to_string();
        let mut record_with_id = tool_call;
        record_with_id.id = Some(record_id.clone());
        self.tool_calls
            .lock()
            .unwrap()
            .entry(record_with_id.session_id.clone())
            .or_default()
            .push(record_with_id);
        Ok(record_id)
    }

    async fn update_tool_call(&self, tool_call: ToolCall) -> Result<(), StorageError> {
        let record_id = tool_call
            .id
            .clone()
            .ok_or_else(|| StorageError::OperationFailed("Tool call has no id".to_string()))?;
        let mut tool_calls = self.tool_calls.lock().unwrap();
        let records = tool_calls
            .get_mut(&tool_call.session_id)
            .ok_or_else(|| StorageError::NotFound(tool_call.session_id.clone()))?;
        let position = records
            .iter()
            .position(|record| record.id.as_deref() == Some(record_id.as_str()))
            .ok_or_else(|| StorageError::NotFound(record_id.clone()))?;
        records[position] = tool_call;
        Ok(())
    }

    async fn get_tool_calls(&self, session_id: &str) -> Result<Vec<ToolCall>, StorageError> {
        Ok(self
            .tool_calls
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .unwrap_or_default())
    }
}
