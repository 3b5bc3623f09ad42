mod message;
mod session;
mod tool_call;

pub use message::{Message, MessageRole};
pub use session::{Session, SessionStatus};
pub use tool_call::{ToolCall, ToolCallStatus};
