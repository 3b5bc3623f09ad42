//! Data-retrieval tools for the finagent stock assistant.
//!
//! Each tool is a stateless fetch-and-format operation: a typed request in,
//! a typed response out, dispatched through [`ToolExecutor`].

pub mod news;
pub mod quote;
pub mod tool_error;
pub mod tool_executor;
pub mod types;
pub mod websearch;

pub use quote::MarketDataClient;
pub use tool_error::ToolError;
pub use tool_executor::{ToolExecutor, ToolExecutorBuilder};
pub use types::*;
pub use websearch::SearchClient;
