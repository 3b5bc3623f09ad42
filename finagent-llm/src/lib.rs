//! # FinAgent LLM SDK
//!
//! A small LLM client SDK with unified tool-calling types and an OpenAI
//! Chat Completions implementation.
//!
//! ## Example
//!
//! ```rust,no_run
//! use finagent_llm::client::LlmClient;
//! use finagent_llm::openai::OpenAIClient;
//! use finagent_llm::types::{CompletionRequest, ContentBlock, Message};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OpenAIClient::new("your-api-key")?;
//!     let response = client
//!         .complete(CompletionRequest {
//!             messages: vec![Message::user("What moved the market today?")],
//!             max_tokens: 1024,
//!             model: client.model_name().to_string(),
//!             system: None,
//!             temperature: None,
//!             top_p: None,
//!             stop_sequences: None,
//!             tools: None,
//!             tool_choice: None,
//!         })
//!         .await?;
//!
//!     match &response.content[0] {
//!         ContentBlock::Text { text } => println!("Response: {}", text),
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod models;
pub mod openai;
pub mod providers;
pub mod tools;
pub mod types;
