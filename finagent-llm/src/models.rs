//! Model identifier constants

/// OpenAI model identifiers
pub mod openai {
    /// GPT-4o, the default reasoner for tool-calling agents
    pub const GPT_4O: &str = "gpt-4o";

    /// GPT-4o mini, cheaper variant
    pub const GPT_4O_MINI: &str = "gpt-4o-mini";
}
