use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Request for a general web search
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WebSearchRequest {
    #[schemars(description = "Search query for general market or company information")]
    pub query: String,
}

/// One extracted search result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub snippet: String,
}

/// Web search result; an empty hit list is a valid answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSearchResponse {
    pub query: String,
    pub results: Vec<SearchHit>,
}
