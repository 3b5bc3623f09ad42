use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Request for recent news about a ticker or company
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StockNewsRequest {
    #[schemars(description = "Ticker symbol or company name to search news for")]
    pub query: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Maximum number of articles to return. Defaults to 5, maximum 10.")]
    pub count: Option<usize>,
}

/// One news article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub publisher: String,
    pub link: String,
}

/// News search result; an empty article list is a valid answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockNewsResponse {
    pub query: String,
    pub articles: Vec<NewsArticle>,
}
