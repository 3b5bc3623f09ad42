use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Tool request enum containing all data-retrieval operations
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type")]
pub enum ToolRequest {
    #[serde(rename = "stock_quote")]
    StockQuote(super::quote::StockQuoteRequest),
    #[serde(rename = "stock_financials")]
    StockFinancials(super::quote::StockFinancialsRequest),
    #[serde(rename = "stock_news")]
    StockNews(super::news::StockNewsRequest),
    #[serde(rename = "web_search")]
    WebSearch(super::search::WebSearchRequest),
}

/// Tool response enum containing all possible tool results
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ToolResponse {
    #[serde(rename = "stock_quote")]
    StockQuote(super::quote::StockQuoteResponse),
    #[serde(rename = "stock_financials")]
    StockFinancials(super::quote::StockFinancialsResponse),
    #[serde(rename = "stock_news")]
    StockNews(super::news::StockNewsResponse),
    #[serde(rename = "web_search")]
    WebSearch(super::search::WebSearchResponse),
}
