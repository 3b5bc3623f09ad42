//! Ticker news lookup via the market-data provider's search endpoint.

use serde::Deserialize;

use crate::quote::MarketDataClient;
use crate::tool_error::ToolError;
use crate::types::{NewsArticle, StockNewsRequest, StockNewsResponse, ToolResponse};

const DEFAULT_COUNT: usize = 5;
const MAX_COUNT: usize = 10;

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    news: Vec<NewsItem>,
}

#[derive(Debug, Deserialize)]
struct NewsItem {
    title: String,
    #[serde(default)]
    publisher: Option<String>,
    #[serde(default)]
    link: Option<String>,
}

/// Fetch recent headlines for a ticker or company name.
///
/// An empty result list is a valid response; the caller renders it as
/// "no recent news".
pub async fn fetch_stock_news(
    client: &MarketDataClient,
    request: StockNewsRequest,
) -> Result<ToolResponse, ToolError> {
    let count = request.count.unwrap_or(DEFAULT_COUNT).min(MAX_COUNT);
    let path = format!(
        "/v1/finance/search?q={}&newsCount={}&quotesCount=0",
        urlencoding::encode(&request.query),
        count
    );
    let envelope: SearchEnvelope = client.get_json(&path).await?;

    let articles = envelope
        .news
        .into_iter()
        .take(count)
        .map(|item| NewsArticle {
            title: item.title,
            publisher: item.publisher.unwrap_or_else(|| "unknown".to_string()),
            link: item.link.unwrap_or_default(),
        })
        .collect::<Vec<_>>();

    tracing::debug!(query = %request.query, article_count = articles.len(), "Fetched stock news");

    Ok(ToolResponse::StockNews(StockNewsResponse {
        query: request.query,
        articles,
    }))
}
