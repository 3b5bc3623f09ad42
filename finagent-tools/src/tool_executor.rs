use crate::news::fetch_stock_news;
use crate::quote::{fetch_stock_financials, fetch_stock_quote, MarketDataClient};
use crate::tool_error::ToolError;
use crate::types::{ToolRequest, ToolResponse};
use crate::websearch::{web_search, SearchClient};

/// Tool executor that dispatches tool requests to the data-retrieval
/// functions.
///
/// Owns the two HTTP clients (market data, web search) and passes them
/// explicitly into each call; there is no process-global client state.
pub struct ToolExecutor {
    market_client: MarketDataClient,
    search_client: SearchClient,
}

impl ToolExecutor {
    pub fn new() -> Self {
        Self {
            market_client: MarketDataClient::new(),
            search_client: SearchClient::new(),
        }
    }

    /// Start building a ToolExecutor with custom endpoints
    pub fn builder() -> ToolExecutorBuilder {
        ToolExecutorBuilder::default()
    }

    /// Execute a tool request and return a tool response
    pub async fn execute(&self, request: ToolRequest) -> Result<ToolResponse, ToolError> {
        match request {
            ToolRequest::StockQuote(req) => fetch_stock_quote(&self.market_client, req).await,
            ToolRequest::StockFinancials(req) => {
                fetch_stock_financials(&self.market_client, req).await
            }
            ToolRequest::StockNews(req) => fetch_stock_news(&self.market_client, req).await,
            ToolRequest::WebSearch(req) => web_search(&self.search_client, req).await,
        }
    }
}

impl Default for ToolExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating a ToolExecutor with custom endpoints
#[derive(Default)]
pub struct ToolExecutorBuilder {
    market_base_url: Option<String>,
    search_base_url: Option<String>,
}

impl ToolExecutorBuilder {
    /// Override the market-data endpoint (used by tests)
    pub fn market_base_url(mut self, url: impl Into<String>) -> Self {
        self.market_base_url = Some(url.into());
        self
    }

    /// Override the web-search endpoint (used by tests)
    pub fn search_base_url(mut self, url: impl Into<String>) -> Self {
        self.search_base_url = Some(url.into());
        self
    }

    /// Build the ToolExecutor
    pub fn build(self) -> ToolExecutor {
        let mut market_client = MarketDataClient::new();
        if let Some(url) = self.market_base_url {
            market_client = market_client.with_base_url(url);
        }
        let mut search_client = SearchClient::new();
        if let Some(url) = self.search_base_url {
            search_client = search_client.with_base_url(url);
        }

        ToolExecutor {
            market_client,
            search_client,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StockQuoteRequest;

    #[tokio::test]
    async fn executor_dispatches_by_request_variant() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v8/finance/chart/MSFT")
            .with_status(200)
            .with_body(
                r#"{"chart": {"result": [{"meta": {
                    "symbol": "MSFT",
                    "currency": "USD",
                    "exchangeName": "NasdaqGS",
                    "regularMarketPrice": 430.5,
                    "chartPreviousClose": 428.0
                }}]}}"#,
            )
            .expect(1)
            .create_async()
            .await;

        let executor = ToolExecutor::builder().market_base_url(server.url()).build();
        let response = executor
            .execute(ToolRequest::StockQuote(StockQuoteRequest {
                symbol: "MSFT".to_string(),
            }))
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(matches!(response, ToolResponse::StockQuote(_)));
    }
}
