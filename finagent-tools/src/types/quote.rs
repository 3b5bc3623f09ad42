use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Request for the latest market quote of a ticker
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StockQuoteRequest {
    #[schemars(description = "Ticker symbol to look up, e.g. AAPL or MSFT")]
    pub symbol: String,
}

/// Latest market data for a ticker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockQuoteResponse {
    pub symbol: String,
    pub currency: String,
    pub exchange: String,
    pub price: f64,
    pub previous_close: f64,
    pub change: f64,
    pub change_percent: f64,
}

/// Request for key statistics of a ticker
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StockFinancialsRequest {
    #[schemars(description = "Ticker symbol to fetch key statistics for, e.g. AAPL")]
    pub symbol: String,
}

/// Key statistics for a ticker; absent statistics are None
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockFinancialsResponse {
    pub symbol: String,
    pub market_cap: Option<f64>,
    pub trailing_pe: Option<f64>,
    pub trailing_eps: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub dividend_yield: Option<f64>,
}
