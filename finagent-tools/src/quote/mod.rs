//! Market-data provider client: quote and key-statistics lookups.

use reqwest::header::USER_AGENT;
use serde::Deserialize;

use crate::tool_error::ToolError;
use crate::types::{
    StockFinancialsRequest, StockFinancialsResponse, StockQuoteRequest, StockQuoteResponse,
    ToolResponse,
};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

// The quote provider rejects requests without a browser-like agent.
pub(crate) const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Client for the market-data provider (quotes, statistics, ticker news)
#[derive(Debug, Clone)]
pub struct MarketDataClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl MarketDataClient {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            http_client: reqwest::Client::new(),
        }
    }

    /// Point the client at a different endpoint (used by tests)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub(crate) async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path_and_query: &str,
    ) -> Result<T, ToolError> {
        let url = format!("{}{}", self.base_url, path_and_query);
        let response = self
            .http_client
            .get(&url)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ToolError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl Default for MarketDataClient {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartEntry>>,
}

#[derive(Debug, Deserialize)]
struct ChartEntry {
    meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    symbol: String,
    currency: Option<String>,
    exchange_name: Option<String>,
    regular_market_price: Option<f64>,
    chart_previous_close: Option<f64>,
}

/// Fetch the latest quote for a ticker.
///
/// A payload without the regular market price is an error, never a
/// malformed text block.
pub async fn fetch_stock_quote(
    client: &MarketDataClient,
    request: StockQuoteRequest,
) -> Result<ToolResponse, ToolError> {
    let path = format!("/v8/finance/chart/{}", request.symbol);
    let envelope: ChartEnvelope = client.get_json(&path).await?;

    let entry = envelope
        .chart
        .result
        .and_then(|mut entries| {
            if entries.is_empty() {
                None
            } else {
                Some(entries.remove(0))
            }
        })
        .ok_or_else(|| ToolError::empty_response(&request.symbol))?;

    let meta = entry.meta;
    let price = meta
        .regular_market_price
        .ok_or_else(|| ToolError::missing_field("regularMarketPrice"))?;
    let previous_close = meta
        .chart_previous_close
        .ok_or_else(|| ToolError::missing_field("chartPreviousClose"))?;

    let change = price - previous_close;
    let change_percent = if previous_close != 0.0 {
        change / previous_close * 100.0
    } else {
        0.0
    };

    tracing::debug!(symbol = %meta.symbol, price, previous_close, "Fetched stock quote");

    Ok(ToolResponse::StockQuote(StockQuoteResponse {
        symbol: meta.symbol,
        currency: meta.currency.unwrap_or_else(|| "n/a".to_string()),
        exchange: meta.exchange_name.unwrap_or_else(|| "n/a".to_string()),
        price,
        previous_close,
        change,
        change_percent,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryEnvelope {
    quote_summary: SummaryResult,
}

#[derive(Debug, Deserialize)]
struct SummaryResult {
    result: Option<Vec<SummaryEntry>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryEntry {
    summary_detail: Option<SummaryDetail>,
    default_key_statistics: Option<KeyStatistics>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDetail {
    market_cap: Option<RawValue>,
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<RawValue>,
    fifty_two_week_low: Option<RawValue>,
    fifty_two_week_high: Option<RawValue>,
    dividend_yield: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyStatistics {
    trailing_eps: Option<RawValue>,
}

/// Numbers come wrapped as `{ "raw": 1.23, "fmt": "1.23" }`
#[derive(Debug, Deserialize)]
struct RawValue {
    raw: Option<f64>,
}

fn raw(value: Option<RawValue>) -> Option<f64> {
    value.and_then(|v| v.raw)
}

/// Fetch key statistics for a ticker.
///
/// A missing payload is an error; individual absent statistics stay None
/// and are skipped when the result is formatted.
pub async fn fetch_stock_financials(
    client: &MarketDataClient,
    request: StockFinancialsRequest,
) -> Result<ToolResponse, ToolError> {
    let path = format!(
        "/v10/finance/quoteSummary/{}?modules=summaryDetail,defaultKeyStatistics",
        request.symbol
    );
    let envelope: SummaryEnvelope = client.get_json(&path).await?;

    let entry = envelope
        .quote_summary
        .result
        .and_then(|mut entries| {
            if entries.is_empty() {
                None
            } else {
                Some(entries.remove(0))
            }
        })
        .ok_or_else(|| ToolError::empty_response(&request.symbol))?;

    let detail = entry.summary_detail;
    let stats = entry.default_key_statistics;

    let (market_cap, trailing_pe, low, high, dividend_yield) = match detail {
        Some(d) => (
            raw(d.market_cap),
            raw(d.trailing_pe),
            raw(d.fifty_two_week_low),
            raw(d.fifty_two_week_high),
            raw(d.dividend_yield),
        ),
        None => (None, None, None, None, None),
    };

    Ok(ToolResponse::StockFinancials(StockFinancialsResponse {
        symbol: request.symbol,
        market_cap,
        trailing_pe,
        trailing_eps: stats.and_then(|s| raw(s.trailing_eps)),
        fifty_two_week_low: low,
        fifty_two_week_high: high,
        dividend_yield,
    }))
}
