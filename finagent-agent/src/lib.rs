pub mod stock_analysis;
pub mod storage;
pub mod tools;
pub mod types;

use async_trait::async_trait;
use finagent_tools::{
    StockFinancialsRequest, StockNewsRequest, StockQuoteRequest, ToolRequest, ToolResponse,
    WebSearchRequest,
};

/// Represents the types of tools available to agents
#[derive(Debug, Clone, PartialEq)]
pub enum AgentTool {
    StockQuote,
    StockFinancials,
    StockNews,
    WebSearch,
}

impl AgentTool {
    /// Returns the tool name as used in ToolRequest
    pub fn name(&self) -> &'static str {
        match self {
            AgentTool::StockQuote => "stock_quote",
            AgentTool::StockFinancials => "stock_financials",
            AgentTool::StockNews => "stock_news",
            AgentTool::WebSearch => "web_search",
        }
    }

    /// Convert AgentTool to finagent-llm Tool definition for the model
    pub fn to_tool_definition(&self) -> finagent_llm::tools::Tool {
        tools::llm_schemas::get_tool_definition(self.name())
            .expect("Tool definition must exist")
    }

    /// Parse a model tool call into a typed ToolRequest
    pub fn parse_tool_call(
        name: &str,
        arguments: serde_json::Value,
    ) -> anyhow::Result<ToolRequest> {
        let request = match name {
            "stock_quote" => {
                let req: StockQuoteRequest = serde_json::from_value(arguments)?;
                ToolRequest::StockQuote(req)
            }
            "stock_financials" => {
                let req: StockFinancialsRequest = serde_json::from_value(arguments)?;
                ToolRequest::StockFinancials(req)
            }
            "stock_news" => {
                let req: StockNewsRequest = serde_json::from_value(arguments)?;
                ToolRequest::StockNews(req)
            }
            "web_search" => {
                let req: WebSearchRequest = serde_json::from_value(arguments)?;
                ToolRequest::WebSearch(req)
            }
            _ => anyhow::bail!("Unknown tool: {}", name),
        };

        Ok(request)
    }
}

/// Format ToolResponse for display to the model
pub fn format_tool_response(response: &ToolResponse) -> String {
    match response {
        ToolResponse::StockQuote(r) => format!(
            "{} ({}, {}): price {:.2} {}, previous close {:.2}, change {:+.2} ({:+.2}%)",
            r.symbol, r.exchange, r.currency, r.price, r.currency, r.previous_close, r.change,
            r.change_percent
        ),
        ToolResponse::StockFinancials(r) => {
            let mut lines = vec![format!("Financial summary for {}:", r.symbol)];
            let mut push_metric = |label: &str, value: Option<f64>| {
                if let Some(v) = value {
                    lines.push(format!("  {}: {}", label, v));
                }
            };
            push_metric("market cap", r.market_cap);
            push_metric("trailing P/E", r.trailing_pe);
            push_metric("trailing EPS", r.trailing_eps);
            push_metric("52-week low", r.fifty_two_week_low);
            push_metric("52-week high", r.fifty_two_week_high);
            push_metric("dividend yield", r.dividend_yield);
            lines.join("\n")
        }
        ToolResponse::StockNews(r) => {
            if r.articles.is_empty() {
                format!("No recent news found for \"{}\"", r.query)
            } else {
                let items: Vec<String> = r
                    .articles
                    .iter()
                    .map(|a| format!("- {} ({}) {}", a.title, a.publisher, a.link))
                    .collect();
                format!(
                    "Found {} articles for \"{}\":\n{}",
                    r.articles.len(),
                    r.query,
                    items.join("\n")
                )
            }
        }
        ToolResponse::WebSearch(r) => {
            if r.results.is_empty() {
                format!("No search results for \"{}\"", r.query)
            } else {
                let items: Vec<String> = r
                    .results
                    .iter()
                    .map(|h| format!("- {}: {}", h.title, h.snippet))
                    .collect();
                format!(
                    "Top {} results for \"{}\":\n{}",
                    r.results.len(),
                    r.query,
                    items.join("\n")
                )
            }
        }
    }
}

/// Trait defining the structure and behavior of an agent
#[async_trait]
pub trait Agent: Send + Sync {
    /// Returns the agent's clear objective
    fn objective(&self) -> &str;

    /// Returns the system prompt for the agent
    fn system_prompt(&self) -> String;

    /// Returns the list of tools available to this agent
    fn tools(&self) -> Vec<AgentTool>;

    /// Run one user turn to completion within an existing session
    async fn execute(&self, _user_prompt: &str, _session_id: &str) -> anyhow::Result<String> {
        anyhow::bail!("Execute method not implemented for this agent")
    }
}
