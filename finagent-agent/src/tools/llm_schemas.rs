use finagent_llm::tools::Tool;
use finagent_tools::{
    StockFinancialsRequest, StockNewsRequest, StockQuoteRequest, WebSearchRequest,
};

/// Create tool definitions for the model from the typed request schemas
pub fn create_tool_definitions() -> Vec<Tool> {
    vec![
        Tool::from_type::<StockQuoteRequest>()
            .name("stock_quote")
            .description(
                "Get the latest market quote for a ticker symbol: price, previous close, \
                 change and change percent",
            )
            .build(),
        Tool::from_type::<StockFinancialsRequest>()
            .name("stock_financials")
            .description(
                "Get key statistics for a ticker symbol: market cap, P/E, EPS, 52-week \
                 range and dividend yield",
            )
            .build(),
        Tool::from_type::<StockNewsRequest>()
            .name("stock_news")
            .description("Get recent news headlines about a ticker symbol or company")
            .build(),
        Tool::from_type::<WebSearchRequest>()
            .name("web_search")
            .description(
                "Search the web for general market context, analyst commentary or company \
                 information not covered by the other tools",
            )
            .build(),
    ]
}

/// Get tool definition by name
pub fn get_tool_definition(tool_name: &str) -> Option<Tool> {
    create_tool_definitions()
        .into_iter()
        .find(|tool| tool.name() == tool_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definitions_cover_all_four_tools() {
        let names: Vec<String> = create_tool_definitions()
            .iter()
            .map(|t| t.name().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["stock_quote", "stock_financials", "stock_news", "web_search"]
        );
    }

    #[test]
    fn lookup_by_name_finds_definition() {
        assert!(get_tool_definition("stock_news").is_some());
        assert!(get_tool_definition("nonexistent").is_none());
    }
}
