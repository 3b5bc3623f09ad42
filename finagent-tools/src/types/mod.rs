mod core;
mod news;
mod quote;
mod search;

pub use core::{ToolRequest, ToolResponse};
pub use news::{NewsArticle, StockNewsRequest, StockNewsResponse};
pub use quote::{
    StockFinancialsRequest, StockFinancialsResponse, StockQuoteRequest, StockQuoteResponse,
};
pub use search::{SearchHit, WebSearchRequest, WebSearchResponse};
