//! General web search against the DuckDuckGo HTML endpoint.
//!
//! The endpoint serves plain HTML; results are extracted with regular
//! expressions (result anchors and snippet anchors), then tags are stripped
//! and common entities decoded.

use regex::Regex;
use reqwest::header::USER_AGENT;
use std::sync::OnceLock;

use crate::quote::BROWSER_USER_AGENT;
use crate::tool_error::ToolError;
use crate::types::{SearchHit, ToolResponse, WebSearchRequest, WebSearchResponse};

const DEFAULT_BASE_URL: &str = "https://html.duckduckgo.com";
const MAX_RESULTS: usize = 5;

/// Client for the HTML search endpoint
#[derive(Debug, Clone)]
pub struct SearchClient {
    base_url: String,
    http_client: reqwest::Client,
}

impl SearchClient {
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

    async fn fetch_results_page(&self, query: &str) -> Result<String, ToolError> {
        let url = format!("{}/html/", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .form(&[("q", query)])
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

        Ok(response.text().await?)
    }
}

impl Default for SearchClient {
    fn default() -> Self {
        Self::new()
    }
}

fn title_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?s)<a[^>]*class="result__a"[^>]*>(.*?)</a>"#).expect("static regex")
    })
}

fn snippet_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?s)<a[^>]*class="result__snippet"[^>]*>(.*?)</a>"#).expect("static regex")
    })
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").expect("static regex"))
}

fn clean_fragment(fragment: &str) -> String {
    let stripped = tag_regex().replace_all(fragment, "");
    stripped
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .trim()
        .to_string()
}

/// Extract up to `max_results` (title, snippet) pairs from a results page
pub(crate) fn extract_hits(html: &str, max_results: usize) -> Vec<SearchHit> {
    let titles = title_regex()
        .captures_iter(html)
        .map(|cap| clean_fragment(&cap[1]));
    let mut snippets = snippet_regex()
        .captures_iter(html)
        .map(|cap| clean_fragment(&cap[1]));

    titles
        .take(max_results)
        .map(|title| SearchHit {
            title,
            snippet: snippets.next().unwrap_or_default(),
        })
        .collect()
}

/// Run a web search and return the top results.
///
/// A page with no extractable results is a valid empty response.
pub async fn web_search(
    client: &SearchClient,
    request: WebSearchRequest,
) -> Result<ToolResponse, ToolError> {
    let html = client.fetch_results_page(&request.query).await?;
    let results = extract_hits(&html, MAX_RESULTS);

    tracing::debug!(query = %request.query, result_count = results.len(), "Web search completed");

    Ok(ToolResponse::WebSearch(WebSearchResponse {
        query: request.query,
        results,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
        <div class="result results_links results_links_deep web-result">
            <h2 class="result__title">
                <a rel="nofollow" class="result__a" href="https://example.com/1">Apple &amp; the <b>market</b></a>
            </h2>
            <a class="result__snippet" href="https://example.com/1">Shares of <b>Apple</b> rose after earnings.</a>
        </div>
        <div class="result results_links results_links_deep web-result">
            <h2 class="result__title">
                <a rel="nofollow" class="result__a" href="https://example.com/2">Second result</a>
            </h2>
            <a class="result__snippet" href="https://example.com/2">Another snippet.</a>
        </div>
    "#;

    #[test]
    fn hits_are_extracted_and_cleaned() {
        let hits = extract_hits(FIXTURE, 5);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "Apple & the market");
        assert_eq!(hits[0].snippet, "Shares of Apple rose after earnings.");
        assert_eq!(hits[1].title, "Second result");
    }

    #[test]
    fn extraction_respects_the_result_limit() {
        let hits = extract_hits(FIXTURE, 1);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn page_without_results_yields_empty_list() {
        let hits = extract_hits("<html><body>No results.</body></html>", 5);
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn search_round_trip_against_mock_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/html/")
            .with_status(200)
            .with_body(FIXTURE)
            .create_async()
            .await;

        let client = SearchClient::new().with_base_url(server.url());
        let response = web_search(
            &client,
            WebSearchRequest {
                query: "apple earnings".to_string(),
            },
        )
        .await
        .unwrap();

        match response {
            ToolResponse::WebSearch(search) => {
                assert_eq!(search.query, "apple earnings");
                assert_eq!(search.results.len(), 2);
            }
            other => panic!("expected web search response, got {:?}", other),
        }
    }
}
