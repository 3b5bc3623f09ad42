use thiserror::Error;

/// Errors raised by the data-retrieval tools
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("HTTP request failed: {source}")]
    Http {
        #[from]
        source: reqwest::Error,
    },

    #[error("Failed to parse upstream response: {source}")]
    Parse {
        #[from]
        source: serde_json::Error,
    },

    #[error("Upstream returned status {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("Required field missing in upstream response: {field}")]
    MissingField { field: String },

    #[error("Upstream returned no data for symbol {symbol}")]
    EmptyResponse { symbol: String },
}

impl ToolError {
    pub fn missing_field<S: Into<String>>(field: S) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    pub fn empty_response<S: Into<String>>(symbol: S) -> Self {
        Self::EmptyResponse {
            symbol: symbol.into(),
        }
    }
}
