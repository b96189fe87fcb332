use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("rate limited by record API (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("record {id} not found")]
    NotFound { id: i64 },

    /// The API answered with its own `{"error", "detail"}` envelope.
    #[error("record API error (HTTP {status}): {detail}")]
    Api { status: u16, detail: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("empty response body from {url}")]
    EmptyBody { url: String },

    #[error("invalid API base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}

/// Batch-level failures of an enrichment run. Per-record failures never
/// end up here; they become unavailable entries instead.
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("invalid record id {id} at position {index}")]
    InvalidId { index: usize, id: i64 },

    #[error("could not list candidate records: {0}")]
    Listing(#[source] ClientError),
}
