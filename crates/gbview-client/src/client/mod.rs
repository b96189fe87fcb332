//! HTTP client for the record JSON API.
//!
//! The API is a single endpoint dispatching on an `action` query parameter:
//! `recordById&id=N` returns one record (or `{}`/`[]` when there is none),
//! `fetchStreetView` lists records that carry a panorama link, and
//! `mapMarkers` returns full records for the map. Failures come back as a
//! non-2xx status with an `{"error": …, "detail": …}` body.

mod listing;

use std::time::Duration;

use gbview_core::{AppConfig, Record};
use reqwest::{Client, Url};
use serde_json::Value;

use crate::error::ClientError;
use crate::retry::retry_with_backoff;

const MAX_DETAIL_CHARS: usize = 300;

/// Client for the record JSON API.
///
/// Transient errors (429, network failures, 5xx) are retried with
/// exponential backoff up to `max_retries` additional attempts.
pub struct RecordClient {
    pub(super) client: Client,
    pub(super) base_url: Url,
    /// Maximum number of retry attempts after the first failure.
    pub(super) max_retries: u32,
    pub(super) backoff_base_secs: u64,
}

impl RecordClient {
    /// Creates a client for the API at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidBaseUrl`] if `base_url` is not an
    /// absolute http(s) URL, or [`ClientError::Http`] if the underlying
    /// `reqwest::Client` cannot be constructed.
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ClientError> {
        let base_url = parse_base_url(base_url)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url,
            max_retries,
            backoff_base_secs,
        })
    }

    /// Creates a client from the application configuration.
    ///
    /// # Errors
    ///
    /// See [`RecordClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ClientError> {
        Self::new(
            &config.api_base_url,
            config.request_timeout_secs,
            &config.user_agent,
            config.max_retries,
            config.retry_backoff_base_secs,
        )
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Fetches one record by id.
    ///
    /// # Errors
    ///
    /// - [`ClientError::NotFound`] when the API answers with an empty payload.
    /// - [`ClientError::Api`] when the API reports an error.
    /// - [`ClientError::Deserialize`] when the payload is not a record.
    /// - [`ClientError::Http`] / [`ClientError::RateLimited`] after retries.
    pub async fn record_by_id(&self, id: i64) -> Result<Record, ClientError> {
        let id_param = id.to_string();
        let url = self.action_url("recordById", &[("id", id_param.as_str())]);
        let context = format!("recordById(id={id})");

        let body = self
            .get_json(&url, &context)
            .await
            .map_err(|err| match err {
                ClientError::Api { status: 404, .. }
                | ClientError::UnexpectedStatus { status: 404, .. } => {
                    ClientError::NotFound { id }
                }
                other => other,
            })?;
        if is_empty_payload(&body) {
            return Err(ClientError::NotFound { id });
        }
        if let Some(detail) = api_error_detail(&body) {
            return Err(ClientError::Api {
                status: 200,
                detail,
            });
        }

        serde_json::from_value::<Record>(body)
            .map_err(|source| ClientError::Deserialize { context, source })
    }

    /// Builds `base_url?…&action=<action>&<params>`, keeping any query
    /// parameters already present on the base URL.
    pub(super) fn action_url(&self, action: &str, params: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("action", action);
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        url
    }

    /// GETs `url` and parses the body as JSON, with retry on transient errors.
    pub(super) async fn get_json(&self, url: &Url, context: &str) -> Result<Value, ClientError> {
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            let context = context.to_owned();
            async move {
                let response = self
                    .client
                    .get(url.clone())
                    .header(reqwest::header::ACCEPT, "application/json")
                    .header(reqwest::header::CACHE_CONTROL, "no-cache")
                    .send()
                    .await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    return Err(ClientError::RateLimited { retry_after_secs });
                }

                let body = response.text().await?;

                if !status.is_success() {
                    return Err(error_from_status(status.as_u16(), &body, url.as_str()));
                }
                if body.trim().is_empty() {
                    return Err(ClientError::EmptyBody {
                        url: url.to_string(),
                    });
                }

                serde_json::from_str::<Value>(&body)
                    .map_err(|source| ClientError::Deserialize { context, source })
            }
        })
        .await
    }
}

fn parse_base_url(base_url: &str) -> Result<Url, ClientError> {
    let url = Url::parse(base_url.trim()).map_err(|e| ClientError::InvalidBaseUrl {
        base_url: base_url.to_owned(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ClientError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: format!("unsupported scheme \"{}\"", url.scheme()),
        });
    }
    Ok(url)
}

/// `{}`, `[]` and `null` all mean "no such record".
pub(super) fn is_empty_payload(body: &Value) -> bool {
    match body {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Message from an `{"error": …, "detail": …}` envelope, preferring `detail`.
pub(super) fn api_error_detail(body: &Value) -> Option<String> {
    let obj = body.as_object()?;
    let error = obj.get("error")?;
    let detail = obj
        .get("detail")
        .and_then(Value::as_str)
        .or_else(|| error.as_str())
        .map_or_else(|| error.to_string(), str::to_owned);
    Some(detail)
}

/// Maps a non-2xx response to an error, surfacing the envelope's message or
/// the raw body when there is one.
pub(super) fn error_from_status(status: u16, body: &str, url: &str) -> ClientError {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .as_ref()
        .and_then(api_error_detail)
        .or_else(|| {
            let raw = body.trim();
            (!raw.is_empty()).then(|| raw.chars().take(MAX_DETAIL_CHARS).collect())
        });
    match detail {
        Some(detail) => ClientError::Api { status, detail },
        None => ClientError::UnexpectedStatus {
            status,
            url: url.to_owned(),
        },
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
