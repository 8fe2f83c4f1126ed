//! HTTP transport for the `Location/Lookup` endpoint
//!
//! Provides the production [`PageSource`]:
//! - One GET per call with the fixed DataTables parameters
//! - Per-call timeout enforced by the reqwest client
//! - Status, transport and body errors mapped onto [`FetcherError`]
//! - Request metrics for every attempt
//!
//! No retry here; the paging loop owns it.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::fetcher::retry_formatter::{extract_error_type, RetryErrorType};
use crate::fetcher::{FetcherError, FetcherResult, PageRequest, PageSource};
use crate::metrics::PageRequestMetrics;
use crate::PageResponse;

/// Longest response body excerpt kept in an error
const MAX_ERROR_BODY_CHARS: usize = 200;

/// reqwest-backed client for the listing endpoint
#[derive(Debug, Clone)]
pub struct LookupHttpClient {
    client: Client,
    base_url: String,
}

impl LookupHttpClient {
    /// Create a client whose every call is bounded by `timeout`
    ///
    /// # Errors
    /// Returns [`FetcherError::InvalidConfig`] if the TLS backend cannot be initialised.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> FetcherResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetcherError::InvalidConfig(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(client, base_url))
    }

    /// Wrap an existing client (shared connection pool)
    ///
    /// The caller is responsible for configuring its timeout.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Endpoint URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl PageSource for LookupHttpClient {
    async fn fetch_page(&self, request: &PageRequest) -> FetcherResult<PageResponse> {
        let params = request.query_params();
        let metrics = PageRequestMetrics::start(&self.base_url, request.page_index());

        debug!(
            correlation_id = %metrics.correlation_id(),
            page = request.page_index(),
            start = request.start(),
            "GET {}",
            self.base_url
        );

        let response = match self.client.get(&self.base_url).query(&params).send().await {
            Ok(resp) => resp,
            Err(e) => {
                metrics.record_network_error();
                return Err(transport_error(e));
            }
        };

        let status = response.status();
        metrics.record_complete(status.as_u16());

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetcherError::HttpStatus {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let body = response.text().await.map_err(transport_error)?;
        serde_json::from_str::<PageResponse>(&body)
            .map_err(|e| FetcherError::ParseError(format!("Failed to deserialize response: {e}")))
    }

    fn endpoint(&self) -> &str {
        &self.base_url
    }
}

fn transport_error(err: reqwest::Error) -> FetcherError {
    match extract_error_type(None, Some(&err)) {
        RetryErrorType::NetworkTimeout => FetcherError::Timeout(err.to_string()),
        RetryErrorType::NetworkOffline => FetcherError::ConnectionFailed(err.to_string()),
        _ => FetcherError::NetworkError(err.to_string()),
    }
}
