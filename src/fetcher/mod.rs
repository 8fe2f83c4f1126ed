//! Page fetching for the SkillBridge listing API

use crate::PageResponse;
use async_trait::async_trait;

pub mod http;
pub mod pagination;
pub mod request;
pub mod retry;
pub mod retry_formatter;

pub use pagination::{FetchReport, PageFailure, PageFetcher};
pub use request::PageRequest;

/// Fetcher errors
#[derive(Debug, thiserror::Error)]
pub enum FetcherError {
    /// Transport failure (connection refused, reset, DNS, ...)
    #[error("network error: {0}")]
    NetworkError(String),

    /// Could not connect to the server
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The call exceeded its timeout
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Server answered with a non-success status
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// Status code
        status: u16,
        /// Response body, possibly truncated
        body: String,
    },

    /// Body was not a valid listing response
    #[error("parse error: {0}")]
    ParseError(String),

    /// Configuration cannot be used for fetching
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for fetcher operations
pub type FetcherResult<T> = Result<T, FetcherError>;

/// Transport for single page requests
///
/// Implementations perform exactly one attempt per call; retry and throttling
/// belong to [`PageFetcher`].
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch one page
    ///
    /// # Errors
    /// Any transport failure, non-success status or malformed body.
    async fn fetch_page(&self, request: &PageRequest) -> FetcherResult<PageResponse>;

    /// Endpoint used in log messages
    fn endpoint(&self) -> &str;
}

#[async_trait]
impl<S: PageSource + ?Sized> PageSource for std::sync::Arc<S> {
    async fn fetch_page(&self, request: &PageRequest) -> FetcherResult<PageResponse> {
        (**self).fetch_page(request).await
    }

    fn endpoint(&self) -> &str {
        (**self).endpoint()
    }
}
