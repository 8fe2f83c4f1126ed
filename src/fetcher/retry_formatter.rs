//! Retry message formatting for page requests.
//!
//! Classifies page faults and renders the retry, recovery and failure log
//! lines emitted by the paging loop, so every message carries the same
//! attempt counter and category/page context.

use reqwest::{Error as ReqwestError, StatusCode};
use std::time::Duration;

use super::FetcherError;

/// Classification of page faults for user messaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryErrorType {
    /// Call exceeded its timeout
    NetworkTimeout,
    /// Connection refused, DNS failure, or other offline scenarios
    NetworkOffline,
    /// HTTP 429 rate limit exceeded
    RateLimit,
    /// HTTP 5xx server error
    ServerError(u16),
    /// HTTP 4xx other than 429
    ClientError(u16),
    /// Body was not a listing response
    MalformedResponse,
    /// Generic fallback when no better classification fits
    NetworkGeneric,
}

impl RetryErrorType {
    /// User-friendly description string used inside retry log messages.
    pub fn description(&self) -> &'static str {
        match self {
            Self::NetworkTimeout => "network timeout",
            Self::NetworkOffline => "connection failed",
            Self::RateLimit => "rate limit exceeded",
            Self::ServerError(code) => match code {
                500 => "internal server error",
                502 => "bad gateway",
                503 => "service unavailable",
                504 => "gateway timeout",
                _ => "server error",
            },
            Self::ClientError(code) => match code {
                400 => "invalid request",
                401 | 403 => "access denied",
                404 => "resource not found",
                _ => "client error",
            },
            Self::MalformedResponse => "malformed response",
            Self::NetworkGeneric => "network error",
        }
    }

    /// Suggested remediation presented after a page is given up.
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::NetworkTimeout => "The listing service is slow; try a larger --timeout-secs",
            Self::NetworkOffline => "Verify internet connectivity and DNS resolution",
            Self::RateLimit => "Increase --page-delay-ms or --retry-backoff-ms",
            Self::ServerError(_) => "The listing service may be down, try again later",
            Self::ClientError(_) => "Check that --base-url points at the Location/Lookup endpoint",
            Self::MalformedResponse => {
                "The endpoint did not return listing JSON; check --base-url"
            }
            Self::NetworkGeneric => "Check network connectivity and try again",
        }
    }

    /// Classify an error produced by a [`PageSource`](super::PageSource).
    pub fn from_fetcher_error(err: &FetcherError) -> Self {
        match err {
            FetcherError::Timeout(_) => Self::NetworkTimeout,
            FetcherError::ConnectionFailed(_) => Self::NetworkOffline,
            FetcherError::HttpStatus { status, .. } => {
                StatusCode::from_u16(*status)
                    .map(|s| extract_error_type(Some(s), None))
                    .unwrap_or(Self::NetworkGeneric)
            }
            FetcherError::ParseError(_) => Self::MalformedResponse,
            FetcherError::NetworkError(_) | FetcherError::InvalidConfig(_) => {
                Self::NetworkGeneric
            }
        }
    }
}

/// Context for formatting retry messages.
#[derive(Debug, Clone)]
pub struct RetryContext {
    /// Attempt that just failed or succeeded (1-based)
    pub attempt: u32,
    /// Maximum number of attempts configured
    pub max_attempts: u32,
    /// Type of error that triggered retry
    pub error_type: RetryErrorType,
    /// Backoff duration until next attempt
    pub backoff_duration: Duration,
    /// Category being extracted
    pub category: String,
    /// 0-based page index
    pub page_index: u64,
    /// Original error message for details
    pub error_message: String,
    /// URL that failed
    pub endpoint: String,
}

impl RetryContext {
    /// Convenience constructor used throughout the retry logic.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        attempt: u32,
        max_attempts: u32,
        error_type: RetryErrorType,
        backoff_duration: Duration,
        category: impl Into<String>,
        page_index: u64,
        error_message: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            attempt,
            max_attempts,
            error_type,
            backoff_duration,
            category: category.into(),
            page_index,
            error_message: error_message.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Format standardized retry message with attempt counters and context.
    pub fn format_retry(&self) -> String {
        let mut message = format!(
            "Retrying (attempt {}/{}) after {} - waiting {:.1} seconds...",
            self.attempt,
            self.max_attempts,
            self.error_type.description(),
            self.backoff_duration.as_secs_f64()
        );

        append_page_context(&mut message, &self.category, self.page_index);
        message
    }

    /// Format retry success message when a previous attempt eventually works.
    pub fn format_success(&self) -> String {
        let mut message = format!(
            "Retry attempt {}/{} succeeded - resuming extraction",
            self.attempt, self.max_attempts
        );
        append_page_context(&mut message, &self.category, self.page_index);
        message
    }

    /// Format final failure summary with actionable suggestions.
    ///
    /// Page numbers in this summary are 1-based, as shown on the site.
    pub fn format_failure(&self) -> String {
        let mut lines = Vec::new();
        lines.push(format!(
            "[FAILED] Page {} failed after {} attempts",
            self.page_index + 1,
            self.max_attempts
        ));
        lines.push(format!("  Last error: {}", self.error_message));

        let category_display = if self.category.is_empty() {
            "unknown"
        } else {
            &self.category
        };
        lines.push(format!("  Job family: {category_display}"));
        lines.push(format!("  Endpoint: {}", self.endpoint));
        lines.push("  Suggestions:".to_string());

        for suggestion in self.format_suggestions() {
            lines.push(format!("    - {suggestion}"));
        }

        lines.join("\n")
    }

    /// Derive suggestions tailored to the current retry context.
    pub fn format_suggestions(&self) -> Vec<String> {
        vec![
            self.error_type.suggestion().to_string(),
            format!(
                "Try increasing --max-retries (current: {})",
                self.max_attempts
            ),
        ]
    }
}

/// Extract a [`RetryErrorType`] from an HTTP status or reqwest error.
pub fn extract_error_type(
    status: Option<StatusCode>,
    err: Option<&ReqwestError>,
) -> RetryErrorType {
    if let Some(status) = status {
        if status.as_u16() == 429 {
            return RetryErrorType::RateLimit;
        }

        if status.is_server_error() {
            return RetryErrorType::ServerError(status.as_u16());
        }

        if status.is_client_error() {
            return RetryErrorType::ClientError(status.as_u16());
        }
    }

    if let Some(err) = err {
        if err.is_timeout() {
            return RetryErrorType::NetworkTimeout;
        }

        if err.is_connect() {
            return RetryErrorType::NetworkOffline;
        }

        if err.is_decode() {
            return RetryErrorType::MalformedResponse;
        }
    }

    RetryErrorType::NetworkGeneric
}

fn append_page_context(buffer: &mut String, category: &str, page_index: u64) {
    buffer.push_str(" (");
    if !category.is_empty() {
        buffer.push_str(category);
        buffer.push(' ');
    }
    buffer.push_str(&format!("page {}", page_index + 1));
    buffer.push(')');
}
