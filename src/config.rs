//! Fetch configuration
//!
//! All protocol and tuning values live in [`FetchConfig`], which is passed into
//! the fetcher at construction so tests can point it at a mock endpoint with
//! small pages and zero delays.

use std::time::Duration;

use crate::fetcher::{FetcherError, FetcherResult};

/// Default listing endpoint.
pub const DEFAULT_BASE_URL: &str = "https://sb-api.azurewebsites.us/Location/Lookup";

/// Records per page requested from the API.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Attempts per page (first try included).
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Per-call HTTP timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Constant wait between attempts on the same page.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(2);

/// Fixed throttle between pages.
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(300);

/// How the number of pages is derived from `recordsTotal`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageCountMode {
    /// `ceil(total / size)`, never less than the discovery page
    #[default]
    Exact,
    /// `floor(total / size) + 1`; issues one extra empty page on exact multiples
    Legacy,
}

impl PageCountMode {
    /// Number of pages to walk for `records_total` records
    ///
    /// A zero `page_size` yields a single page; [`FetchConfig::validate`]
    /// rejects that configuration before any fetch.
    pub fn total_pages(&self, records_total: u64, page_size: u64) -> u64 {
        if page_size == 0 {
            return 1;
        }
        match self {
            Self::Exact => records_total.div_ceil(page_size).max(1),
            Self::Legacy => records_total / page_size + 1,
        }
    }
}

/// Configuration for one [`PageFetcher`](crate::fetcher::pagination::PageFetcher)
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Listing endpoint URL
    pub base_url: String,
    /// Records requested per page (`length`)
    pub page_size: u64,
    /// Maximum attempts per page
    pub max_retries: u32,
    /// Timeout applied to every HTTP call
    pub request_timeout: Duration,
    /// Wait between attempts on the same page
    pub retry_backoff: Duration,
    /// Add random extra delay (up to 100%) to each backoff
    pub retry_jitter: bool,
    /// Wait after each page that issued a request
    pub page_delay: Duration,
    /// Page count formula
    pub page_count_mode: PageCountMode,
    /// Serve page 0 from the discovery response instead of requesting it again
    pub reuse_discovery_page: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            max_retries: DEFAULT_MAX_RETRIES,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            retry_jitter: false,
            page_delay: DEFAULT_PAGE_DELAY,
            page_count_mode: PageCountMode::Exact,
            reuse_discovery_page: true,
        }
    }
}

impl FetchConfig {
    /// Settings that reproduce the legacy extractor's request pattern:
    /// the `floor + 1` page count and a second request for page 0.
    pub fn legacy() -> Self {
        Self {
            page_count_mode: PageCountMode::Legacy,
            reuse_discovery_page: false,
            ..Self::default()
        }
    }

    /// Set endpoint URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set page size
    pub fn with_page_size(mut self, page_size: u64) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set maximum attempts per page
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set per-call timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set retry backoff and jitter
    pub fn with_retry_backoff(mut self, backoff: Duration, jitter: bool) -> Self {
        self.retry_backoff = backoff;
        self.retry_jitter = jitter;
        self
    }

    /// Set inter-page delay
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    /// Set page count formula
    pub fn with_page_count_mode(mut self, mode: PageCountMode) -> Self {
        self.page_count_mode = mode;
        self
    }

    /// Enable or disable discovery page reuse
    pub fn with_reuse_discovery_page(mut self, reuse: bool) -> Self {
        self.reuse_discovery_page = reuse;
        self
    }

    /// Reject values the paging loop cannot work with
    pub fn validate(&self) -> FetcherResult<()> {
        if self.page_size == 0 {
            return Err(FetcherError::InvalidConfig(
                "page size must be at least 1".to_string(),
            ));
        }
        if self.max_retries == 0 {
            return Err(FetcherError::InvalidConfig(
                "max retries must be at least 1".to_string(),
            ));
        }
        if self.base_url.trim().is_empty() {
            return Err(FetcherError::InvalidConfig(
                "base URL cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
