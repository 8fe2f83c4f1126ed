//! Discovery-then-page loop for category extraction
//!
//! [`PageFetcher::fetch`] learns `recordsTotal` from one unretried discovery
//! request, then walks every page in order:
//! - Each page is driven through [`RetryState`] under the configured [`RetryPolicy`]
//! - A page that exhausts its attempts is recorded in [`FetchReport::failed_pages`]
//!   and the walk continues
//! - A fixed delay follows every page that issued a request
//!
//! Only a failed discovery request aborts the extraction, since the page count
//! is unknown without it.

use indicatif::ProgressBar;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::FetchConfig;
use crate::fetcher::retry::{FixedBackoff, RetryPolicy, RetryState};
use crate::fetcher::retry_formatter::{RetryContext, RetryErrorType};
use crate::fetcher::{FetcherResult, PageRequest, PageSource};
use crate::metrics::{record_page_failed, record_retry_backoff, ExtractionMetrics};
use crate::{Category, Record};

/// A page given up after its retry budget ran out
#[derive(Debug, Clone, PartialEq)]
pub struct PageFailure {
    /// 0-based page index
    pub page_index: u64,
    /// Record offset of the page
    pub start: u64,
    /// Attempts made
    pub attempts: u32,
    /// Last error message
    pub error: String,
    /// Classification of the last error
    pub error_type: RetryErrorType,
}

/// Result of one category extraction
#[derive(Debug, Clone)]
pub struct FetchReport {
    /// Category extracted
    pub category: Category,
    /// `recordsTotal` announced by the discovery response
    pub records_total: u64,
    /// Pages walked
    pub total_pages: u64,
    /// Records from every successful page, in page then server order
    pub records: Vec<Record>,
    /// Pages that exhausted their retry budget, in page order
    pub failed_pages: Vec<PageFailure>,
    /// HTTP requests issued, discovery included
    pub requests_issued: u64,
    /// Retry attempts made across all pages
    pub retries: u64,
}

impl FetchReport {
    /// Whether every page was retrieved
    pub fn is_complete(&self) -> bool {
        self.failed_pages.is_empty()
    }

    /// Indices of failed pages
    pub fn failed_page_indices(&self) -> Vec<u64> {
        self.failed_pages.iter().map(|f| f.page_index).collect()
    }

    /// Number of records retrieved
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no records were retrieved
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Take ownership of the records
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

enum PageOutcome {
    Succeeded(Vec<Record>),
    Exhausted(PageFailure),
}

/// Sequential page fetcher over a [`PageSource`]
pub struct PageFetcher<S> {
    source: S,
    config: FetchConfig,
    retry_policy: Arc<dyn RetryPolicy>,
    progress: Option<ProgressBar>,
}

impl<S: PageSource> PageFetcher<S> {
    /// Create a fetcher using [`FixedBackoff`] built from `config`
    pub fn new(source: S, config: FetchConfig) -> Self {
        let retry_policy = Arc::new(FixedBackoff::from_config(&config));
        Self {
            source,
            config,
            retry_policy,
            progress: None,
        }
    }

    /// Replace the retry policy
    pub fn with_retry_policy(mut self, policy: Arc<dyn RetryPolicy>) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Report page progress on `bar`; its length is set once the page count is known
    pub fn with_progress_bar(mut self, bar: ProgressBar) -> Self {
        self.progress = Some(bar);
        self
    }

    /// Active configuration
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Retrieve every page for `category`
    ///
    /// # Errors
    /// Returns the discovery request's error, or [`FetcherError::InvalidConfig`]
    /// for an unusable configuration. Per-page failures never surface here;
    /// they are reported in [`FetchReport::failed_pages`].
    ///
    /// [`FetcherError::InvalidConfig`]: crate::fetcher::FetcherError::InvalidConfig
    pub async fn fetch(&self, category: &Category) -> FetcherResult<FetchReport> {
        self.config.validate()?;

        let metrics = ExtractionMetrics::start(category.as_str());
        let page_size = self.config.page_size;

        info!("Extracting SkillBridge data for: {}", category);

        let discovery_request = PageRequest::new(category.clone(), 0, page_size);
        let discovery = match self.source.fetch_page(&discovery_request).await {
            Ok(response) => response,
            Err(e) => {
                error!("Discovery request failed for {}: {}", category, e);
                metrics.record_failure(&e.to_string());
                return Err(e);
            }
        };

        let records_total = discovery.records_total;
        let total_pages = self
            .config
            .page_count_mode
            .total_pages(records_total, page_size);

        info!(
            records_total = records_total,
            total_pages = total_pages,
            "Total records: {} -> {} pages",
            records_total,
            total_pages
        );

        let mut report = FetchReport {
            category: category.clone(),
            records_total,
            total_pages,
            records: Vec::new(),
            failed_pages: Vec::new(),
            requests_issued: 1,
            retries: 0,
        };

        let mut cached_first_page = self.config.reuse_discovery_page.then_some(discovery.data);

        if let Some(bar) = &self.progress {
            bar.set_length(total_pages);
            bar.set_position(0);
        }

        for page_index in 0..total_pages {
            if page_index == 0 {
                if let Some(data) = cached_first_page.take() {
                    debug!("Page 1 served from discovery response ({} records)", data.len());
                    report.records.extend(data);
                    self.advance_progress();
                    continue;
                }
            }

            let request = PageRequest::new(category.clone(), page_index, page_size);
            match self.fetch_with_retry(&request, &mut report).await {
                PageOutcome::Succeeded(data) => {
                    debug!("Received {} records in page {}", data.len(), page_index + 1);
                    report.records.extend(data);
                }
                PageOutcome::Exhausted(failure) => {
                    record_page_failed(page_index);
                    report.failed_pages.push(failure);
                }
            }

            self.advance_progress();
            throttle(self.config.page_delay).await;
        }

        if let Some(bar) = &self.progress {
            bar.finish();
        }

        if report.is_complete() {
            info!(
                "Extraction complete: {} records across {} pages",
                report.len(),
                total_pages
            );
        } else {
            warn!(
                "Extraction incomplete: {} records, {} of {} pages failed ({:?})",
                report.len(),
                report.failed_pages.len(),
                total_pages,
                report.failed_page_indices()
            );
        }
        metrics.record_success(report.len() as u64, report.failed_pages.len() as u64);

        Ok(report)
    }

    async fn fetch_with_retry(&self, request: &PageRequest, report: &mut FetchReport) -> PageOutcome {
        let max_attempts = self.retry_policy.max_attempts().max(1);
        let mut state = RetryState::start();
        let mut records = Vec::new();
        let mut last_failure = None;
        let mut last_error_type = RetryErrorType::NetworkGeneric;

        while let RetryState::Attempting(attempt) = state {
            report.requests_issued += 1;

            match self.source.fetch_page(request).await {
                Ok(page) => {
                    if attempt > 1 {
                        let ctx = self.retry_context(request, attempt, max_attempts, last_error_type, Duration::ZERO, "");
                        info!("{}", ctx.format_success());
                    }
                    // Only the successful attempt contributes records
                    records = page.data;
                    state = RetryState::Succeeded;
                }
                Err(e) => {
                    last_error_type = RetryErrorType::from_fetcher_error(&e);
                    state = RetryState::after_failure(attempt, max_attempts);

                    let backoff = match state {
                        RetryState::Attempting(_) => self.retry_policy.backoff(attempt),
                        _ => Duration::ZERO,
                    };
                    let message = e.to_string();
                    let ctx = self.retry_context(request, attempt, max_attempts, last_error_type, backoff, &message);

                    if state == RetryState::Exhausted {
                        error!("{}", ctx.format_failure());
                    } else {
                        warn!("{}", ctx.format_retry());
                        record_retry_backoff(backoff, attempt);
                        report.retries += 1;
                        throttle(backoff).await;
                    }

                    last_failure = Some(PageFailure {
                        page_index: request.page_index(),
                        start: request.start(),
                        attempts: attempt,
                        error: message,
                        error_type: last_error_type,
                    });
                }
            }
        }

        match (state, last_failure) {
            (RetryState::Exhausted, Some(failure)) => PageOutcome::Exhausted(failure),
            _ => PageOutcome::Succeeded(records),
        }
    }

    fn retry_context(
        &self,
        request: &PageRequest,
        attempt: u32,
        max_attempts: u32,
        error_type: RetryErrorType,
        backoff: Duration,
        message: &str,
    ) -> RetryContext {
        RetryContext::new(
            attempt,
            max_attempts,
            error_type,
            backoff,
            request.category().as_str(),
            request.page_index(),
            message,
            self.source.endpoint(),
        )
    }

    fn advance_progress(&self) {
        if let Some(bar) = &self.progress {
            bar.inc(1);
        }
    }
}

async fn throttle(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
