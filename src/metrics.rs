//! Production observability metrics for the extractor
//!
//! ## Architecture
//!
//! - Uses `metrics` crate for low-overhead metric collection
//! - Optional Prometheus exporter for a scraping endpoint (`--metrics-addr`)
//! - Every recording call is a no-op until [`init_metrics`] installs a recorder

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;
use once_cell::sync::Lazy;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Global metrics registry initialization flag
static METRICS_INITIALIZED: Lazy<Arc<RwLock<bool>>> = Lazy::new(|| Arc::new(RwLock::new(false)));

/// Correlation ID generator for request tracing
static CORRELATION_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Initialize metrics system with Prometheus exporter
///
/// Idempotent: later calls are ignored once a recorder is installed.
///
/// # Arguments
/// * `addr` - Socket address to bind the scrape endpoint (e.g., "0.0.0.0:9090")
pub async fn init_metrics(addr: SocketAddr) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut initialized = METRICS_INITIALIZED.write().await;
    if *initialized {
        debug!("Metrics already initialized, skipping");
        return Ok(());
    }

    info!("Initializing metrics system on {}", addr);

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {e}"))?;

    describe_counter!(
        "page_requests_total",
        Unit::Count,
        "Total number of HTTP requests made to the listing API"
    );

    describe_histogram!(
        "page_request_duration_seconds",
        Unit::Seconds,
        "Listing API request duration in seconds"
    );

    describe_counter!(
        "page_retries_total",
        Unit::Count,
        "Total number of page retry attempts"
    );

    describe_histogram!(
        "retry_backoff_duration_seconds",
        Unit::Seconds,
        "Duration of retry backoff in seconds"
    );

    describe_counter!(
        "pages_failed_total",
        Unit::Count,
        "Pages given up after exhausting their retry budget"
    );

    describe_counter!(
        "extractions_completed_total",
        Unit::Count,
        "Extractions that finished their page walk"
    );

    describe_counter!(
        "extractions_failed_total",
        Unit::Count,
        "Extractions aborted by a failed discovery request"
    );

    *initialized = true;
    info!("Metrics system initialized successfully on {}", addr);
    Ok(())
}

/// Generate a new correlation ID for request tracing
pub fn generate_correlation_id() -> String {
    let id = CORRELATION_COUNTER.fetch_add(1, Ordering::Relaxed) + 1;
    format!("req-{id:08x}")
}

/// Record a listing API request with timing
pub struct PageRequestMetrics {
    endpoint: String,
    page_index: u64,
    start_time: Instant,
    correlation_id: String,
}

impl PageRequestMetrics {
    /// Start recording a new request
    pub fn start(endpoint: impl Into<String>, page_index: u64) -> Self {
        Self {
            endpoint: endpoint.into(),
            page_index,
            start_time: Instant::now(),
            correlation_id: generate_correlation_id(),
        }
    }

    /// Record completion with an HTTP status
    pub fn record_complete(&self, status_code: u16) {
        let duration = self.start_time.elapsed();

        counter!(
            "page_requests_total",
            "status" => status_code.to_string(),
        )
        .increment(1);

        histogram!("page_request_duration_seconds").record(duration.as_secs_f64());

        if status_code == 429 {
            warn!(
                correlation_id = %self.correlation_id,
                endpoint = %self.endpoint,
                page = self.page_index,
                "Rate limit error (429) recorded"
            );
        }

        debug!(
            correlation_id = %self.correlation_id,
            page = self.page_index,
            status = status_code,
            duration_ms = duration.as_millis(),
            "Page request completed"
        );
    }

    /// Record a transport error (no status code)
    pub fn record_network_error(&self) {
        let duration = self.start_time.elapsed();

        counter!(
            "page_requests_total",
            "status" => "network_error",
        )
        .increment(1);

        histogram!("page_request_duration_seconds").record(duration.as_secs_f64());

        debug!(
            correlation_id = %self.correlation_id,
            endpoint = %self.endpoint,
            page = self.page_index,
            duration_ms = duration.as_millis(),
            "Network error recorded"
        );
    }

    /// Get the correlation ID for this request
    pub fn correlation_id(&self) -> &str {
        &self.correlation_id
    }
}

/// Record retry backoff duration
pub fn record_retry_backoff(duration: Duration, attempt: u32) {
    counter!(
        "page_retries_total",
        "attempt" => attempt.to_string(),
    )
    .increment(1);

    histogram!("retry_backoff_duration_seconds").record(duration.as_secs_f64());
}

/// Record a page given up after its last attempt
pub fn record_page_failed(page_index: u64) {
    counter!("pages_failed_total").increment(1);
    debug!(page = page_index, "Page failure recorded");
}

/// Extraction metrics for one category
pub struct ExtractionMetrics {
    category: String,
    start_time: Instant,
}

impl ExtractionMetrics {
    /// Start tracking an extraction
    pub fn start(category: impl Into<String>) -> Self {
        let category = category.into();
        debug!(category = %category, "Extraction started");
        Self {
            category,
            start_time: Instant::now(),
        }
    }

    /// Record a finished page walk
    pub fn record_success(&self, records: u64, failed_pages: u64) {
        let duration = self.start_time.elapsed();

        counter!("extractions_completed_total").increment(1);

        debug!(
            category = %self.category,
            records = records,
            failed_pages = failed_pages,
            duration_secs = duration.as_secs(),
            "Extraction finished"
        );
    }

    /// Record an aborted extraction
    pub fn record_failure(&self, error: &str) {
        let duration = self.start_time.elapsed();

        counter!("extractions_failed_total").increment(1);

        debug!(
            category = %self.category,
            error = %error,
            duration_secs = duration.as_secs(),
            "Extraction failed"
        );
    }
}
