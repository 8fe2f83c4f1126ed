//! Unit tests for the discovery-then-page loop

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use skillbridge_extractor::config::{FetchConfig, PageCountMode};
use skillbridge_extractor::fetcher::retry::FixedBackoff;
use skillbridge_extractor::fetcher::retry_formatter::RetryErrorType;
use skillbridge_extractor::fetcher::{FetcherError, FetcherResult, PageFetcher, PageRequest, PageSource};
use skillbridge_extractor::{Category, PageResponse, Record};

/// Helper struct to track fetch calls
#[derive(Clone, Default)]
struct FetchTracker {
    starts: Arc<Mutex<Vec<u64>>>,
}

impl FetchTracker {
    fn get_count(&self) -> usize {
        self.starts.lock().unwrap().len()
    }

    fn starts(&self) -> Vec<u64> {
        self.starts.lock().unwrap().clone()
    }

    fn record(&self, start: u64) {
        self.starts.lock().unwrap().push(start);
    }
}

/// Serves pages of a fixed-size result set; selected page indices fail a
/// scripted number of times before answering
struct ScriptedSource {
    records_total: u64,
    tracker: FetchTracker,
    failures_left: Mutex<HashMap<u64, u32>>,
}

impl ScriptedSource {
    fn new(records_total: u64, tracker: FetchTracker) -> Self {
        Self {
            records_total,
            tracker,
            failures_left: Mutex::new(HashMap::new()),
        }
    }

    /// Page `page_index` fails its next `times` loop requests (discovery excluded)
    fn failing(self, page_index: u64, times: u32) -> Self {
        self.failures_left.lock().unwrap().insert(page_index, times);
        self
    }
}

fn listing(n: u64) -> Record {
    json!({ "Organization": format!("Org {n}"), "City": "Austin" })
        .as_object()
        .cloned()
        .unwrap()
}

#[async_trait]
impl PageSource for ScriptedSource {
    async fn fetch_page(&self, request: &PageRequest) -> FetcherResult<PageResponse> {
        let is_discovery = self.tracker.get_count() == 0;
        self.tracker.record(request.start());

        if !is_discovery {
            let mut failures = self.failures_left.lock().unwrap();
            if let Some(left) = failures.get_mut(&request.page_index()) {
                if *left > 0 {
                    *left -= 1;
                    return Err(FetcherError::HttpStatus {
                        status: 503,
                        body: "busy".to_string(),
                    });
                }
            }
        }

        let end = (request.start() + request.page_size()).min(self.records_total);
        let data = (request.start()..end).map(listing).collect();
        Ok(PageResponse::new(self.records_total, data))
    }

    fn endpoint(&self) -> &str {
        "scripted"
    }
}

fn quiet_config() -> FetchConfig {
    FetchConfig::default()
        .with_page_delay(Duration::ZERO)
        .with_retry_backoff(Duration::ZERO, false)
}

fn organizations(records: &[Record]) -> Vec<String> {
    records
        .iter()
        .map(|r| r["Organization"].as_str().unwrap().to_string())
        .collect()
}

fn healthcare() -> Category {
    Category::parse("Healthcare").unwrap()
}

#[tokio::test]
async fn test_records_in_ascending_page_order() {
    let tracker = FetchTracker::default();
    let fetcher = PageFetcher::new(ScriptedSource::new(25, tracker.clone()), quiet_config());

    let report = fetcher.fetch(&healthcare()).await.unwrap();

    assert_eq!(report.total_pages, 3);
    assert_eq!(report.len(), 25);
    let expected: Vec<String> = (0..25).map(|n| format!("Org {n}")).collect();
    assert_eq!(organizations(&report.records), expected);
    // Discovery doubles as page 1
    assert_eq!(tracker.starts(), vec![0, 10, 20]);
    assert_eq!(report.requests_issued, 3);
}

#[tokio::test]
async fn test_retry_succeeds_on_third_attempt() {
    let tracker = FetchTracker::default();
    let source = ScriptedSource::new(25, tracker.clone()).failing(1, 2);
    let fetcher = PageFetcher::new(source, quiet_config());

    let report = fetcher.fetch(&healthcare()).await.unwrap();

    assert!(report.is_complete());
    assert_eq!(report.len(), 25);
    assert_eq!(report.retries, 2);
    // Page 2 is requested three times, records land once
    assert_eq!(tracker.starts(), vec![0, 10, 10, 10, 20]);
    let expected: Vec<String> = (0..25).map(|n| format!("Org {n}")).collect();
    assert_eq!(organizations(&report.records), expected);
}

#[tokio::test]
async fn test_exhausted_page_reported_and_walk_continues() {
    let tracker = FetchTracker::default();
    let source = ScriptedSource::new(25, tracker.clone()).failing(1, 10);
    let fetcher = PageFetcher::new(source, quiet_config());

    let report = fetcher.fetch(&healthcare()).await.unwrap();

    assert!(!report.is_complete());
    assert_eq!(report.failed_page_indices(), vec![1]);
    assert_eq!(report.len(), 15);

    let failure = &report.failed_pages[0];
    assert_eq!(failure.start, 10);
    assert_eq!(failure.attempts, 3);
    assert_eq!(failure.error_type, RetryErrorType::ServerError(503));
    assert!(failure.error.contains("503"));

    let names = organizations(&report.records);
    assert_eq!(names.first().unwrap(), "Org 0");
    assert_eq!(names[10], "Org 20");
    // Discovery, three attempts on page 2, one on page 3
    assert_eq!(tracker.get_count(), 5);
}

#[tokio::test]
async fn test_custom_retry_policy_limits_attempts() {
    let tracker = FetchTracker::default();
    let source = ScriptedSource::new(20, tracker.clone()).failing(1, 10);
    let fetcher = PageFetcher::new(source, quiet_config())
        .with_retry_policy(Arc::new(FixedBackoff::new(1, Duration::ZERO)));

    let report = fetcher.fetch(&healthcare()).await.unwrap();

    assert_eq!(report.failed_pages[0].attempts, 1);
    assert_eq!(report.retries, 0);
    assert_eq!(tracker.get_count(), 2);
}

#[tokio::test]
async fn test_zero_records_single_request() {
    for mode in [PageCountMode::Exact, PageCountMode::Legacy] {
        let tracker = FetchTracker::default();
        let config = quiet_config().with_page_count_mode(mode);
        let fetcher = PageFetcher::new(ScriptedSource::new(0, tracker.clone()), config);

        let report = fetcher.fetch(&healthcare()).await.unwrap();

        assert_eq!(report.total_pages, 1);
        assert!(report.is_empty());
        assert_eq!(tracker.get_count(), 1);
    }
}

#[tokio::test]
async fn test_exact_multiple_page_counts() {
    let tracker = FetchTracker::default();
    let fetcher = PageFetcher::new(ScriptedSource::new(20, tracker.clone()), quiet_config());
    let report = fetcher.fetch(&healthcare()).await.unwrap();
    assert_eq!(report.total_pages, 2);
    assert_eq!(report.len(), 20);

    let tracker = FetchTracker::default();
    let legacy = quiet_config().with_page_count_mode(PageCountMode::Legacy);
    let fetcher = PageFetcher::new(ScriptedSource::new(20, tracker.clone()), legacy);
    let report = fetcher.fetch(&healthcare()).await.unwrap();
    // Trailing page past the end comes back empty
    assert_eq!(report.total_pages, 3);
    assert_eq!(report.len(), 20);
    assert_eq!(tracker.starts(), vec![0, 10, 20]);
}

#[tokio::test]
async fn test_legacy_refetches_first_page_once() {
    let tracker = FetchTracker::default();
    let config = FetchConfig::legacy()
        .with_page_delay(Duration::ZERO)
        .with_retry_backoff(Duration::ZERO, false);
    let fetcher = PageFetcher::new(ScriptedSource::new(5, tracker.clone()), config);

    let report = fetcher.fetch(&healthcare()).await.unwrap();

    assert_eq!(report.total_pages, 1);
    assert_eq!(report.len(), 5);
    assert_eq!(tracker.starts(), vec![0, 0]);
    assert_eq!(report.requests_issued, 2);
}

#[tokio::test]
async fn test_discovery_failure_stops_extraction() {
    struct Unreachable(FetchTracker);

    #[async_trait]
    impl PageSource for Unreachable {
        async fn fetch_page(&self, request: &PageRequest) -> FetcherResult<PageResponse> {
            self.0.record(request.start());
            Err(FetcherError::ConnectionFailed("refused".to_string()))
        }

        fn endpoint(&self) -> &str {
            "unreachable"
        }
    }

    let tracker = FetchTracker::default();
    let fetcher = PageFetcher::new(Unreachable(tracker.clone()), quiet_config());

    let result = fetcher.fetch(&healthcare()).await;

    assert!(matches!(result, Err(FetcherError::ConnectionFailed(_))));
    // Discovery is never retried
    assert_eq!(tracker.get_count(), 1);
}

#[tokio::test]
async fn test_exact_mode_without_discovery_reuse() {
    let tracker = FetchTracker::default();
    let config = quiet_config().with_reuse_discovery_page(false);
    let fetcher = PageFetcher::new(ScriptedSource::new(15, tracker.clone()), config);

    let report = fetcher.fetch(&healthcare()).await.unwrap();

    assert_eq!(report.total_pages, 2);
    assert_eq!(report.len(), 15);
    assert_eq!(tracker.starts(), vec![0, 0, 10]);
    let expected: Vec<String> = (0..15).map(|n| format!("Org {n}")).collect();
    assert_eq!(organizations(&report.records), expected);
}

#[tokio::test(start_paused = true)]
async fn test_page_delay_and_backoff_are_slept() {
    let tracker = FetchTracker::default();
    let source = ScriptedSource::new(25, tracker.clone()).failing(1, 1);
    // Defaults: 300 ms after each requested page, 2 s before a retry
    let fetcher = PageFetcher::new(source, FetchConfig::default());

    let started = tokio::time::Instant::now();
    let report = fetcher.fetch(&healthcare()).await.unwrap();
    let elapsed = started.elapsed();

    assert!(report.is_complete());
    assert_eq!(report.retries, 1);
    // Page 1 comes from discovery and is not throttled
    assert!(elapsed >= Duration::from_millis(2600), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_millis(2700), "elapsed {elapsed:?}");
}
