//! # SkillBridge Extractor Library
//!
//! Retrieves the complete result set of the SkillBridge listing API for one
//! job family and saves it as a formatted spreadsheet.
//!
//! ## Features
//!
//! - **Discovery + Paging**: Learns the total record count from the first response and
//!   walks every page sequentially
//! - **Bounded Retry**: Each page is retried under an injectable [`fetcher::retry::RetryPolicy`]
//! - **Structured Failures**: Pages that exhaust their retry budget are reported in
//!   [`fetcher::pagination::FetchReport`] instead of aborting the run
//! - **Self-Throttling**: Fixed delay between page requests
//! - **Export**: XLSX (styled header, frozen panes) or CSV output
//!
//! ## Quick Start
//!
//! ```no_run
//! use skillbridge_extractor::{Category, FetchConfig};
//! use skillbridge_extractor::fetcher::{http::LookupHttpClient, pagination::PageFetcher};
//! use skillbridge_extractor::output::{sink::ResultSink, xlsx::XlsxExporter};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = FetchConfig::default();
//! let client = LookupHttpClient::new(config.base_url.clone(), config.request_timeout)?;
//! let fetcher = PageFetcher::new(client, config);
//!
//! let category = Category::parse("Healthcare")?;
//! let report = fetcher.fetch(&category).await?;
//!
//! let sink = ResultSink::new(XlsxExporter::new("./output"));
//! let delivered = sink.deliver(&report.records, &category)?;
//! println!("{} records -> {:?}", delivered.records, delivered.output);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`category`] - Validated job family label
//! - [`config`] - Explicit fetch configuration
//! - [`fetcher`] - Page requests, HTTP transport, retry policy, paging loop
//! - [`output`] - Destination naming, exporters and the result sink
//! - [`metrics`] - Request and retry metrics
//! - [`cli`] - Command line and HTTP front doors

#![warn(missing_docs)]
#![warn(clippy::all)]

use serde::{Deserialize, Deserializer, Serialize};

/// Job family label parsing and validation
pub mod category;

/// CLI command implementations
pub mod cli;

/// Fetch configuration
pub mod config;

/// Page fetching
pub mod fetcher;

/// Production observability metrics
pub mod metrics;

/// Record exporters and result sink
pub mod output;

// Re-export commonly used types
pub use category::Category;
pub use config::FetchConfig;

/// One listing row as returned by the API.
///
/// Records are untyped: each maps the requested column names to their values.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Body of a `Location/Lookup` response
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PageResponse {
    /// Total number of records the server holds for the query
    #[serde(rename = "recordsTotal", default, deserialize_with = "null_as_default")]
    pub records_total: u64,
    /// Records on this page, in server order
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<Record>,
}

/// Read an explicit `null` the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl PageResponse {
    /// Create a response from its parts
    pub fn new(records_total: u64, data: Vec<Record>) -> Self {
        Self {
            records_total,
            data,
        }
    }
}
