//! Extract command implementation

use crate::config::{FetchConfig, PageCountMode, DEFAULT_BASE_URL};
use crate::fetcher::http::LookupHttpClient;
use crate::fetcher::pagination::PageFetcher;
use crate::fetcher::PageSource;
use crate::output::{ExportFormat, OutputError, ResultSink};
use crate::Category;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io::{BufRead, Write};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{error, info};

use super::CliError;

/// Prompt shown when no category is given on the command line
pub const CATEGORY_PROMPT: &str = "Enter Job Family exactly as shown on the SkillBridge site: ";

/// SkillBridge Extractor CLI
#[derive(Parser, Debug)]
#[command(name = "skillbridge-extractor")]
#[command(about = "Extract SkillBridge listings for a job family into a spreadsheet", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Listing endpoint URL
    #[arg(long, global = true, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Records requested per page
    #[arg(long, global = true, default_value = "10", value_parser = clap::value_parser!(u64).range(1..))]
    pub page_size: u64,

    /// Attempts per page before it is given up (range: 1-20)
    #[arg(long, global = true, default_value = "3", value_parser = clap::value_parser!(u32).range(1..=20))]
    pub max_retries: u32,

    /// Per-request timeout in seconds
    #[arg(long, global = true, default_value = "30", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: u64,

    /// Wait between attempts on the same page, in milliseconds
    #[arg(long, global = true, default_value = "2000")]
    pub retry_backoff_ms: u64,

    /// Add random jitter to the retry wait
    #[arg(long, global = true, default_value_t = false)]
    pub jitter: bool,

    /// Wait after each page request, in milliseconds
    #[arg(long, global = true, default_value = "300")]
    pub page_delay_ms: u64,

    /// Reproduce the legacy request pattern (floor+1 page count, page 1 requested twice)
    #[arg(long, global = true, default_value_t = false)]
    pub legacy_paging: bool,

    /// Directory receiving exported files
    #[arg(long, global = true, default_value = "output")]
    pub output_dir: PathBuf,

    /// Export file format (xlsx or csv)
    #[arg(long, global = true, default_value = "xlsx")]
    pub format: ExportFormat,

    /// Result summary format (json or human)
    #[arg(long, global = true, default_value = "human")]
    pub output_format: OutputFormat,

    /// Serve Prometheus metrics on this address
    #[arg(long, global = true)]
    pub metrics_addr: Option<SocketAddr>,

    /// Hide the page progress bar
    #[arg(long, global = true, default_value_t = false)]
    pub no_progress: bool,
}

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract one job family and export it
    Extract(ExtractArgs),

    /// Serve the extractor over HTTP
    Serve(super::ServeArgs),
}

/// Extract command arguments
#[derive(Parser, Debug)]
pub struct ExtractArgs {
    /// Job family exactly as shown on the SkillBridge site (prompted if omitted)
    #[arg(long)]
    pub category: Option<String>,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Human-readable output
    Human,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "human" => Ok(OutputFormat::Human),
            _ => Err(format!("Invalid output format: {s}")),
        }
    }
}

/// Settings shared by every command, resolved from global flags
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Fetcher configuration
    pub fetch: FetchConfig,
    /// Directory receiving exported files
    pub output_dir: PathBuf,
    /// Export file format
    pub format: ExportFormat,
    /// Summary format
    pub output_format: OutputFormat,
    /// Show a progress bar while paging
    pub show_progress: bool,
}

impl RunConfig {
    /// Resolve from parsed CLI flags
    pub fn from_cli(cli: &Cli) -> Self {
        let base = if cli.legacy_paging {
            FetchConfig::legacy()
        } else {
            FetchConfig::default()
        };

        let fetch = base
            .with_base_url(cli.base_url.clone())
            .with_page_size(cli.page_size)
            .with_max_retries(cli.max_retries)
            .with_request_timeout(Duration::from_secs(cli.timeout_secs))
            .with_retry_backoff(Duration::from_millis(cli.retry_backoff_ms), cli.jitter)
            .with_page_delay(Duration::from_millis(cli.page_delay_ms));

        Self {
            fetch,
            output_dir: cli.output_dir.clone(),
            format: cli.format,
            output_format: cli.output_format,
            show_progress: !cli.no_progress,
        }
    }

    /// Whether legacy paging is active
    pub fn is_legacy(&self) -> bool {
        self.fetch.page_count_mode == PageCountMode::Legacy
    }
}

/// Result of fetch + export for one category
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExtractionSummary {
    /// Category extracted
    pub category: String,
    /// `recordsTotal` reported by the server
    pub records_total: u64,
    /// Pages walked
    pub total_pages: u64,
    /// Records retrieved and exported
    pub records: usize,
    /// Indices of pages that exhausted their retries
    pub failed_pages: Vec<u64>,
    /// Retry attempts made
    pub retries: u64,
    /// File written, if any
    pub output: Option<PathBuf>,
}

impl ExtractionSummary {
    /// Whether every page was retrieved
    pub fn is_complete(&self) -> bool {
        self.failed_pages.is_empty()
    }
}

/// Fetch every page for `category` from `source` and export the result
///
/// # Errors
/// Discovery, configuration and export failures. Failed pages are listed in
/// the summary instead.
pub async fn extract_category<S: PageSource>(
    source: S,
    config: &RunConfig,
    category: &Category,
    progress: Option<ProgressBar>,
) -> Result<ExtractionSummary, CliError> {
    let mut fetcher = PageFetcher::new(source, config.fetch.clone());
    if let Some(bar) = progress {
        fetcher = fetcher.with_progress_bar(bar);
    }

    let report = fetcher.fetch(category).await?;
    let failed_pages = report.failed_page_indices();
    let (records_total, total_pages, retries) =
        (report.records_total, report.total_pages, report.retries);

    // Spreadsheet writes are blocking file IO
    let sink = ResultSink::new(config.format.exporter(config.output_dir.clone()));
    let records = report.into_records();
    let export_category = category.clone();
    let delivered = tokio::task::spawn_blocking(move || sink.deliver(&records, &export_category))
        .await
        .map_err(|e| OutputError::IoError(format!("Export task failed: {e}")))??;

    Ok(ExtractionSummary {
        category: category.as_str().to_string(),
        records_total,
        total_pages,
        records: delivered.records,
        failed_pages,
        retries,
        output: delivered.output,
    })
}

/// Read a category from `input`, writing the prompt to `output`
///
/// # Errors
/// Returns [`CliError::InvalidArgument`] when the answer is empty.
pub fn prompt_category<R: BufRead, W: Write>(mut input: R, mut output: W) -> Result<Category, CliError> {
    output
        .write_all(CATEGORY_PROMPT.as_bytes())
        .and_then(|_| output.flush())
        .map_err(|e| CliError::InvalidArgument(format!("Failed to write prompt: {e}")))?;

    let mut line = String::new();
    input
        .read_line(&mut line)
        .map_err(|e| CliError::InvalidArgument(format!("Failed to read job family: {e}")))?;

    Category::parse(&line)
        .map_err(|_| CliError::InvalidArgument("No job family entered".to_string()))
}

impl ExtractArgs {
    /// Execute the extract command
    pub async fn execute(&self, cli: &Cli) -> Result<(), CliError> {
        let config = RunConfig::from_cli(cli);

        let category = match &self.category {
            Some(raw) => Category::parse(raw)?,
            None => {
                let stdin = std::io::stdin();
                prompt_category(stdin.lock(), std::io::stdout())?
            }
        };

        if config.is_legacy() {
            info!("Legacy paging enabled: page 1 is requested twice and exact multiples add an empty page");
        }

        let client = LookupHttpClient::new(config.fetch.base_url.clone(), config.fetch.request_timeout)?;
        let progress = config
            .show_progress
            .then(|| create_progress_bar(&category));

        let result = extract_category(client, &config, &category, progress).await;

        match config.output_format {
            OutputFormat::Json => output_json(&category, &result),
            OutputFormat::Human => output_human(&result),
        }

        result.map(|_| ())
    }
}

fn create_progress_bar(category: &Category) -> ProgressBar {
    // Length is set by the fetcher once discovery reports the page count
    let pb = ProgressBar::new(0);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} pages ({percent}%) {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb.set_message(category.to_string());
    pb
}

fn output_json(category: &Category, result: &Result<ExtractionSummary, CliError>) {
    let output = match result {
        Ok(summary) => serde_json::json!({
            "success": true,
            "complete": summary.is_complete(),
            "category": summary.category,
            "records_total": summary.records_total,
            "total_pages": summary.total_pages,
            "records": summary.records,
            "failed_pages": summary.failed_pages,
            "retries": summary.retries,
            "output": summary.output.as_ref().map(|p| p.display().to_string()),
            "error": null,
        }),
        Err(e) => serde_json::json!({
            "success": false,
            "category": category.as_str(),
            "error": e.to_string(),
        }),
    };

    println!("{output}");
}

fn output_human(result: &Result<ExtractionSummary, CliError>) {
    match result {
        Ok(summary) => {
            println!("\nExtraction finished for {}", summary.category);
            println!("Total records reported: {}", summary.records_total);
            println!("Pages: {}", summary.total_pages);
            println!("Records retrieved: {}", summary.records);
            if summary.retries > 0 {
                println!("Retries: {}", summary.retries);
            }
            if !summary.is_complete() {
                let pages: Vec<String> = summary
                    .failed_pages
                    .iter()
                    .map(|p| (p + 1).to_string())
                    .collect();
                println!("Failed pages: {}", pages.join(", "));
            }
            match &summary.output {
                Some(path) => println!("Output: {}", path.display()),
                None => println!("No data found - nothing exported"),
            }
        }
        Err(e) => {
            eprintln!("\nExtraction failed!");
            eprintln!("Error: {e}");
            error!("Extraction failed: {}", e);
        }
    }
}
