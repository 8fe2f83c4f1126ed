//! Record exporters and result sink

use crate::{Category, Record};
use serde_json::Value;
use std::path::PathBuf;
use std::str::FromStr;

pub mod csv;
pub mod path;
pub mod sink;
pub mod xlsx;

pub use path::OutputPathBuilder;
pub use sink::{ResultSink, SinkReport};

/// Output writer errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// IO error
    #[error("IO error: {0}")]
    IoError(String),

    /// Spreadsheet write error
    #[error("XLSX error: {0}")]
    XlsxError(String),

    /// CSV write error
    #[error("CSV error: {0}")]
    CsvError(String),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for a finished record set
///
/// Implementations choose the file name and own the destination directory;
/// callers only pass records and the category they belong to.
pub trait RecordExporter: Send + Sync {
    /// Write `records` and return the path written
    fn export(&self, records: &[Record], category: &Category) -> OutputResult<PathBuf>;
}

impl<E: RecordExporter + ?Sized> RecordExporter for Box<E> {
    fn export(&self, records: &[Record], category: &Category) -> OutputResult<PathBuf> {
        (**self).export(records, category)
    }
}

/// Spreadsheet file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Excel workbook
    #[default]
    Xlsx,
    /// Comma-separated values
    Csv,
}

impl ExportFormat {
    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
        }
    }

    /// Exporter writing this format into `root_dir`
    pub fn exporter(&self, root_dir: impl Into<PathBuf>) -> Box<dyn RecordExporter> {
        match self {
            Self::Xlsx => Box::new(xlsx::XlsxExporter::new(root_dir)),
            Self::Csv => Box::new(csv::CsvExporter::new(root_dir)),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "xlsx" => Ok(Self::Xlsx),
            "csv" => Ok(Self::Csv),
            _ => Err(format!("Invalid export format: {s}. Valid options: xlsx, csv")),
        }
    }
}

/// Column headers: union of record keys in first-seen order
pub fn column_order(records: &[Record]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for record in records {
        for key in record.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

/// Spreadsheet cell derived from a JSON value
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Blank cell (null or missing)
    Empty,
    /// Numeric cell
    Number(f64),
    /// Text cell
    Text(String),
}

impl Cell {
    /// Convert an optional JSON value
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::Empty,
            Some(Value::String(s)) => Self::Text(s.clone()),
            Some(Value::Number(n)) => n
                .as_f64()
                .map(Self::Number)
                .unwrap_or_else(|| Self::Text(n.to_string())),
            Some(Value::Bool(b)) => Self::Text(b.to_string()),
            Some(other) => Self::Text(other.to_string()),
        }
    }

    /// Text form used by formats without typed cells
    pub fn to_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}
