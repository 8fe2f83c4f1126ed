//! Output file naming
//!
//! Files land directly under a caller-supplied root directory:
//! `{root}/SkillBridge_{category}_{YYYYMMDD_HHMM}.{ext}`
//!
//! ```rust
//! use skillbridge_extractor::Category;
//! use skillbridge_extractor::output::{ExportFormat, OutputPathBuilder};
//! use chrono::NaiveDate;
//! use std::path::PathBuf;
//!
//! let category = Category::parse("Business and Financial Operations").unwrap();
//! let timestamp = NaiveDate::from_ymd_opt(2024, 3, 9)
//!     .unwrap()
//!     .and_hms_opt(14, 5, 0)
//!     .unwrap();
//!
//! let path = OutputPathBuilder::new(PathBuf::from("output"), &category)
//!     .with_timestamp(timestamp)
//!     .with_format(ExportFormat::Xlsx)
//!     .build();
//! assert_eq!(
//!     path,
//!     PathBuf::from("output/SkillBridge_Business_and_Financial_Operations_20240309_1405.xlsx")
//! );
//! ```

use super::{ExportFormat, OutputError, OutputResult};
use crate::Category;
use chrono::{Local, NaiveDateTime};
use std::path::PathBuf;

/// Prefix of every output file name
pub const FILE_PREFIX: &str = "SkillBridge";

/// Timestamp layout used in file names
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M";

/// Path builder for export files
#[derive(Debug, Clone)]
pub struct OutputPathBuilder {
    root_dir: PathBuf,
    label: String,
    timestamp: NaiveDateTime,
    format: ExportFormat,
}

impl OutputPathBuilder {
    /// Create a builder stamped with the current local time
    ///
    /// The category label is sanitized with [`Category::file_label`].
    pub fn new(root_dir: PathBuf, category: &Category) -> Self {
        Self {
            root_dir,
            label: category.file_label(),
            timestamp: Local::now().naive_local(),
            format: ExportFormat::Xlsx,
        }
    }

    /// Set the timestamp embedded in the file name
    pub fn with_timestamp(mut self, timestamp: NaiveDateTime) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Set file format (extension)
    pub fn with_format(mut self, format: ExportFormat) -> Self {
        self.format = format;
        self
    }

    /// File name without directory
    pub fn file_name(&self) -> String {
        format!(
            "{}_{}_{}.{}",
            FILE_PREFIX,
            self.label,
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.format.extension()
        )
    }

    /// Build the complete file path
    pub fn build(&self) -> PathBuf {
        self.root_dir.join(self.file_name())
    }

    /// Ensure the root directory exists
    pub fn ensure_directory(&self) -> OutputResult<()> {
        std::fs::create_dir_all(&self.root_dir).map_err(|e| {
            OutputError::IoError(format!(
                "Failed to create directory {}: {}",
                self.root_dir.display(),
                e
            ))
        })
    }
}
