//! Hand-off of a finished record set to an exporter

use std::path::PathBuf;
use tracing::warn;

use super::{OutputResult, RecordExporter};
use crate::{Category, Record};

/// Outcome of [`ResultSink::deliver`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkReport {
    /// Records received
    pub records: usize,
    /// File written, `None` when there was nothing to export
    pub output: Option<PathBuf>,
}

/// Passes records to a [`RecordExporter`], skipping empty sets
pub struct ResultSink<E> {
    exporter: E,
}

impl<E: RecordExporter> ResultSink<E> {
    /// Create a sink over `exporter`
    pub fn new(exporter: E) -> Self {
        Self { exporter }
    }

    /// Export `records` for `category`
    pub fn deliver(&self, records: &[Record], category: &Category) -> OutputResult<SinkReport> {
        if records.is_empty() {
            warn!("No data found for {} - nothing to export", category);
            return Ok(SinkReport {
                records: 0,
                output: None,
            });
        }

        let path = self.exporter.export(records, category)?;
        Ok(SinkReport {
            records: records.len(),
            output: Some(path),
        })
    }
}
