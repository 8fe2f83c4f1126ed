//! CSV exporter

use csv::Writer;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::{debug, info};

use super::{column_order, Cell, ExportFormat, OutputError, OutputPathBuilder, OutputResult, RecordExporter};
use crate::{Category, Record};

const BUFFER_SIZE: usize = 8192; // 8KB buffer

/// Writes records to a timestamped CSV file under a root directory
#[derive(Debug, Clone)]
pub struct CsvExporter {
    root_dir: PathBuf,
}

impl CsvExporter {
    /// Create an exporter writing into `root_dir`
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }
}

impl RecordExporter for CsvExporter {
    fn export(&self, records: &[Record], category: &Category) -> OutputResult<PathBuf> {
        let builder = OutputPathBuilder::new(self.root_dir.clone(), category)
            .with_format(ExportFormat::Csv);
        builder.ensure_directory()?;
        let path = builder.build();

        debug!("Creating CSV writer: path={}", path.display());

        let file = File::create(&path)
            .map_err(|e| OutputError::IoError(format!("Failed to create file: {}", e)))?;
        let mut writer = Writer::from_writer(BufWriter::with_capacity(BUFFER_SIZE, file));

        let columns = column_order(records);
        writer
            .write_record(&columns)
            .map_err(|e| OutputError::CsvError(format!("Failed to write header: {}", e)))?;

        for record in records {
            let row: Vec<String> = columns
                .iter()
                .map(|name| Cell::from_value(record.get(name)).to_text())
                .collect();
            writer
                .write_record(&row)
                .map_err(|e| OutputError::CsvError(format!("Failed to write record: {}", e)))?;
        }

        let buf_writer = writer
            .into_inner()
            .map_err(|e| OutputError::IoError(format!("Failed to flush writer: {}", e)))?;
        let file = buf_writer
            .into_inner()
            .map_err(|e| OutputError::IoError(format!("Failed to get file handle: {}", e)))?;
        file.sync_all()
            .map_err(|e| OutputError::IoError(format!("Failed to sync file: {}", e)))?;

        info!("Exported {} records -> {}", records.len(), path.display());
        Ok(path)
    }
}
