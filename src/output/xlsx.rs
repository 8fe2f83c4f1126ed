//! XLSX exporter
//!
//! One worksheet named `SkillBridge`: a styled header row (bold white text on
//! a solid blue fill, centred) frozen above one row per record.

use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook, Worksheet, XlsxError};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use super::{column_order, Cell, ExportFormat, OutputError, OutputPathBuilder, OutputResult, RecordExporter};
use crate::{Category, Record};

/// Worksheet name
pub const SHEET_NAME: &str = "SkillBridge";

/// Header fill colour (`#4F81BD`)
pub const HEADER_FILL: u32 = 0x4F81BD;

/// Longest text Excel accepts in one cell
pub const MAX_CELL_CHARS: usize = 32_767;

/// Writes records to a timestamped workbook under a root directory
#[derive(Debug, Clone)]
pub struct XlsxExporter {
    root_dir: PathBuf,
}

impl XlsxExporter {
    /// Create an exporter writing into `root_dir`
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    fn write_sheet(worksheet: &mut Worksheet, records: &[Record]) -> Result<(), WriteError> {
        let columns = column_order(records);
        let header_format = header_format();

        worksheet.set_name(SHEET_NAME)?;

        for (col, name) in columns.iter().enumerate() {
            worksheet.write_string_with_format(0, column_index(col)?, name, &header_format)?;
        }

        for (i, record) in records.iter().enumerate() {
            let row = u32::try_from(i + 1).map_err(|_| WriteError::TooLarge("rows"))?;
            for (col, name) in columns.iter().enumerate() {
                let col = column_index(col)?;
                match Cell::from_value(record.get(name)) {
                    Cell::Empty => {}
                    Cell::Number(n) => {
                        worksheet.write_number(row, col, n)?;
                    }
                    Cell::Text(s) => {
                        let text = fit_cell_text(s, row, name);
                        worksheet.write_string(row, col, &text)?;
                    }
                }
            }
        }

        worksheet.set_freeze_panes(1, 0)?;
        Ok(())
    }
}

impl RecordExporter for XlsxExporter {
    fn export(&self, records: &[Record], category: &Category) -> OutputResult<PathBuf> {
        let builder = OutputPathBuilder::new(self.root_dir.clone(), category)
            .with_format(ExportFormat::Xlsx);
        builder.ensure_directory()?;
        let path = builder.build();

        debug!("Writing {} records to {}", records.len(), path.display());

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        Self::write_sheet(worksheet, records).map_err(OutputError::from)?;
        workbook
            .save(&path)
            .map_err(|e| OutputError::XlsxError(format!("Failed to save workbook: {e}")))?;

        info!("Exported {} records -> {}", records.len(), path.display());
        Ok(path)
    }
}

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(HEADER_FILL))
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
}

/// Cut text to [`MAX_CELL_CHARS`], logging each cut cell
fn fit_cell_text(text: String, row: u32, column: &str) -> String {
    if text.chars().count() <= MAX_CELL_CHARS {
        return text;
    }
    warn!(
        "Truncating {} value in row {} to {} characters",
        column,
        row + 1,
        MAX_CELL_CHARS
    );
    text.chars().take(MAX_CELL_CHARS).collect()
}

fn column_index(col: usize) -> Result<u16, WriteError> {
    u16::try_from(col).map_err(|_| WriteError::TooLarge("columns"))
}

#[derive(Debug)]
enum WriteError {
    Xlsx(XlsxError),
    TooLarge(&'static str),
}

impl From<XlsxError> for WriteError {
    fn from(err: XlsxError) -> Self {
        Self::Xlsx(err)
    }
}

impl From<WriteError> for OutputError {
    fn from(err: WriteError) -> Self {
        match err {
            WriteError::Xlsx(e) => OutputError::XlsxError(e.to_string()),
            WriteError::TooLarge(what) => {
                OutputError::XlsxError(format!("too many {what} for a worksheet"))
            }
        }
    }
}
