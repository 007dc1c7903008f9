use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::domain::model::{CellValue, Sheet};
use crate::domain::ports::TableStore;
use crate::utils::error::Result;

pub const SEMICOLON: u8 = b';';

/// Row store backed by a delimited text file with a header line.
/// Every cell is read as text; the header is row 0 of the sheet.
#[derive(Debug, Clone)]
pub struct DelimitedStore {
    path: PathBuf,
    delimiter: u8,
}

impl DelimitedStore {
    pub fn new(path: impl Into<PathBuf>, delimiter: u8) -> Self {
        Self {
            path: path.into(),
            delimiter,
        }
    }

    pub fn semicolon(path: impl Into<PathBuf>) -> Self {
        Self::new(path, SEMICOLON)
    }
}

impl TableStore for DelimitedStore {
    fn load(&self) -> Result<Sheet> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .flexible(true)
            .from_path(&self.path)?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(CellValue::from).collect());
        }
        Ok(Sheet::new(rows))
    }

    fn save(&self, sheet: &Sheet) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .from_path(&self.path)?;

        // New columns may have been appended to the header only; pad every
        // row to the full width so the file stays rectangular.
        let width = sheet.width();
        for row in sheet.rows() {
            let mut fields: Vec<String> = row.iter().map(CellValue::to_field).collect();
            fields.resize(width, String::new());
            writer.write_record(&fields)?;
        }
        writer.flush()?;
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Appends rows to a comma-delimited file, creating it if absent.
/// Quoting is handled by the writer.
pub fn append_rows(path: &Path, rows: &[Vec<String>]) -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}
