use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::Workbook;

use crate::domain::model::{CellValue, Sheet};
use crate::domain::ports::TableStore;
use crate::utils::error::{Result, TaskError};

/// Reads one worksheet into a `Sheet`. `sheet_name` of `None` means the
/// first sheet. Cells outside the used range stay `Empty`.
pub fn read_sheet(path: &Path, sheet_name: Option<&str>) -> Result<Sheet> {
    let mut workbook = open_workbook_auto(path)?;

    let name = match sheet_name {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| TaskError::processing(format!("{} has no sheets", path.display())))?,
    };

    let range = workbook.worksheet_range(&name)?;

    let mut sheet = Sheet::default();
    // Used ranges do not necessarily start at A1; keep absolute positions
    // so configured column letters stay valid.
    let (row_offset, col_offset) = range.start().unwrap_or((0, 0));
    for (r, row) in range.rows().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            let value = convert_cell(cell);
            if value != CellValue::Empty {
                sheet.set_cell(row_offset as usize + r, col_offset as usize + c, value);
            }
        }
    }
    Ok(sheet)
}

/// Writes a `Sheet` to a new single-worksheet xlsx file, replacing any
/// existing file at `path`.
pub fn write_sheet(path: &Path, sheet: &Sheet) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (r, row) in sheet.rows().iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            match cell {
                CellValue::Empty => {}
                CellValue::Text(s) => {
                    worksheet.write_string(r as u32, c as u16, s)?;
                }
                CellValue::Number(n) => {
                    worksheet.write_number(r as u32, c as u16, *n)?;
                }
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::from(s.as_str()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::text(b.to_string()),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::from(s.as_str()),
        Data::Error(_) => CellValue::Empty,
    }
}

/// Saving always produces plain xlsx content, so a macro workbook must
/// not be overwritten in place. Returns a sibling `.xlsx` path for
/// `.xlsm` and `.xls` inputs, the input path otherwise.
fn save_path(path: &Path) -> PathBuf {
    let is_plain_xlsx = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"));
    if is_plain_xlsx {
        path.to_path_buf()
    } else {
        path.with_extension("xlsx")
    }
}

/// Row store backed by an xlsx workbook. Saving rewrites the whole file;
/// a crash mid-write can leave it partially updated.
#[derive(Debug, Clone)]
pub struct WorkbookStore {
    path: PathBuf,
    sheet_name: Option<String>,
}

impl WorkbookStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sheet_name: None,
        }
    }

    pub fn with_sheet(path: impl Into<PathBuf>, sheet_name: Option<String>) -> Self {
        Self {
            path: path.into(),
            sheet_name,
        }
    }
}

impl TableStore for WorkbookStore {
    fn load(&self) -> Result<Sheet> {
        read_sheet(&self.path, self.sheet_name.as_deref())
    }

    fn save(&self, sheet: &Sheet) -> Result<()> {
        let target = save_path(&self.path);
        if target != self.path {
            tracing::warn!(
                "{} cannot be rewritten in place (macros and legacy formats are not preserved); \
                 saving to {} and leaving the original untouched",
                self.path.display(),
                target.display()
            );
        }
        write_sheet(&target, sheet)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn written_sheet_reads_back_with_positions_intact() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("roundtrip.xlsx");

        let mut sheet = Sheet::default();
        sheet.set_cell(0, 0, CellValue::text("Nr paczki"));
        sheet.set_cell(1, 0, CellValue::text("A1"));
        sheet.set_cell(1, 11, CellValue::Number(623372027634223.0));
        write_sheet(&path, &sheet).unwrap();

        let loaded = read_sheet(&path, None).unwrap();
        assert_eq!(loaded.cell(0, 0).as_str(), Some("Nr paczki"));
        assert_eq!(loaded.cell(1, 0).as_str(), Some("A1"));
        assert_eq!(
            loaded.cell(1, 11).as_key().as_deref(),
            Some("623372027634223")
        );
        assert!(loaded.cell(1, 5).is_empty());
    }

    #[test]
    fn macro_workbook_is_saved_to_a_sibling_xlsx_not_overwritten() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("paczki.xlsm");
        std::fs::write(&path, b"macro workbook bytes").unwrap();

        let store = WorkbookStore::new(&path);
        store
            .save(&Sheet::new(vec![vec![CellValue::text("A1")]]))
            .unwrap();

        // The original file keeps its bytes; the result lands next to it.
        assert_eq!(std::fs::read(&path).unwrap(), b"macro workbook bytes");
        let sibling = dir.path().join("paczki.xlsx");
        let loaded = read_sheet(&sibling, None).unwrap();
        assert_eq!(loaded.cell(0, 0).as_str(), Some("A1"));
    }

    #[test]
    fn missing_named_sheet_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("one_sheet.xlsx");
        write_sheet(&path, &Sheet::new(vec![vec![CellValue::text("x")]])).unwrap();

        assert!(read_sheet(&path, Some("MojeGS1")).is_err());
        assert!(read_sheet(&path, None).is_ok());
    }
}
