use std::path::Path;

use crate::adapters::workbook;
use crate::config::toml_config::{AppConfig, Gs1ResultsConfig};
use crate::domain::model::{column_index, CellValue, Sheet, TaskReport};
use crate::utils::error::{Result, TaskError};

/// Rows whose condition cell equals one of the configured rejection
/// reasons, reduced to the configured extract columns.
pub fn extract_matching(sheet: &Sheet, config: &Gs1ResultsConfig) -> Result<Vec<Vec<CellValue>>> {
    let condition_column = column_index(&config.condition_column).ok_or_else(|| {
        TaskError::config(format!("{} is not a column letter", config.condition_column))
    })?;
    let mut extract_columns = Vec::new();
    for letter in &config.extract_columns {
        extract_columns.push(column_index(letter).ok_or_else(|| {
            TaskError::config(format!("{} is not a column letter", letter))
        })?);
    }

    let first = config.starting_row.saturating_sub(1);
    let mut extracted = Vec::new();
    for row in first..sheet.row_count() {
        let condition = sheet.cell(row, condition_column);
        let matches = condition
            .as_str()
            .is_some_and(|value| config.conditions.iter().any(|c| c == value.trim()));
        if matches {
            extracted.push(
                extract_columns
                    .iter()
                    .map(|col| sheet.cell(row, *col).clone())
                    .collect(),
            );
        }
    }
    Ok(extracted)
}

fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .is_some_and(|ext| ext == "xlsx" || ext == "xls")
}

/// Collects rejected rows from every workbook in the folder into one
/// output workbook. Purely local; no lookups.
pub fn run(folder: &Path, output: &Path, config: &AppConfig) -> Result<TaskReport> {
    let cfg = &config.gs1_results;
    let mut out = Sheet::default();
    let mut report = TaskReport::default();

    let mut entries: Vec<_> = std::fs::read_dir(folder)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    entries.sort();

    for path in entries {
        if !is_workbook(&path) {
            tracing::info!("Skipping non-Excel file: {}", path.display());
            continue;
        }
        tracing::info!("Found Excel file: {} - starting to process", path.display());
        let sheet = workbook::read_sheet(&path, None)?;
        for row in extract_matching(&sheet, cfg)? {
            out.push_row(row);
            report.rows_processed += 1;
        }
        tracing::info!("Finished processing file: {}", path.display());
    }

    workbook::write_sheet(output, &out)?;
    tracing::info!("Output saved to {}", output.display());
    Ok(report)
}
