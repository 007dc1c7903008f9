use std::path::Path;

use async_trait::async_trait;

use crate::adapters::gateway::GatewayClient;
use crate::adapters::workbook::WorkbookStore;
use crate::config::toml_config::{AppConfig, EanNamesConfig};
use crate::core::engine::TaskEngine;
use crate::domain::model::{column_index, CellValue, Sheet, TaskReport};
use crate::domain::ports::SheetTask;
use crate::utils::error::{Result, TaskError};

/// Fills the GS1 registration sheet: static column values on every row,
/// a product name per EAN from the gateway. Rows after the first empty
/// GTIN cell are left alone; the EAN list ends there.
pub struct EanNamesTask {
    client: GatewayClient,
    config: EanNamesConfig,
}

impl EanNamesTask {
    pub fn new(client: GatewayClient, config: EanNamesConfig) -> Self {
        Self { client, config }
    }

    fn column(letter: &str) -> Result<usize> {
        column_index(letter)
            .ok_or_else(|| TaskError::config(format!("{} is not a column letter", letter)))
    }
}

#[async_trait]
impl SheetTask for EanNamesTask {
    fn name(&self) -> &str {
        "ean-names"
    }

    async fn process(&self, sheet: &mut Sheet) -> Result<TaskReport> {
        let gtin_column = Self::column(&self.config.gtin_column)?;
        let name_column = Self::column(&self.config.product_name_column)?;
        let mut statics = Vec::new();
        for static_value in &self.config.static_values {
            statics.push((Self::column(&static_value.column)?, static_value.value.clone()));
        }

        let mut report = TaskReport::default();
        let first = self.config.starting_row.saturating_sub(1);

        for row in first..sheet.row_count() {
            for (column, value) in &statics {
                sheet.set_cell(row, *column, CellValue::text(value.clone()));
            }

            let Some(ean) = sheet.cell(row, gtin_column).as_key() else {
                tracing::info!("No more EAN codes found, stopping at row {}", row + 1);
                break;
            };

            tracing::info!("EAN code: {}, row {}", ean, row + 1);
            let name = match self.client.product_name(&ean).await {
                Ok(Some(name)) => name,
                Ok(None) => self.config.default_name.clone(),
                Err(e) => {
                    tracing::error!("Gateway lookup for EAN {} failed: {}", ean, e);
                    report.rows_failed += 1;
                    self.config.default_name.clone()
                }
            };
            sheet.set_cell(row, name_column, CellValue::text(name));
            report.rows_processed += 1;
        }

        Ok(report)
    }
}

fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .is_some_and(|ext| ext == "xlsx" || ext == "xls")
}

/// Processes every workbook in the folder, one engine run per file.
pub async fn run(folder: &Path, config: &AppConfig) -> Result<TaskReport> {
    let client = GatewayClient::new(&config.gateway)?;
    let task = EanNamesTask::new(client, config.ean_names.clone());

    let mut total = TaskReport::default();
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
        let store = WorkbookStore::with_sheet(&path, config.ean_names.sheet_name.clone());
        let report = TaskEngine::new(store).run(&task).await?;
        total.rows_processed += report.rows_processed;
        total.rows_failed += report.rows_failed;
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::toml_config::GatewayConfig;
    use httpmock::prelude::*;

    fn task_for(server: &MockServer) -> EanNamesTask {
        let client = GatewayClient::new(&GatewayConfig {
            base_url: server.base_url(),
            login: "login".to_string(),
            secret_key: "sekret".to_string(),
            timeout_seconds: 5,
        })
        .unwrap();
        EanNamesTask::new(
            client,
            EanNamesConfig {
                gtin_column: "A".to_string(),
                product_name_column: "B".to_string(),
                starting_row: 1,
                static_values: vec![crate::config::toml_config::StaticValue {
                    column: "C".to_string(),
                    value: "PL".to_string(),
                }],
                ..EanNamesConfig::default()
            },
        )
    }

    #[tokio::test]
    async fn stops_at_the_first_empty_gtin_cell() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST).path("/api/");
            then.status(200).json_body(serde_json::json!({
                "results": [{"productSkuList": [{"productName": "Botki", "sizeName": "38"}]}]
            }));
        });

        let mut sheet = Sheet::new(vec![
            vec![CellValue::Number(5901234123457.0)],
            vec![CellValue::Empty],
            vec![CellValue::Number(5901234123458.0)],
        ]);

        let report = task_for(&server).process(&mut sheet).await.unwrap();

        // Only the first row was looked up; the scan stopped at row 2.
        mock.assert_hits(1);
        assert_eq!(report.rows_processed, 1);
        assert_eq!(sheet.cell(0, 1).as_str(), Some("Botki 38"));
        // Statics were written to the stopping row too, but not past it.
        assert_eq!(sheet.cell(0, 2).as_str(), Some("PL"));
        assert_eq!(sheet.cell(1, 2).as_str(), Some("PL"));
        assert!(sheet.cell(2, 1).is_empty());
        assert!(sheet.cell(2, 2).is_empty());
    }

    #[tokio::test]
    async fn unknown_barcode_gets_the_default_name() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/");
            then.status(200).json_body(serde_json::json!({"results": []}));
        });

        let mut sheet = Sheet::new(vec![vec![CellValue::text("5900000000000")]]);
        task_for(&server).process(&mut sheet).await.unwrap();
        assert_eq!(sheet.cell(0, 1).as_str(), Some("Obuwie"));
    }
}
