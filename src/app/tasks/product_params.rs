use std::path::Path;

use async_trait::async_trait;

use crate::adapters::panel::PanelClient;
use crate::adapters::workbook::WorkbookStore;
use crate::config::toml_config::{AppConfig, ProductParamsConfig};
use crate::core::engine::TaskEngine;
use crate::core::enrich::{enrich_sheet, EnrichmentPlan};
use crate::domain::model::{column_index, CellValue, Sheet, TaskReport};
use crate::domain::ports::{RowEnricher, SheetTask};
use crate::utils::error::{Result, TaskError};

/// Size charts come as `"41-26,5/42-27"`; returns the value paired with
/// the given size name.
pub fn value_for_size(size_name: &str, size_chart: &str) -> Option<String> {
    for pair in size_chart.split('/') {
        let mut parts = pair.splitn(2, '-');
        let size = parts.next()?;
        if let Some(value) = parts.next() {
            if size == size_name {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Always three photo cells: real URLs first, placeholder for the rest.
pub fn photo_cells(urls: &[String], placeholder: &str) -> Vec<CellValue> {
    (0..3)
        .map(|i| match urls.get(i) {
            Some(url) => CellValue::text(url.clone()),
            None => CellValue::text(placeholder),
        })
        .collect()
}

/// Per-product lookup fan-out: the products endpoint for chart/icon/
/// photos, one SKU call serving both the EAN and the insole length, and
/// the displayed-code endpoint. A product without results leaves its row
/// untouched; failed secondary lookups degrade to empty cells.
pub struct ParamsEnricher {
    client: PanelClient,
    media_base_url: String,
    photo_placeholder: String,
}

impl ParamsEnricher {
    pub fn new(client: PanelClient, config: &ProductParamsConfig) -> Self {
        Self {
            client,
            media_base_url: config.media_base_url.trim_end_matches('/').to_string(),
            photo_placeholder: config.photo_placeholder.clone(),
        }
    }
}

#[async_trait]
impl RowEnricher for ParamsEnricher {
    async fn enrich(&self, key: &str) -> Option<Vec<CellValue>> {
        let info = match self.client.product_parameters(key).await {
            Ok(Some(info)) => info,
            Ok(None) => {
                tracing::error!("No results found for product ID {}", key);
                return None;
            }
            Err(e) => {
                tracing::error!("Product parameters lookup for ID {} failed: {}", key, e);
                return None;
            }
        };

        let sku = match self.client.sku_info(key).await {
            Ok(sku) => sku,
            Err(e) => {
                tracing::error!("SKU lookup for ID {} failed: {}", key, e);
                None
            }
        };
        let (ean, size_name) = sku
            .map(|s| (s.code_producer, s.size_name))
            .unwrap_or_default();

        let code = match self.client.displayed_code(key).await {
            Ok(code) => code.unwrap_or_default(),
            Err(e) => {
                tracing::error!("Displayed code lookup for ID {} failed: {}", key, e);
                String::new()
            }
        };

        let insole = value_for_size(&size_name, &info.size_chart_name).unwrap_or_default();
        let miniature = format!(
            "{}/{}",
            self.media_base_url,
            info.auction_icon_url.trim_start_matches('/')
        );

        let mut cells = vec![
            CellValue::from(ean.as_str()),
            CellValue::from(code.as_str()),
            CellValue::from(insole.as_str()),
            CellValue::text(miniature),
        ];
        cells.extend(photo_cells(&info.image_urls, &self.photo_placeholder));
        Some(cells)
    }
}

pub struct ProductParamsTask {
    enricher: ParamsEnricher,
    config: ProductParamsConfig,
}

impl ProductParamsTask {
    pub fn new(client: PanelClient, config: ProductParamsConfig) -> Self {
        Self {
            enricher: ParamsEnricher::new(client, &config),
            config,
        }
    }

    fn column(&self, letter: &str) -> Result<usize> {
        column_index(letter)
            .ok_or_else(|| TaskError::config(format!("{} is not a column letter", letter)))
    }
}

#[async_trait]
impl SheetTask for ProductParamsTask {
    fn name(&self) -> &str {
        "product-params"
    }

    async fn process(&self, sheet: &mut Sheet) -> Result<TaskReport> {
        let mut output_columns = vec![
            self.column(&self.config.ean_column)?,
            self.column(&self.config.code_column)?,
            self.column(&self.config.insole_column)?,
            self.column(&self.config.miniature_column)?,
        ];
        for letter in &self.config.photo_columns {
            output_columns.push(self.column(letter)?);
        }

        let plan = EnrichmentPlan {
            key_column: self.column(&self.config.product_id_column)?,
            output_columns,
            starting_row: self.config.starting_row,
            max_rows: self.config.max_rows,
        };
        Ok(enrich_sheet(sheet, &plan, &self.enricher).await)
    }
}

pub async fn run(file: &Path, config: &AppConfig) -> Result<TaskReport> {
    let client = PanelClient::new(&config.panel)?;
    let task = ProductParamsTask::new(client, config.product_params.clone());
    TaskEngine::new(WorkbookStore::new(file)).run(&task).await
}
