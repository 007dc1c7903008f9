use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::adapters::delimited::DelimitedStore;
use crate::adapters::panel::PanelClient;
use crate::adapters::workbook::WorkbookStore;
use crate::config::toml_config::{AppConfig, PackageCostsConfig};
use crate::core::engine::TaskEngine;
use crate::core::enrich::{enrich_sheet, EnrichmentPlan};
use crate::domain::model::{column_index, CellValue, CostLookup, Sheet, TaskReport};
use crate::domain::ports::{RowEnricher, SheetTask};
use crate::utils::error::{Result, TaskError};

pub const OUTPUT_COLUMNS: [&str; 3] = ["Netto z panelu", "Brutto z panelu", "VAT"];

/// Written when the panel has no cost for a parcel.
pub const MISSING_COST: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CourierKind {
    Dpd,
    // The camel-cased name would otherwise become "in-post" on the CLI.
    #[value(name = "inpost")]
    InPost,
    Gls,
}

impl CourierKind {
    /// GLS exports decorate parcel numbers with asterisks; they are not
    /// part of the number the panel knows.
    fn strips_asterisks(&self) -> bool {
        matches!(self, CourierKind::Gls)
    }
}

/// Amounts go into the sheet as text with a comma decimal separator,
/// the way the back office reads them.
pub fn format_amount(value: f64) -> String {
    format!("{:.2}", value).replace('.', ",")
}

/// Looks one parcel number up and maps the outcome onto the three cost
/// cells. Every failure tier resolves to the `-` sentinel; unknown
/// parcels additionally land in the side log.
pub struct CostEnricher {
    client: PanelClient,
    strip_asterisks: bool,
    not_found_log: Option<PathBuf>,
}

impl CostEnricher {
    pub fn new(client: PanelClient, strip_asterisks: bool, not_found_log: Option<PathBuf>) -> Self {
        Self {
            client,
            strip_asterisks,
            not_found_log,
        }
    }

    fn log_not_found(&self, parcel: &str) {
        let Some(path) = &self.not_found_log else {
            return;
        };
        let entry = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| writeln!(file, "Nie odnaleziono paczki: {}", parcel));
        if let Err(e) = entry {
            tracing::error!("Could not append to {}: {}", path.display(), e);
        }
    }

    fn sentinel_cells() -> Vec<CellValue> {
        vec![CellValue::text(MISSING_COST); 3]
    }
}

#[async_trait]
impl RowEnricher for CostEnricher {
    async fn enrich(&self, key: &str) -> Option<Vec<CellValue>> {
        let parcel = if self.strip_asterisks {
            key.replace('*', "")
        } else {
            key.to_string()
        };

        let cells = match self.client.shipping_cost(&parcel).await {
            Ok(CostLookup::Found(cost)) => [cost.net, cost.gross, cost.vat]
                .into_iter()
                .map(|value| match value {
                    Some(v) => CellValue::text(format_amount(v)),
                    None => CellValue::Empty,
                })
                .collect(),
            Ok(CostLookup::NotFound) => {
                tracing::warn!("Parcel {} not found in the panel", parcel);
                self.log_not_found(&parcel);
                Self::sentinel_cells()
            }
            Ok(CostLookup::NoResults) => {
                tracing::warn!("Panel returned no results for parcel {}", parcel);
                Self::sentinel_cells()
            }
            Ok(CostLookup::NoPaymentData) => {
                tracing::warn!("No payment data for parcel {}", parcel);
                Self::sentinel_cells()
            }
            Err(e) => {
                tracing::error!("Shipping cost lookup for parcel {} failed: {}", parcel, e);
                Self::sentinel_cells()
            }
        };
        Some(cells)
    }
}

enum KeyColumn {
    Letter(String),
    Header(String),
}

pub struct PackageCostsTask {
    enricher: CostEnricher,
    key_column: KeyColumn,
    starting_row: usize,
    max_rows: usize,
}

impl PackageCostsTask {
    pub fn for_workbook(client: PanelClient, config: &PackageCostsConfig) -> Self {
        Self {
            enricher: CostEnricher::new(client, false, Some(config.not_found_log.clone().into())),
            key_column: KeyColumn::Letter(config.parcel_column.clone()),
            starting_row: config.starting_row,
            max_rows: config.max_rows,
        }
    }

    pub fn for_delimited(
        client: PanelClient,
        config: &PackageCostsConfig,
        courier: CourierKind,
        key_field: String,
    ) -> Self {
        Self {
            enricher: CostEnricher::new(
                client,
                courier.strips_asterisks(),
                Some(config.not_found_log.clone().into()),
            ),
            key_column: KeyColumn::Header(key_field),
            starting_row: 2,
            max_rows: config.max_rows,
        }
    }
}

#[async_trait]
impl SheetTask for PackageCostsTask {
    fn name(&self) -> &str {
        "package-costs"
    }

    async fn process(&self, sheet: &mut Sheet) -> Result<TaskReport> {
        let key_column = match &self.key_column {
            KeyColumn::Letter(letter) => column_index(letter).ok_or_else(|| {
                TaskError::config(format!("{} is not a column letter", letter))
            })?,
            KeyColumn::Header(name) => sheet.header_index(name).ok_or_else(|| {
                TaskError::processing(format!("column '{}' not found in the header line", name))
            })?,
        };

        let output_columns =
            sheet.ensure_columns(&[OUTPUT_COLUMNS[0], OUTPUT_COLUMNS[1], OUTPUT_COLUMNS[2]]);

        let plan = EnrichmentPlan {
            key_column,
            output_columns,
            starting_row: self.starting_row,
            max_rows: self.max_rows,
        };
        Ok(enrich_sheet(sheet, &plan, &self.enricher).await)
    }
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .is_some_and(|ext| extensions.contains(&ext.as_str()))
}

/// Picks the store and key location for the courier's export format and
/// runs the task through the engine.
pub async fn run(file: &Path, courier: CourierKind, config: &AppConfig) -> Result<TaskReport> {
    let client = PanelClient::new(&config.panel)?;
    let cfg = &config.package_costs;

    match courier {
        CourierKind::Dpd if has_extension(file, &["xlsx", "xlsm"]) => {
            let task = PackageCostsTask::for_workbook(client, cfg);
            TaskEngine::new(WorkbookStore::new(file)).run(&task).await
        }
        CourierKind::InPost | CourierKind::Gls if has_extension(file, &["csv"]) => {
            let key_field = match courier {
                CourierKind::InPost => cfg.inpost_field.clone(),
                _ => cfg.gls_field.clone(),
            };
            let task = PackageCostsTask::for_delimited(client, cfg, courier, key_field);
            TaskEngine::new(DelimitedStore::semicolon(file)).run(&task).await
        }
        _ => Err(TaskError::InvalidConfigValueError {
            field: "courier/file".to_string(),
            value: format!("{:?} with {}", courier, file.display()),
            reason: "DPD expects an .xlsx workbook; InPost and GLS expect a .csv export"
                .to_string(),
        }),
    }
}
