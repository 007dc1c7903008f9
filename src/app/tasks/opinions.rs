use std::path::Path;

use chrono::NaiveDate;

use crate::adapters::delimited::append_rows;
use crate::adapters::storefront::StorefrontClient;
use crate::config::toml_config::{AppConfig, OpinionsConfig};
use crate::domain::model::{Opinion, OpinionKind, TaskReport};
use crate::utils::error::{Result, TaskError};

/// Opinion timestamps look like `2023-06-01 10:00:00`; only the date part
/// decides. Unparseable dates never pass the cutoff.
pub fn is_after_cutoff(create_date: &str, cutoff: NaiveDate) -> bool {
    let date_part = create_date.split(' ').next().unwrap_or_default();
    match NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        Ok(date) => date > cutoff,
        Err(_) => {
            tracing::warn!("Opinion carries an unparseable date: {}", create_date);
            false
        }
    }
}

/// Pages through the storefront opinions feed and appends the matching
/// entries to a CSV file. One cooperative task, one HTTP call in flight
/// at a time; a malformed page is skipped, the rest still run.
pub struct OpinionsTask {
    client: StorefrontClient,
    config: OpinionsConfig,
    page_count: usize,
}

impl OpinionsTask {
    pub fn new(client: StorefrontClient, config: OpinionsConfig, page_count: usize) -> Self {
        Self {
            client,
            config,
            page_count,
        }
    }

    pub async fn run(&self, kind: OpinionKind, output_dir: &Path) -> Result<TaskReport> {
        std::fs::create_dir_all(output_dir)?;

        let cutoff = NaiveDate::parse_from_str(&self.config.cutoff_date, "%Y-%m-%d").map_err(
            |e| TaskError::config(format!("cutoff date {}: {}", self.config.cutoff_date, e)),
        )?;

        let mut rows: Vec<Vec<String>> = Vec::new();
        let mut report = TaskReport::default();

        for page in 0..self.page_count {
            tracing::info!("Fetching opinions page {}", page);
            let opinions = match self.client.opinions_page(kind, page).await {
                Ok(opinions) => opinions,
                Err(e) => {
                    tracing::error!("Skipping opinions page {}: {}", page, e);
                    report.rows_failed += 1;
                    continue;
                }
            };

            for opinion in opinions {
                if !is_after_cutoff(&opinion.create_date, cutoff) {
                    tracing::debug!(
                        "{} - before {}",
                        opinion.create_date,
                        self.config.cutoff_date
                    );
                    continue;
                }
                rows.push(self.format_row(kind, &opinion).await);
            }
        }

        let file_name = match kind {
            OpinionKind::Product => &self.config.product_file,
            OpinionKind::Order => &self.config.order_file,
        };
        let path = output_dir.join(file_name);
        append_rows(&path, &rows)?;
        tracing::info!("Appended {} opinions to {}", rows.len(), path.display());

        report.rows_processed = rows.len();
        Ok(report)
    }

    async fn format_row(&self, kind: OpinionKind, opinion: &Opinion) -> Vec<String> {
        match kind {
            OpinionKind::Product => {
                let product_id = opinion.product_id;
                let name = match product_id {
                    Some(id) => match self.client.product_name(id).await {
                        Ok(Some(name)) => name,
                        Ok(None) => self.config.unknown_product.clone(),
                        Err(e) => {
                            tracing::error!("Product name lookup for {} failed: {}", id, e);
                            self.config.unknown_product.clone()
                        }
                    },
                    None => self.config.unknown_product.clone(),
                };
                vec![
                    opinion.order_sn.clone(),
                    opinion.create_date.clone(),
                    product_id.map(|id| id.to_string()).unwrap_or_default(),
                    name,
                    opinion.rating.clone(),
                    opinion.content.clone(),
                ]
            }
            OpinionKind::Order => vec![
                opinion.order_sn.clone(),
                opinion.create_date.clone(),
                opinion.rating.clone(),
                opinion.content.clone(),
            ],
        }
    }
}

pub async fn run(kind: OpinionKind, output_dir: &Path, config: &AppConfig) -> Result<TaskReport> {
    let client = StorefrontClient::new(&config.storefront)?;
    let task = OpinionsTask::new(client, config.opinions.clone(), config.storefront.page_count);
    task.run(kind, output_dir).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cutoff_is_strict_and_ignores_the_time_part() {
        let cutoff = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        assert!(is_after_cutoff("2023-06-01 10:00:00", cutoff));
        assert!(is_after_cutoff("2023-01-02", cutoff));
        assert!(!is_after_cutoff("2023-01-01 23:59:59", cutoff));
        assert!(!is_after_cutoff("2022-12-31 00:00:00", cutoff));
        assert!(!is_after_cutoff("kiedyś", cutoff));
        assert!(!is_after_cutoff("", cutoff));
    }
}
