use std::path::Path;

use async_trait::async_trait;

use crate::adapters::workbook::WorkbookStore;
use crate::config::toml_config::{AppConfig, WorkbookDiffConfig};
use crate::core::diff::{collect_keys, matching_rows, prune_rows};
use crate::core::engine::TaskEngine;
use crate::domain::model::{column_index, Sheet, TaskReport};
use crate::domain::ports::{SheetTask, TableStore};
use crate::utils::error::{Result, TaskError};

/// Deletes from the target workbook every row whose key was seen in the
/// source workbook. The engine handles persisting the target.
pub struct WorkbookDiffTask {
    source: WorkbookStore,
    config: WorkbookDiffConfig,
}

impl WorkbookDiffTask {
    pub fn new(source: WorkbookStore, config: WorkbookDiffConfig) -> Self {
        Self { source, config }
    }
}

#[async_trait]
impl SheetTask for WorkbookDiffTask {
    fn name(&self) -> &str {
        "workbook-diff"
    }

    async fn process(&self, target: &mut Sheet) -> Result<TaskReport> {
        let source_column = column_index(&self.config.source_key_column).ok_or_else(|| {
            TaskError::config(format!(
                "{} is not a column letter",
                self.config.source_key_column
            ))
        })?;
        let target_column = column_index(&self.config.target_key_column).ok_or_else(|| {
            TaskError::config(format!(
                "{} is not a column letter",
                self.config.target_key_column
            ))
        })?;

        let source_sheet = self.source.load()?;
        let keys = collect_keys(
            &source_sheet,
            source_column,
            self.config.source_starting_row,
        );
        tracing::info!("Collected {} key values from the source workbook", keys.len());

        let rows = matching_rows(target, target_column, &keys);
        tracing::info!("Found {} rows to delete", rows.len());

        let removed = prune_rows(target, rows);
        Ok(TaskReport {
            rows_processed: removed,
            rows_failed: 0,
        })
    }
}

pub async fn run(source: &Path, target: &Path, config: &AppConfig) -> Result<TaskReport> {
    let task = WorkbookDiffTask::new(WorkbookStore::new(source), config.workbook_diff.clone());
    TaskEngine::new(WorkbookStore::new(target)).run(&task).await
}
