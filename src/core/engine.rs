use crate::domain::model::TaskReport;
use crate::domain::ports::{SheetTask, TableStore};
use crate::utils::error::Result;

/// Drives one task over one row store. The engine owns persistence:
/// a successful run saves the mutated sheet; a failed run still attempts
/// a save before the error propagates, so partial progress survives.
pub struct TaskEngine<S: TableStore> {
    store: S,
}

impl<S: TableStore> TaskEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn run(&self, task: &dyn SheetTask) -> Result<TaskReport> {
        tracing::info!("Starting task '{}' on {}", task.name(), self.store.describe());
        let mut sheet = self.store.load()?;
        tracing::info!("Loaded {} rows", sheet.row_count());

        match task.process(&mut sheet).await {
            Ok(report) => {
                self.store.save(&sheet)?;
                tracing::info!(
                    "Task '{}' finished: {} rows processed, {} failed; saved {}",
                    task.name(),
                    report.rows_processed,
                    report.rows_failed,
                    self.store.describe()
                );
                Ok(report)
            }
            Err(e) => {
                tracing::error!(
                    "Task '{}' failed, saving progress and stopping: {}",
                    task.name(),
                    e
                );
                match self.store.save(&sheet) {
                    Ok(()) => tracing::info!("Progress saved to {}", self.store.describe()),
                    Err(save_err) => {
                        tracing::error!("Could not save progress: {}", save_err)
                    }
                }
                Err(e)
            }
        }
    }
}
