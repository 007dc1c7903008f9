use crate::domain::model::{CellValue, Sheet, TaskReport};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Row source and writer for one file. Implementations overwrite the
/// backing file on save; there is no transactional guarantee.
pub trait TableStore: Send + Sync {
    fn load(&self) -> Result<Sheet>;
    fn save(&self, sheet: &Sheet) -> Result<()>;
    fn describe(&self) -> String;
}

/// A batch task over one in-memory sheet. The engine owns persistence,
/// including the best-effort save when `process` fails mid-run.
#[async_trait]
pub trait SheetTask: Send + Sync {
    fn name(&self) -> &str;
    async fn process(&self, sheet: &mut Sheet) -> Result<TaskReport>;
}

/// Per-row external lookup. One attempt per key, no retry. Returns the
/// cell values for the task's output columns, or `None` when the lookup
/// produced nothing and the row must stay untouched. Failures are
/// resolved to sentinel cells inside the implementation; they never
/// abort the batch.
#[async_trait]
pub trait RowEnricher: Send + Sync {
    async fn enrich(&self, key: &str) -> Option<Vec<CellValue>>;
}
