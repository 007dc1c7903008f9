pub mod diff;
pub mod engine;
pub mod enrich;

pub use crate::domain::model::{CellValue, Sheet, TaskReport};
pub use crate::domain::ports::{RowEnricher, SheetTask, TableStore};
pub use crate::utils::error::Result;
