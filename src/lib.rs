pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::config::{AppConfig, Cli, Command};
pub use crate::core::engine::TaskEngine;
pub use crate::domain::model::{CellValue, Sheet, TaskReport};
pub use crate::utils::error::{Result, TaskError};
