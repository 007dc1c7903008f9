pub mod toml_config;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::app::tasks::package_costs::CourierKind;
use crate::domain::model::OpinionKind;

pub use toml_config::AppConfig;

#[derive(Debug, Parser)]
#[command(name = "backoffice-etl")]
#[command(about = "Back-office automation tasks for the shop", version)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "backoffice.toml")]
    pub config: PathBuf,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Enrich a shipment workbook or courier CSV with shipping costs
    /// looked up per parcel number.
    PackageCosts {
        /// Excel (.xlsx) or CSV file with parcel numbers.
        #[arg(short, long)]
        file: PathBuf,
        /// Courier the file came from.
        #[arg(short, long, value_enum)]
        courier: CourierKind,
    },
    /// Fill product parameter columns (EAN, code, insole length,
    /// miniature, photos) for every product ID in a workbook.
    ProductParams {
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Delete from the target workbook every row whose key appears in
    /// the source workbook.
    WorkbookDiff {
        #[arg(long)]
        source: PathBuf,
        #[arg(long)]
        target: PathBuf,
    },
    /// Scrape the storefront opinions feed into a CSV file.
    Opinions {
        /// Which opinions to fetch.
        #[arg(value_enum)]
        kind: OpinionKind,
        /// Directory the CSV files are appended into.
        #[arg(long, default_value = "csv")]
        output_dir: PathBuf,
    },
    /// Resolve product names per EAN for every workbook in a folder.
    EanNames {
        #[arg(short, long)]
        folder: PathBuf,
    },
    /// Extract rejected GS1 rows from a folder of workbooks into one
    /// output workbook.
    Gs1Results {
        #[arg(short, long)]
        folder: PathBuf,
        #[arg(short, long, default_value = "output.xlsx")]
        output: PathBuf,
    },
}
