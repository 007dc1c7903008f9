use clap::Parser;

use backoffice_etl::app::tasks::{
    ean_names, gs1_results, opinions, package_costs, product_params, workbook_diff,
};
use backoffice_etl::utils::error::ErrorSeverity;
use backoffice_etl::utils::{logger, validation::Validate};
use backoffice_etl::{AppConfig, Cli, Command};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting backoffice-etl");
    if cli.verbose {
        tracing::debug!("CLI arguments: {:?}", cli);
    }

    let config = match AppConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Could not load configuration: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let result = match &cli.command {
        Command::PackageCosts { file, courier } => {
            package_costs::run(file, *courier, &config).await
        }
        Command::ProductParams { file } => product_params::run(file, &config).await,
        Command::WorkbookDiff { source, target } => {
            workbook_diff::run(source, target, &config).await
        }
        Command::Opinions { kind, output_dir } => {
            opinions::run(*kind, output_dir, &config).await
        }
        Command::EanNames { folder } => ean_names::run(folder, &config).await,
        Command::Gs1Results { folder, output } => gs1_results::run(folder, output, &config),
    };

    match result {
        Ok(report) => {
            tracing::info!("✅ Task completed successfully!");
            println!("✅ Task completed successfully!");
            println!(
                "📊 Rows processed: {}, failed: {}",
                report.rows_processed, report.rows_failed
            );
        }
        Err(e) => {
            tracing::error!(
                "❌ Task failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
