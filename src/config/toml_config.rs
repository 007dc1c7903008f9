use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::utils::error::{Result, TaskError};
use crate::utils::validation::{
    validate_column_letter, validate_positive_number, validate_url, Validate,
};

/// Everything that used to be hardcoded in the individual scripts:
/// endpoints, credentials, column letters, starting rows, sentinels.
/// Loaded from a TOML file with `${ENV_VAR}` substitution for secrets;
/// a missing file falls back to the built-in defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub panel: PanelConfig,
    pub gateway: GatewayConfig,
    pub storefront: StorefrontConfig,
    pub package_costs: PackageCostsConfig,
    pub product_params: ProductParamsConfig,
    pub workbook_diff: WorkbookDiffConfig,
    pub opinions: OpinionsConfig,
    pub ean_names: EanNamesConfig,
    pub gs1_results: Gs1ResultsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_seconds: u64,
    /// Fault string the panel uses for an unknown parcel number.
    pub not_found_message: String,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            base_url: "https://panel.example.pl".to_string(),
            api_key: String::new(),
            timeout_seconds: 20,
            not_found_message: "Nie odnaleziono paczki o podanym numerze".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub base_url: String,
    pub login: String,
    pub secret_key: String,
    pub timeout_seconds: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "https://shop.iai-shop.com".to_string(),
            login: String::new(),
            secret_key: String::new(),
            timeout_seconds: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorefrontConfig {
    pub base_url: String,
    pub language: String,
    pub shop_id: u32,
    pub page_count: usize,
    pub page_size: usize,
    pub timeout_seconds: u64,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            base_url: "https://sklep.example.pl".to_string(),
            language: "pol".to_string(),
            shop_id: 1,
            page_count: 10,
            page_size: 100,
            timeout_seconds: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageCostsConfig {
    /// Parcel number column letter in the DPD workbook.
    pub parcel_column: String,
    pub starting_row: usize,
    pub max_rows: usize,
    /// Parcel number header in the InPost CSV export.
    pub inpost_field: String,
    /// Parcel number header in the GLS CSV export.
    pub gls_field: String,
    /// Side log for parcels the panel does not know.
    pub not_found_log: String,
}

impl Default for PackageCostsConfig {
    fn default() -> Self {
        Self {
            parcel_column: "L".to_string(),
            starting_row: 2,
            max_rows: 1_000_000,
            inpost_field: "nr".to_string(),
            gls_field: "Nr paczki".to_string(),
            not_found_log: "package_not_found.log".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductParamsConfig {
    pub product_id_column: String,
    pub ean_column: String,
    pub code_column: String,
    pub insole_column: String,
    pub miniature_column: String,
    pub photo_columns: Vec<String>,
    pub starting_row: usize,
    pub max_rows: usize,
    pub photo_placeholder: String,
    /// Prefix for the auction icon path returned by the panel.
    pub media_base_url: String,
}

impl Default for ProductParamsConfig {
    fn default() -> Self {
        Self {
            product_id_column: "L".to_string(),
            ean_column: "AJ".to_string(),
            code_column: "AP".to_string(),
            insole_column: "AO".to_string(),
            miniature_column: "AK".to_string(),
            photo_columns: vec!["AL".to_string(), "AM".to_string(), "AN".to_string()],
            starting_row: 2,
            max_rows: 100,
            photo_placeholder: "BRAK ZDJĘCIA".to_string(),
            media_base_url: "https://sklep.example.pl".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkbookDiffConfig {
    pub source_key_column: String,
    pub target_key_column: String,
    pub source_starting_row: usize,
}

impl Default for WorkbookDiffConfig {
    fn default() -> Self {
        Self {
            source_key_column: "J".to_string(),
            target_key_column: "L".to_string(),
            source_starting_row: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpinionsConfig {
    /// Only opinions strictly after this date are exported.
    pub cutoff_date: String,
    pub product_file: String,
    pub order_file: String,
    pub unknown_product: String,
}

impl Default for OpinionsConfig {
    fn default() -> Self {
        Self {
            cutoff_date: "2023-01-01".to_string(),
            product_file: "products_opinions.csv".to_string(),
            order_file: "orders_opinions.csv".to_string(),
            unknown_product: "Unknown Product".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EanNamesConfig {
    pub sheet_name: Option<String>,
    pub gtin_column: String,
    pub product_name_column: String,
    pub starting_row: usize,
    /// Written when the gateway knows nothing about the barcode.
    pub default_name: String,
    pub static_values: Vec<StaticValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticValue {
    pub column: String,
    pub value: String,
}

impl Default for EanNamesConfig {
    fn default() -> Self {
        let static_value = |column: &str, value: &str| StaticValue {
            column: column.to_string(),
            value: value.to_string(),
        };
        Self {
            sheet_name: Some("MojeGS1".to_string()),
            gtin_column: "C".to_string(),
            product_name_column: "G".to_string(),
            starting_row: 3,
            default_name: "Obuwie".to_string(),
            static_values: vec![
                static_value(
                    "A",
                    "Produkt do sprzedaży detalicznej/online (GTIN-13, GTIN-12, GTIN-8)",
                ),
                static_value("D", "PL"),
                static_value("I", "1"),
                static_value("J", "kg"),
                static_value("O", "10001077"),
                static_value("Q", "Polska"),
                static_value("R", "Aktywny (w sprzedaży)"),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Gs1ResultsConfig {
    pub condition_column: String,
    pub extract_columns: Vec<String>,
    pub starting_row: usize,
    /// Rows whose condition cell equals one of these strings are extracted.
    pub conditions: Vec<String>,
}

impl Default for Gs1ResultsConfig {
    fn default() -> Self {
        Self {
            condition_column: "X".to_string(),
            extract_columns: vec!["B".to_string(), "F".to_string()],
            starting_row: 2,
            conditions: vec![
                "[Nazwa jednoznacznie opisująca produkt] Wyświetlana nazwa produktu występuje \
                 wielokrotnie dla różnych numerów GTIN w obrębie Uczestnika"
                    .to_string(),
                "Zawartość wiersza wielokrotnie powtarza się w pliku".to_string(),
            ],
        }
    }
}

impl AppConfig {
    /// Loads the configuration file, falling back to defaults when it is
    /// absent.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!(
                "Config file {} not found, using built-in defaults",
                path.display()
            );
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(TaskError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);
        toml::from_str(&processed).map_err(|e| TaskError::InvalidConfigValueError {
            field: "toml_parsing".to_string(),
            value: String::new(),
            reason: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR_NAME}` with the environment variable's value so
    /// API keys stay out of the file. Unset variables are left verbatim.
    fn substitute_env_vars(content: &str) -> String {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").expect("static pattern");
        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_url("panel.base_url", &self.panel.base_url)?;
        validate_url("gateway.base_url", &self.gateway.base_url)?;
        validate_url("storefront.base_url", &self.storefront.base_url)?;
        validate_url("product_params.media_base_url", &self.product_params.media_base_url)?;

        validate_positive_number("storefront.page_size", self.storefront.page_size, 1)?;
        validate_positive_number("package_costs.starting_row", self.package_costs.starting_row, 1)?;
        validate_positive_number("product_params.starting_row", self.product_params.starting_row, 1)?;
        validate_positive_number("ean_names.starting_row", self.ean_names.starting_row, 1)?;
        validate_positive_number("gs1_results.starting_row", self.gs1_results.starting_row, 1)?;
        validate_positive_number(
            "workbook_diff.source_starting_row",
            self.workbook_diff.source_starting_row,
            1,
        )?;

        validate_column_letter("package_costs.parcel_column", &self.package_costs.parcel_column)?;
        validate_column_letter(
            "product_params.product_id_column",
            &self.product_params.product_id_column,
        )?;
        validate_column_letter("product_params.ean_column", &self.product_params.ean_column)?;
        validate_column_letter("product_params.code_column", &self.product_params.code_column)?;
        validate_column_letter("product_params.insole_column", &self.product_params.insole_column)?;
        validate_column_letter(
            "product_params.miniature_column",
            &self.product_params.miniature_column,
        )?;
        for column in &self.product_params.photo_columns {
            validate_column_letter("product_params.photo_columns", column)?;
        }
        if self.product_params.photo_columns.len() != 3 {
            return Err(TaskError::InvalidConfigValueError {
                field: "product_params.photo_columns".to_string(),
                value: format!("{:?}", self.product_params.photo_columns),
                reason: "exactly three photo columns are expected".to_string(),
            });
        }
        validate_column_letter(
            "workbook_diff.source_key_column",
            &self.workbook_diff.source_key_column,
        )?;
        validate_column_letter(
            "workbook_diff.target_key_column",
            &self.workbook_diff.target_key_column,
        )?;
        validate_column_letter("ean_names.gtin_column", &self.ean_names.gtin_column)?;
        validate_column_letter(
            "ean_names.product_name_column",
            &self.ean_names.product_name_column,
        )?;
        for static_value in &self.ean_names.static_values {
            validate_column_letter("ean_names.static_values", &static_value.column)?;
        }
        validate_column_letter("gs1_results.condition_column", &self.gs1_results.condition_column)?;
        for column in &self.gs1_results.extract_columns {
            validate_column_letter("gs1_results.extract_columns", column)?;
        }

        chrono::NaiveDate::parse_from_str(&self.opinions.cutoff_date, "%Y-%m-%d").map_err(|e| {
            TaskError::InvalidConfigValueError {
                field: "opinions.cutoff_date".to_string(),
                value: self.opinions.cutoff_date.clone(),
                reason: format!("expected YYYY-MM-DD: {}", e),
            }
        })?;

        Ok(())
    }
}
