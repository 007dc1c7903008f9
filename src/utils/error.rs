use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaskError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Workbook read error: {0}")]
    WorkbookReadError(#[from] calamine::Error),

    #[error("Workbook write error: {0}")]
    WorkbookWriteError(#[from] rust_xlsxwriter::XlsxError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for {field}: {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Config,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl TaskError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            TaskError::ApiError(_) => ErrorCategory::Network,
            TaskError::CsvError(_)
            | TaskError::SerializationError(_)
            | TaskError::WorkbookReadError(_)
            | TaskError::WorkbookWriteError(_)
            | TaskError::ProcessingError { .. } => ErrorCategory::Data,
            TaskError::ConfigError { .. }
            | TaskError::InvalidConfigValueError { .. }
            | TaskError::ValidationError { .. } => ErrorCategory::Config,
            TaskError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TaskError::ApiError(_) => ErrorSeverity::Medium,
            TaskError::CsvError(_)
            | TaskError::SerializationError(_)
            | TaskError::WorkbookReadError(_)
            | TaskError::WorkbookWriteError(_)
            | TaskError::ProcessingError { .. } => ErrorSeverity::High,
            TaskError::ConfigError { .. }
            | TaskError::InvalidConfigValueError { .. }
            | TaskError::ValidationError { .. } => ErrorSeverity::Medium,
            TaskError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            TaskError::ApiError(_) => {
                "Check network connectivity, the endpoint URL and the API key".to_string()
            }
            TaskError::CsvError(_) => {
                "Check the delimited file for a header line and a consistent delimiter".to_string()
            }
            TaskError::IoError(_) => {
                "Check that the file exists and is not open in another program".to_string()
            }
            TaskError::SerializationError(_) => {
                "The API returned an unexpected payload; inspect the response body".to_string()
            }
            TaskError::WorkbookReadError(_) => {
                "Check that the workbook is a valid Excel file".to_string()
            }
            TaskError::WorkbookWriteError(_) => {
                "Check that the output path is writable".to_string()
            }
            TaskError::ConfigError { .. }
            | TaskError::InvalidConfigValueError { .. }
            | TaskError::ValidationError { .. } => {
                "Review the configuration file and command-line arguments".to_string()
            }
            TaskError::ProcessingError { .. } => {
                "Inspect the input rows around the reported position".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            TaskError::ApiError(e) => format!("The remote service could not be reached: {}", e),
            TaskError::IoError(e) => format!("A file could not be read or written: {}", e),
            other => other.to_string(),
        }
    }

    pub fn processing(message: impl Into<String>) -> Self {
        TaskError::ProcessingError {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        TaskError::ConfigError {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TaskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_are_critical_system_errors() {
        let err = TaskError::IoError(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.category(), ErrorCategory::System);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn config_errors_carry_field_context() {
        let err = TaskError::InvalidConfigValueError {
            field: "package_costs.parcel_column".to_string(),
            value: "1L".to_string(),
            reason: "not a column letter".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Config);
        assert!(err.to_string().contains("package_costs.parcel_column"));
    }
}
