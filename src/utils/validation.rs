use crate::utils::error::{Result, TaskError};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field: &str, value: &str) -> Result<()> {
    url::Url::parse(value).map_err(|e| TaskError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: format!("not a valid URL: {}", e),
    })?;
    Ok(())
}

pub fn validate_positive_number(field: &str, value: usize, min: usize) -> Result<()> {
    if value < min {
        return Err(TaskError::InvalidConfigValueError {
            field: field.to_string(),
            value: value.to_string(),
            reason: format!("must be at least {}", min),
        });
    }
    Ok(())
}

/// Column letters are configuration; reject anything that is not A..XFD style.
pub fn validate_column_letter(field: &str, value: &str) -> Result<()> {
    if crate::domain::model::column_index(value).is_none() {
        return Err(TaskError::InvalidConfigValueError {
            field: field.to_string(),
            value: value.to_string(),
            reason: "not a spreadsheet column letter".to_string(),
        });
    }
    Ok(())
}
