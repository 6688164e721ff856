use crate::utils::error::{HarvestError, Result};
use std::path::Path;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &Path) -> Result<()> {
    let path_str = path.to_string_lossy();

    if path_str.is_empty() {
        return Err(HarvestError::InvalidConfigValue {
            field: field_name.to_string(),
            value: path_str.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path_str.contains('\0') {
        return Err(HarvestError::InvalidConfigValue {
            field: field_name.to_string(),
            value: path_str.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_directory(field_name: &str, path: &Path) -> Result<()> {
    validate_path(field_name, path)?;

    if !path.is_dir() {
        return Err(HarvestError::InvalidConfigValue {
            field: field_name.to_string(),
            value: path.display().to_string(),
            reason: "Directory does not exist".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(HarvestError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(HarvestError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}
