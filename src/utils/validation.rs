use crate::utils::error::{Result, ShopperError};
use std::path::Path;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(ShopperError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ShopperError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ShopperError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(ShopperError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

/// Checks the extension case-insensitively against `allowed_extensions`.
pub fn validate_file_extension(
    field_name: &str,
    file: &Path,
    allowed_extensions: &[&str],
) -> Result<()> {
    let extension = file
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension {
        Some(ext) if allowed_extensions.contains(&ext.as_str()) => Ok(()),
        Some(ext) => Err(ShopperError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.display().to_string(),
            reason: format!(
                "Unsupported file extension: {}. Allowed extensions: {}",
                ext,
                allowed_extensions.join(", ")
            ),
        }),
        None => Err(ShopperError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.display().to_string(),
            reason: "File has no extension or invalid filename".to_string(),
        }),
    }
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| ShopperError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ShopperError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(ShopperError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("openai.base_url", "https://api.openai.com/v1").is_ok());
        assert!(validate_url("openai.base_url", "http://127.0.0.1:8080").is_ok());
        assert!(validate_url("openai.base_url", "").is_err());
        assert!(validate_url("openai.base_url", "invalid-url").is_err());
        assert!(validate_url("openai.base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("search.max_tokens", 250, 1).is_ok());
        assert!(validate_positive_number("search.max_tokens", 0, 1).is_err());
    }

    #[test]
    fn test_validate_file_extension() {
        let allowed = ["xlsx", "csv"];
        assert!(validate_file_extension("financials", Path::new("bank.xlsx"), &allowed).is_ok());
        assert!(validate_file_extension("financials", Path::new("BANK.XLSX"), &allowed).is_ok());
        assert!(validate_file_extension("financials", Path::new("bank.txt"), &allowed).is_err());
        assert!(validate_file_extension("financials", Path::new("bank"), &allowed).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("search.temperature", 0.7, 0.0, 2.0).is_ok());
        assert!(validate_range("search.temperature", 2.5, 0.0, 2.0).is_err());
    }

    #[test]
    fn test_validate_required_field() {
        let key: Option<String> = None;
        assert!(matches!(
            validate_required_field("openai.api_key", &key),
            Err(ShopperError::MissingConfigError { .. })
        ));
    }
}
