use crate::utils::error::{GatewayError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(GatewayError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(GatewayError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(GatewayError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(GatewayError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_aws_region(field_name: &str, region: &str) -> Result<()> {
    validate_non_empty_string(field_name, region)?;

    // AWS region format validation
    if !region
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(GatewayError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: region.to_string(),
            reason: "AWS region can only contain lowercase letters, numbers, and hyphens"
                .to_string(),
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
        return Err(GatewayError::InvalidConfigValueError {
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
        assert!(validate_url("dynamodb_endpoint", "https://example.com").is_ok());
        assert!(validate_url("dynamodb_endpoint", "http://localhost:8000").is_ok());
        assert!(validate_url("dynamodb_endpoint", "").is_err());
        assert!(validate_url("dynamodb_endpoint", "invalid-url").is_err());
        assert!(validate_url("dynamodb_endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_aws_region() {
        assert!(validate_aws_region("aws_region", "us-east-1").is_ok());
        assert!(validate_aws_region("aws_region", "").is_err());
        assert!(validate_aws_region("aws_region", "US_EAST_1").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("port", 3000u16, 1, u16::MAX).is_ok());
        assert!(validate_range("port", 0u16, 1, u16::MAX).is_err());
    }
}
