#[cfg(feature = "lambda")]
use crate::core::ConfigProvider;
#[cfg(feature = "lambda")]
use crate::utils::error::Result;
#[cfg(feature = "lambda")]
use std::env;

#[cfg(feature = "lambda")]
#[derive(Debug, Clone)]
pub struct LambdaConfig {
    pub aws_region: String,
    pub dynamodb_endpoint: Option<String>,
}

#[cfg(feature = "lambda")]
impl LambdaConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            aws_region: env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            dynamodb_endpoint: env::var("DYNAMODB_ENDPOINT")
                .ok()
                .filter(|v| !v.trim().is_empty()),
        })
    }
}

#[cfg(feature = "lambda")]
impl ConfigProvider for LambdaConfig {
    fn aws_region(&self) -> &str {
        &self.aws_region
    }

    fn dynamodb_endpoint(&self) -> Option<&str> {
        self.dynamodb_endpoint.as_deref()
    }
}

#[cfg(feature = "lambda")]
impl crate::utils::validation::Validate for LambdaConfig {
    fn validate(&self) -> crate::utils::error::Result<()> {
        use crate::utils::validation::*;

        // 驗證區域
        validate_aws_region("aws_region", &self.aws_region)?;

        // 驗證端點
        if let Some(endpoint) = &self.dynamodb_endpoint {
            validate_url("dynamodb_endpoint", endpoint)?;
        }

        tracing::info!("✅ Lambda configuration validation passed");
        Ok(())
    }
}
