pub mod lambda;

use crate::adapters::TableDefinition;
use crate::core::ConfigProvider;
use crate::utils::error::{GatewayError, Result};
use crate::utils::validation::{validate_aws_region, validate_range, validate_url, Validate};
use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackend {
    /// Amazon DynamoDB (or a local DynamoDB endpoint)
    Dynamo,
    /// In-process tables, lost on exit
    Memory,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "table-webhook")]
#[command(about = "Webhook facade that turns HTTP and SNS events into DynamoDB operations")]
pub struct ServerConfig {
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    #[arg(long, env = "BIND_ADDRESS", default_value = "0.0.0.0")]
    pub bind: String,

    #[arg(long, env = "AWS_REGION", default_value = "us-east-1")]
    pub aws_region: String,

    #[arg(long, env = "DYNAMODB_ENDPOINT", help = "Override the DynamoDB endpoint (e.g. DynamoDB Local)")]
    pub dynamodb_endpoint: Option<String>,

    #[arg(long, env = "STORAGE_BACKEND", value_enum, default_value_t = StorageBackend::Dynamo)]
    pub backend: StorageBackend,

    #[arg(
        long = "table",
        env = "MEMORY_TABLES",
        value_delimiter = ',',
        help = "Memory backend table as NAME:PARTITION_KEY[:SORT_KEY]"
    )]
    pub tables: Vec<TableDefinition>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, env = "LOG_JSON", help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

impl ServerConfig {
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

impl ConfigProvider for ServerConfig {
    fn aws_region(&self) -> &str {
        &self.aws_region
    }

    fn dynamodb_endpoint(&self) -> Option<&str> {
        self.dynamodb_endpoint.as_deref()
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<()> {
        validate_range("port", self.port, 1, u16::MAX)?;
        validate_aws_region("aws_region", &self.aws_region)?;

        if let Some(endpoint) = &self.dynamodb_endpoint {
            validate_url("dynamodb_endpoint", endpoint)?;
        }

        if self.backend == StorageBackend::Memory && self.tables.is_empty() {
            return Err(GatewayError::ConfigError {
                message: "memory backend needs at least one --table NAME:PARTITION_KEY[:SORT_KEY]"
                    .to_string(),
            });
        }

        tracing::debug!("✅ Server configuration validation passed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let config = ServerConfig::try_parse_from(["table-webhook", "--aws-region", "eu-west-1"]).unwrap();
        assert_eq!(config.aws_region, "eu-west-1");
        assert_eq!(config.backend, StorageBackend::Dynamo);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_memory_tables() {
        let config = ServerConfig::try_parse_from([
            "table-webhook",
            "--port",
            "8080",
            "--backend",
            "memory",
            "--table",
            "Users:id",
            "--table",
            "Orders:customerId:orderId",
        ])
        .unwrap();

        assert_eq!(config.listen_address(), "0.0.0.0:8080");
        assert_eq!(config.tables.len(), 2);
        assert_eq!(config.tables[1].schema.sort_key.as_deref(), Some("orderId"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_memory_backend_requires_tables() {
        let config =
            ServerConfig::try_parse_from(["table-webhook", "--backend", "memory"]).unwrap();
        assert!(matches!(config.validate(), Err(GatewayError::ConfigError { .. })));
    }

    #[test]
    fn test_rejects_bad_endpoint_and_table() {
        let config = ServerConfig::try_parse_from([
            "table-webhook",
            "--dynamodb-endpoint",
            "localhost:8000",
        ])
        .unwrap();
        assert!(config.validate().is_err());

        assert!(ServerConfig::try_parse_from(["table-webhook", "--table", "Users"]).is_err());
    }
}
