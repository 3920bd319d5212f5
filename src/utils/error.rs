use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Unknown action: {action}")]
    UnknownActionError { action: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Storage error: {message}")]
    StorageError { message: String },

    #[error("Envelope parse error: {message}")]
    EnvelopeParseError { message: String },

    #[error("Failed to confirm subscription at {url}: {message}")]
    ConfirmationFetchError { url: String, message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl GatewayError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::StorageError {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    /// Short variant name, used as the `kind` field in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnknownActionError { .. } => "unknown_action",
            Self::ValidationError { .. } => "validation",
            Self::StorageError { .. } => "storage",
            Self::EnvelopeParseError { .. } => "envelope_parse",
            Self::ConfirmationFetchError { .. } => "confirmation_fetch",
            Self::ConfigError { .. } | Self::InvalidConfigValueError { .. } => "config",
            Self::IoError(_) => "io",
            Self::SerializationError(_) => "serialization",
        }
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
