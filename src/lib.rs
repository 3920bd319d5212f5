pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{DynamoStore, KeySchema, MemoryStore, TableDefinition};
pub use app::{build_router, AppState};
pub use config::{ServerConfig, StorageBackend};

#[cfg(feature = "lambda")]
pub use config::lambda::LambdaConfig;

pub use core::{dispatcher::EventDispatcher, gateway::StorageGateway};
pub use utils::error::{GatewayError, Result};
