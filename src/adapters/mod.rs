// Adapters layer: concrete ItemStore implementations for the storage service.

pub mod dynamo;
pub mod memory;

pub use dynamo::DynamoStore;
pub use memory::{KeySchema, MemoryStore, TableDefinition};
