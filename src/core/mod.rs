pub mod dispatcher;
pub mod gateway;

pub use crate::domain::model::{
    DeleteResult, Event, GetResult, Item, Key, KeyCondition, Outcome, PutResult, QueryPage,
    QueryResult,
};
pub use crate::domain::ports::{ConfigProvider, ItemStore};
pub use crate::utils::error::Result;
pub use dispatcher::EventDispatcher;
pub use gateway::StorageGateway;
