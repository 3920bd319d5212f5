use crate::domain::model::{Item, Key, KeyCondition, QueryPage};
use crate::utils::error::Result;
use async_trait::async_trait;

/// The external keyed-storage service.
///
/// Implementations translate between [`Item`] and the service's wire
/// encoding. Keys and conditions are forwarded as given; rejecting a
/// malformed one is the service's job.
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn put_item(&self, table: &str, item: &Item) -> Result<()>;
    async fn get_item(&self, table: &str, key: &Key) -> Result<Option<Item>>;
    async fn query_items(&self, table: &str, condition: &KeyCondition) -> Result<QueryPage>;
    async fn delete_item(&self, table: &str, key: &Key) -> Result<()>;
}

pub trait ConfigProvider: Send + Sync {
    fn aws_region(&self) -> &str;
    fn dynamodb_endpoint(&self) -> Option<&str>;
}
