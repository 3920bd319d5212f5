use crate::core::{
    DeleteResult, GetResult, Item, ItemStore, Key, KeyCondition, PutResult, QueryResult,
};
use crate::utils::error::Result;
use std::sync::Arc;

/// Storage operations against a caller-named table.
///
/// No retries and no pagination: a query returns the first page the
/// service hands back.
#[derive(Clone)]
pub struct StorageGateway {
    store: Arc<dyn ItemStore>,
}

impl StorageGateway {
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self { store }
    }

    /// Unconditional upsert.
    pub async fn put(&self, table_name: String, item: Item) -> Result<PutResult> {
        self.store.put_item(&table_name, &item).await?;
        tracing::debug!(table = %table_name, "Item written");
        Ok(PutResult { table_name, item })
    }

    pub async fn get(&self, table_name: String, key: Key) -> Result<GetResult> {
        let item = self.store.get_item(&table_name, &key).await?;
        tracing::debug!(table = %table_name, found = item.is_some(), "Item lookup finished");
        Ok(GetResult { table_name, item })
    }

    pub async fn query(&self, table_name: String, condition: KeyCondition) -> Result<QueryResult> {
        let page = self.store.query_items(&table_name, &condition).await?;
        let count = page.count.unwrap_or(page.items.len());
        tracing::debug!(table = %table_name, count, "Query finished");
        Ok(QueryResult {
            table_name,
            items: page.items,
            count,
        })
    }

    /// Idempotent: no existence check is made.
    pub async fn delete(&self, table_name: String, key: Key) -> Result<DeleteResult> {
        self.store.delete_item(&table_name, &key).await?;
        tracing::debug!(table = %table_name, "Item deleted");
        Ok(DeleteResult {
            table_name,
            key,
            deleted: true,
        })
    }
}
