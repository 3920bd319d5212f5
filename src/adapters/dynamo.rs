//! DynamoDB-backed [`ItemStore`].

use crate::core::{ConfigProvider, Item, ItemStore, Key, KeyCondition, QueryPage};
use crate::utils::error::{GatewayError, Result};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use std::collections::HashMap;

type AttributeMap = HashMap<String, AttributeValue>;

#[derive(Debug, Clone)]
pub struct DynamoStore {
    client: Client,
}

impl DynamoStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds the process-wide client from region and optional endpoint.
    pub async fn from_config<C: ConfigProvider>(config: &C) -> Self {
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.aws_region().to_string()))
            .load()
            .await;

        let mut builder = aws_sdk_dynamodb::config::Builder::from(&shared);
        if let Some(endpoint) = config.dynamodb_endpoint() {
            builder = builder.endpoint_url(endpoint);
        }

        tracing::info!(
            region = %config.aws_region(),
            endpoint = config.dynamodb_endpoint().unwrap_or("default"),
            "DynamoDB client configured"
        );
        Self::new(Client::from_conf(builder.build()))
    }
}

pub fn to_attribute_map(item: &Item) -> Result<AttributeMap> {
    serde_dynamo::to_item(item)
        .map_err(|e| GatewayError::storage(format!("failed to marshal item: {}", e)))
}

pub fn from_attribute_map(attributes: AttributeMap) -> Result<Item> {
    serde_dynamo::from_item(attributes)
        .map_err(|e| GatewayError::storage(format!("failed to unmarshal item: {}", e)))
}

fn storage_failure<E: std::error::Error>(operation: &str, table: &str, err: E) -> GatewayError {
    GatewayError::storage(format!(
        "{} on table '{}' failed: {}",
        operation,
        table,
        DisplayErrorContext(err)
    ))
}

#[async_trait]
impl ItemStore for DynamoStore {
    async fn put_item(&self, table: &str, item: &Item) -> Result<()> {
        self.client
            .put_item()
            .table_name(table)
            .set_item(Some(to_attribute_map(item)?))
            .send()
            .await
            .map_err(|e| storage_failure("PutItem", table, e))?;
        Ok(())
    }

    async fn get_item(&self, table: &str, key: &Key) -> Result<Option<Item>> {
        let output = self
            .client
            .get_item()
            .table_name(table)
            .set_key(Some(to_attribute_map(key)?))
            .send()
            .await
            .map_err(|e| storage_failure("GetItem", table, e))?;

        output.item.map(from_attribute_map).transpose()
    }

    async fn query_items(&self, table: &str, condition: &KeyCondition) -> Result<QueryPage> {
        // DynamoDB rejects an empty ExpressionAttributeValues map
        let values = if condition.values.is_empty() {
            None
        } else {
            Some(to_attribute_map(&condition.values)?)
        };

        let output = self
            .client
            .query()
            .table_name(table)
            .key_condition_expression(&condition.expression)
            .set_expression_attribute_values(values)
            .send()
            .await
            .map_err(|e| storage_failure("Query", table, e))?;

        if output.last_evaluated_key.is_some() {
            tracing::warn!(table = %table, "Query result truncated; only the first page is returned");
        }

        let items = output
            .items
            .unwrap_or_default()
            .into_iter()
            .map(from_attribute_map)
            .collect::<Result<Vec<_>>>()?;

        Ok(QueryPage {
            items,
            count: usize::try_from(output.count).ok(),
        })
    }

    async fn delete_item(&self, table: &str, key: &Key) -> Result<()> {
        self.client
            .delete_item()
            .table_name(table)
            .set_key(Some(to_attribute_map(key)?))
            .send()
            .await
            .map_err(|e| storage_failure("DeleteItem", table, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(value: serde_json::Value) -> Item {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_marshal_uses_typed_attributes() {
        let attributes = to_attribute_map(&item(json!({
            "id": "1",
            "v": 5,
            "active": true,
            "tags": ["a", "b"],
            "meta": {"source": "sns"}
        })))
        .unwrap();

        assert_eq!(attributes.get("id"), Some(&AttributeValue::S("1".to_string())));
        assert_eq!(attributes.get("v"), Some(&AttributeValue::N("5".to_string())));
        assert_eq!(attributes.get("active"), Some(&AttributeValue::Bool(true)));
        assert!(matches!(attributes.get("tags"), Some(AttributeValue::L(list)) if list.len() == 2));
        assert!(matches!(attributes.get("meta"), Some(AttributeValue::M(_))));
    }

    #[test]
    fn test_unmarshal_restores_json_values() {
        let mut attributes = AttributeMap::new();
        attributes.insert("id".to_string(), AttributeValue::S("1".to_string()));
        attributes.insert("v".to_string(), AttributeValue::N("5".to_string()));

        let restored = from_attribute_map(attributes).unwrap();
        assert_eq!(restored, item(json!({"id": "1", "v": 5})));
    }
}
