//! In-process [`ItemStore`] with declared key schemas.
//!
//! Mirrors the key rules DynamoDB enforces so callers see the same
//! failures: unknown table, keys that do not match the schema, and
//! key conditions that miss the partition key.

pub mod condition;

use crate::core::{Item, ItemStore, Key, KeyCondition, QueryPage};
use crate::utils::error::{GatewayError, Result};
use async_trait::async_trait;
use condition::{compare_scalars, Comparator, KeyConditionExpr, Predicate};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySchema {
    pub partition_key: String,
    pub sort_key: Option<String>,
}

impl KeySchema {
    pub fn new(partition_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            sort_key: None,
        }
    }

    pub fn with_sort_key(mut self, sort_key: impl Into<String>) -> Self {
        self.sort_key = Some(sort_key.into());
        self
    }

    fn attributes(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.partition_key.as_str()).chain(self.sort_key.as_deref())
    }
}

/// `NAME:PARTITION_KEY[:SORT_KEY]`, as accepted by `--table`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDefinition {
    pub name: String,
    pub schema: KeySchema,
}

impl FromStr for TableDefinition {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(':').map(str::trim).collect();
        let invalid = |reason: &str| GatewayError::InvalidConfigValueError {
            field: "table".to_string(),
            value: s.to_string(),
            reason: reason.to_string(),
        };

        if parts.iter().any(|p| p.is_empty()) {
            return Err(invalid("table name and key attributes cannot be empty"));
        }

        match parts.as_slice() {
            [name, pk] => Ok(Self {
                name: name.to_string(),
                schema: KeySchema::new(*pk),
            }),
            [name, pk, sk] => Ok(Self {
                name: name.to_string(),
                schema: KeySchema::new(*pk).with_sort_key(*sk),
            }),
            _ => Err(invalid("expected NAME:PARTITION_KEY[:SORT_KEY]")),
        }
    }
}

#[derive(Debug)]
struct MemoryTable {
    schema: KeySchema,
    items: Vec<Item>,
}

impl MemoryTable {
    fn position(&self, key: &[Value]) -> Option<usize> {
        self.items.iter().position(|item| {
            self.schema
                .attributes()
                .zip(key)
                .all(|(attr, value)| item.get(attr) == Some(value))
        })
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, MemoryTable>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(self, name: impl Into<String>, schema: KeySchema) -> Self {
        self.create_table(TableDefinition {
            name: name.into(),
            schema,
        });
        self
    }

    pub fn from_definitions(definitions: impl IntoIterator<Item = TableDefinition>) -> Self {
        let store = Self::new();
        for definition in definitions {
            store.create_table(definition);
        }
        store
    }

    /// Creates an empty table, replacing any existing one with that name.
    pub fn create_table(&self, definition: TableDefinition) {
        let mut tables = self.tables.write().unwrap_or_else(|e| e.into_inner());
        tracing::debug!(table = %definition.name, schema = ?definition.schema, "Memory table created");
        tables.insert(
            definition.name,
            MemoryTable {
                schema: definition.schema,
                items: Vec::new(),
            },
        );
    }

    fn read<T>(&self, table: &str, f: impl FnOnce(&MemoryTable) -> Result<T>) -> Result<T> {
        let tables = self
            .tables
            .read()
            .map_err(|_| GatewayError::storage("memory store lock poisoned"))?;
        f(tables.get(table).ok_or_else(|| table_not_found(table))?)
    }

    fn write<T>(&self, table: &str, f: impl FnOnce(&mut MemoryTable) -> Result<T>) -> Result<T> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| GatewayError::storage("memory store lock poisoned"))?;
        f(tables.get_mut(table).ok_or_else(|| table_not_found(table))?)
    }
}

fn table_not_found(table: &str) -> GatewayError {
    GatewayError::storage(format!(
        "ResourceNotFoundException: Requested resource not found: Table: {} not found",
        table
    ))
}

fn schema_mismatch() -> GatewayError {
    GatewayError::storage(
        "ValidationException: The provided key element does not match the schema",
    )
}

/// Extracts key values in schema order. With `exact`, `attrs` must hold
/// nothing but the key attributes (a `Key`, as opposed to a full item).
fn key_values(schema: &KeySchema, attrs: &Item, exact: bool) -> Result<Vec<Value>> {
    let values = schema
        .attributes()
        .map(|attr| match attrs.get(attr) {
            Some(v @ (Value::String(_) | Value::Number(_))) => Ok(v.clone()),
            Some(_) => Err(schema_mismatch()),
            None if exact => Err(schema_mismatch()),
            None => Err(GatewayError::storage(format!(
                "ValidationException: One or more parameter values were invalid: Missing the key {} in the item",
                attr
            ))),
        })
        .collect::<Result<Vec<_>>>()?;

    if exact && attrs.len() != values.len() {
        return Err(schema_mismatch());
    }
    Ok(values)
}

fn check_condition(schema: &KeySchema, expr: &KeyConditionExpr) -> Result<()> {
    let on_partition = |clause: &condition::Clause| {
        clause.attribute == schema.partition_key
            && matches!(clause.predicate, Predicate::Compare(Comparator::Eq, _))
    };

    if !expr.clauses.iter().any(on_partition) {
        return Err(GatewayError::storage(format!(
            "ValidationException: Query condition missed key schema element: {}",
            schema.partition_key
        )));
    }

    for clause in expr.clauses.iter().filter(|c| !on_partition(*c)) {
        if schema.sort_key.as_deref() != Some(clause.attribute.as_str()) {
            return Err(GatewayError::storage(format!(
                "ValidationException: Query key condition not supported on attribute: {}",
                clause.attribute
            )));
        }
    }
    Ok(())
}

#[async_trait]
impl ItemStore for MemoryStore {
    async fn put_item(&self, table: &str, item: &Item) -> Result<()> {
        self.write(table, |t| {
            let key = key_values(&t.schema, item, false)?;
            match t.position(&key) {
                Some(index) => t.items[index] = item.clone(),
                None => t.items.push(item.clone()),
            }
            Ok(())
        })
    }

    async fn get_item(&self, table: &str, key: &Key) -> Result<Option<Item>> {
        self.read(table, |t| {
            let key = key_values(&t.schema, key, true)?;
            Ok(t.position(&key).map(|index| t.items[index].clone()))
        })
    }

    async fn query_items(&self, table: &str, condition: &KeyCondition) -> Result<QueryPage> {
        self.read(table, |t| {
            let expr = KeyConditionExpr::parse(&condition.expression, &condition.values)?;
            check_condition(&t.schema, &expr)?;

            let mut items: Vec<Item> = t
                .items
                .iter()
                .filter(|item| expr.matches(item))
                .cloned()
                .collect();

            if let Some(sort_key) = &t.schema.sort_key {
                items.sort_by(|a, b| match (a.get(sort_key), b.get(sort_key)) {
                    (Some(a), Some(b)) => compare_scalars(a, b).unwrap_or(Ordering::Equal),
                    _ => Ordering::Equal,
                });
            }

            Ok(QueryPage {
                count: Some(items.len()),
                items,
            })
        })
    }

    async fn delete_item(&self, table: &str, key: &Key) -> Result<()> {
        self.write(table, |t| {
            let key = key_values(&t.schema, key, true)?;
            if let Some(index) = t.position(&key) {
                t.items.remove(index);
            }
            Ok(())
        })
    }
}
