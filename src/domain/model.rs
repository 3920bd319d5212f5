use crate::utils::error::{GatewayError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A schema-less item: attribute name to JSON value.
pub type Item = Map<String, Value>;

/// Primary key attributes of an item (partition key, optionally sort key).
pub type Key = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyCondition {
    pub expression: String,
    #[serde(default)]
    pub values: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutRequest {
    pub table_name: String,
    pub item: Item,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetRequest {
    pub table_name: String,
    pub key: Key,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    pub table_name: String,
    pub key_condition: KeyCondition,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRequest {
    pub table_name: String,
    pub key: Key,
}

/// A decoded `{action, payload}` envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Put(PutRequest),
    Get(GetRequest),
    Query(QueryRequest),
    Delete(DeleteRequest),
}

impl Event {
    /// Decodes an envelope, checking the action first so that an unknown
    /// action is reported as such regardless of the payload.
    pub fn from_envelope(envelope: Value) -> Result<Self> {
        let mut fields = match envelope {
            Value::Object(fields) => fields,
            other => {
                return Err(GatewayError::validation(format!(
                    "event envelope must be a JSON object, got {}",
                    value_type(&other)
                )))
            }
        };

        let action = match fields.remove("action") {
            Some(Value::String(action)) => action,
            Some(other) => {
                return Err(GatewayError::validation(format!(
                    "action must be a string, got {}",
                    value_type(&other)
                )))
            }
            None => return Err(GatewayError::validation("event envelope has no action")),
        };
        let payload = fields.remove("payload").unwrap_or(Value::Null);

        match action.as_str() {
            "put" => decode_payload(&action, payload).map(Event::Put),
            "get" => decode_payload(&action, payload).map(Event::Get),
            "query" => decode_payload(&action, payload).map(Event::Query),
            "delete" => decode_payload(&action, payload).map(Event::Delete),
            _ => Err(GatewayError::UnknownActionError { action }),
        }
    }

    pub fn action(&self) -> &'static str {
        match self {
            Event::Put(_) => "put",
            Event::Get(_) => "get",
            Event::Query(_) => "query",
            Event::Delete(_) => "delete",
        }
    }

    pub fn table_name(&self) -> &str {
        match self {
            Event::Put(r) => &r.table_name,
            Event::Get(r) => &r.table_name,
            Event::Query(r) => &r.table_name,
            Event::Delete(r) => &r.table_name,
        }
    }
}

fn decode_payload<T: DeserializeOwned>(action: &str, payload: Value) -> Result<T> {
    serde_json::from_value(payload)
        .map_err(|e| GatewayError::validation(format!("invalid {} payload: {}", action, e)))
}

fn value_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PutResult {
    pub table_name: String,
    pub item: Item,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetResult {
    pub table_name: String,
    pub item: Option<Item>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub table_name: String,
    pub items: Vec<Item>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub table_name: String,
    pub key: Key,
    pub deleted: bool,
}

/// Outcome of a dispatched event, serialized as the bare result object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    Put(PutResult),
    Get(GetResult),
    Query(QueryResult),
    Delete(DeleteResult),
}

/// One page of items as returned by the storage service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryPage {
    pub items: Vec<Item>,
    /// Match count reported by the service, if any.
    pub count: Option<usize>,
}
