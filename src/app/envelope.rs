//! Request body parsing and SNS message classification.

use crate::utils::error::{GatewayError, Result};
use axum::http::HeaderMap;
use serde_json::Value;

pub const MESSAGE_TYPE_HEADER: &str = "x-amz-sns-message-type";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    SubscriptionConfirmation,
    Notification,
    Direct,
}

impl MessageKind {
    pub fn classify(headers: &HeaderMap) -> Self {
        match headers
            .get(MESSAGE_TYPE_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            Some("SubscriptionConfirmation") => Self::SubscriptionConfirmation,
            Some("Notification") => Self::Notification,
            _ => Self::Direct,
        }
    }
}

/// Parses a request body as JSON, unwrapping one level of JSON-string
/// encoding. Unparseable text comes back as a plain string value.
pub fn parse_request_body(body: &[u8]) -> Value {
    let text = String::from_utf8_lossy(body);

    match serde_json::from_str::<Value>(&text) {
        Ok(Value::String(inner)) => match serde_json::from_str::<Value>(&inner) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "String body is not JSON; passing it through");
                Value::String(inner)
            }
        },
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to parse body as JSON; passing it through");
            Value::String(text.into_owned())
        }
    }
}

/// Looks up `SubscribeURL` under any ASCII casing.
pub fn subscribe_url(body: &Value) -> Option<&str> {
    body.as_object()?
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case("subscribeurl"))
        .and_then(|(_, value)| value.as_str())
        .filter(|url| !url.is_empty())
}

/// Recovers the event envelope embedded in a notification's `Message`.
pub fn unwrap_notification(body: &Value) -> Result<Value> {
    let message = body
        .get("Message")
        .ok_or_else(|| GatewayError::EnvelopeParseError {
            message: "notification has no Message field".to_string(),
        })?;

    let Value::String(message) = message else {
        return Err(GatewayError::EnvelopeParseError {
            message: "notification Message must be a JSON-encoded string".to_string(),
        });
    };

    serde_json::from_str(message).map_err(|e| GatewayError::EnvelopeParseError {
        message: format!("notification Message is not valid JSON: {}", e),
    })
}

pub fn body_keys(body: &Value) -> Vec<&str> {
    body.as_object()
        .map(|fields| fields.keys().map(String::as_str).collect())
        .unwrap_or_default()
}
