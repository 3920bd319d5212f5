//! HTTP front door: `GET /health` and `POST /events`.

use crate::app::confirmation::spawn_confirmation;
use crate::app::envelope::{
    body_keys, parse_request_body, subscribe_url, unwrap_notification, MessageKind,
};
use crate::core::{EventDispatcher, ItemStore, Outcome};
use crate::utils::error::GatewayError;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared application state, built once at startup.
pub struct AppState {
    pub dispatcher: EventDispatcher,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self {
            dispatcher: EventDispatcher::new(store),
            http: reqwest::Client::new(),
        }
    }
}

#[derive(Debug, Serialize)]
struct EventResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
    result: Outcome,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    message: &'static str,
    error: String,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, kind = self.kind(), "Error processing event");

        let body = ErrorResponse {
            success: false,
            message: "Error processing event",
            error: self.to_string(),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/events", post(events))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}

async fn events(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, GatewayError> {
    let body = parse_request_body(&body);

    match MessageKind::classify(&headers) {
        MessageKind::SubscriptionConfirmation => Ok(confirm_subscription(&state, &body)),
        MessageKind::Notification => {
            tracing::info!("Received SNS notification");
            let envelope = unwrap_notification(&body)?;
            let result = state.dispatcher.dispatch(envelope).await?;
            Ok(Json(EventResponse {
                success: true,
                message: None,
                result,
            })
            .into_response())
        }
        MessageKind::Direct => {
            tracing::info!("Received direct event");
            tracing::debug!(body = %body, "Direct event body");
            let result = state.dispatcher.dispatch(body).await?;
            Ok(Json(EventResponse {
                success: true,
                message: Some("Event processed successfully"),
                result,
            })
            .into_response())
        }
    }
}

/// Always acknowledges with `200 OK`; SNS retries anything else.
fn confirm_subscription(state: &AppState, body: &Value) -> Response {
    tracing::info!("Received SNS subscription confirmation");

    match subscribe_url(body) {
        Some(url) => {
            // fire-and-forget
            let _ = spawn_confirmation(state.http.clone(), url.to_string());
        }
        None => {
            tracing::error!(keys = ?body_keys(body), "No SubscribeURL found in body");
        }
    }

    (StatusCode::OK, "OK").into_response()
}
