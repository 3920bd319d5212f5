#[cfg(feature = "lambda")]
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
#[cfg(feature = "lambda")]
use serde_json::{json, Value};
#[cfg(feature = "lambda")]
use std::sync::Arc;
#[cfg(feature = "lambda")]
use table_webhook::utils::{logger, validation::Validate};
#[cfg(feature = "lambda")]
use table_webhook::{DynamoStore, EventDispatcher, GatewayError, LambdaConfig};

/// SNS-triggered invocations carry one or more `Records[].Sns.Message`.
#[cfg(feature = "lambda")]
fn sns_messages(payload: &Value) -> Option<Vec<&str>> {
    let records = payload.get("Records")?.as_array()?;
    records
        .iter()
        .map(|record| record.get("Sns")?.get("Message")?.as_str())
        .collect()
}

#[cfg(feature = "lambda")]
async fn function_handler(
    dispatcher: &EventDispatcher,
    event: LambdaEvent<Value>,
) -> Result<Value, Error> {
    let (payload, context) = event.into_parts();
    tracing::info!(request_id = %context.request_id, "Handling Lambda event");

    if let Some(messages) = sns_messages(&payload) {
        let mut results = Vec::with_capacity(messages.len());
        for message in messages {
            let envelope: Value =
                serde_json::from_str(message).map_err(|e| GatewayError::EnvelopeParseError {
                    message: format!("SNS message is not valid JSON: {}", e),
                })?;
            results.push(dispatcher.dispatch(envelope).await?);
        }

        tracing::info!(records = results.len(), "SNS records processed");
        return Ok(json!({ "success": true, "results": results }));
    }

    let result = dispatcher.dispatch(payload).await?;
    Ok(json!({
        "success": true,
        "message": "Event processed successfully",
        "result": result,
    }))
}

#[cfg(feature = "lambda")]
#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    let config = LambdaConfig::from_env()?;
    config.validate()?;

    // 創建DynamoDB客戶端 (冷啟動時建立一次)
    let store = DynamoStore::from_config(&config).await;
    let dispatcher = Arc::new(EventDispatcher::new(Arc::new(store)));

    run(service_fn(move |event: LambdaEvent<Value>| {
        let dispatcher = Arc::clone(&dispatcher);
        async move { function_handler(&dispatcher, event).await }
    }))
    .await
}
