use serde_json::{json, Value};
use std::sync::Arc;
use table_webhook::core::Outcome;
use table_webhook::{EventDispatcher, GatewayError, KeySchema, MemoryStore};

fn dispatcher() -> EventDispatcher {
    let store = MemoryStore::new()
        .with_table("T", KeySchema::new("id"))
        .with_table("Orders", KeySchema::new("customerId").with_sort_key("orderId"));
    EventDispatcher::new(Arc::new(store))
}

async fn run(dispatcher: &EventDispatcher, envelope: Value) -> Value {
    let outcome = dispatcher.dispatch(envelope).await.expect("dispatch failed");
    serde_json::to_value(outcome).unwrap()
}

#[tokio::test]
async fn test_put_then_get_round_trip() {
    let dispatcher = dispatcher();
    let item = json!({"id": "1", "v": 5, "tags": ["a"], "meta": {"nested": true}});

    let put = run(
        &dispatcher,
        json!({"action": "put", "payload": {"tableName": "T", "item": item}}),
    )
    .await;
    assert_eq!(put, json!({"tableName": "T", "item": item}));

    let get = run(
        &dispatcher,
        json!({"action": "get", "payload": {"tableName": "T", "key": {"id": "1"}}}),
    )
    .await;
    assert_eq!(get, json!({"tableName": "T", "item": item}));
}

#[tokio::test]
async fn test_get_absent_key_is_not_an_error() {
    let dispatcher = dispatcher();
    let get = run(
        &dispatcher,
        json!({"action": "get", "payload": {"tableName": "T", "key": {"id": "missing"}}}),
    )
    .await;
    assert_eq!(get, json!({"tableName": "T", "item": null}));
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let dispatcher = dispatcher();
    run(
        &dispatcher,
        json!({"action": "put", "payload": {"tableName": "T", "item": {"id": "1"}}}),
    )
    .await;

    let delete = json!({"action": "delete", "payload": {"tableName": "T", "key": {"id": "1"}}});
    let expected = json!({"tableName": "T", "key": {"id": "1"}, "deleted": true});
    assert_eq!(run(&dispatcher, delete.clone()).await, expected);
    assert_eq!(run(&dispatcher, delete).await, expected);

    let get = run(
        &dispatcher,
        json!({"action": "get", "payload": {"tableName": "T", "key": {"id": "1"}}}),
    )
    .await;
    assert_eq!(get["item"], Value::Null);
}

#[tokio::test]
async fn test_query_without_matches_returns_empty() {
    let dispatcher = dispatcher();
    let query = run(
        &dispatcher,
        json!({
            "action": "query",
            "payload": {
                "tableName": "T",
                "keyCondition": {"expression": "id = :id", "values": {":id": "nobody"}}
            }
        }),
    )
    .await;
    assert_eq!(query, json!({"tableName": "T", "items": [], "count": 0}));
}

#[tokio::test]
async fn test_query_range_on_sort_key() {
    let dispatcher = dispatcher();
    for order in [5, 1, 3, 9] {
        run(
            &dispatcher,
            json!({
                "action": "put",
                "payload": {"tableName": "Orders", "item": {"customerId": "c1", "orderId": order}}
            }),
        )
        .await;
    }

    let outcome = dispatcher
        .dispatch(json!({
            "action": "query",
            "payload": {
                "tableName": "Orders",
                "keyCondition": {
                    "expression": "customerId = :c AND orderId BETWEEN :lo AND :hi",
                    "values": {":c": "c1", ":lo": 2, ":hi": 6}
                }
            }
        }))
        .await
        .unwrap();

    match outcome {
        Outcome::Query(result) => {
            assert_eq!(result.count, 2);
            let ids: Vec<&Value> = result.items.iter().map(|i| &i["orderId"]).collect();
            assert_eq!(ids, vec![&json!(3), &json!(5)]);
        }
        other => panic!("expected a query outcome, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unknown_action_names_the_action() {
    let dispatcher = dispatcher();
    let err = dispatcher
        .dispatch(json!({"action": "noop", "payload": {}}))
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::UnknownActionError { ref action } if action == "noop"));
    assert_eq!(err.to_string(), "Unknown action: noop");
}

#[tokio::test]
async fn test_storage_failures_surface() {
    let dispatcher = dispatcher();

    let err = dispatcher
        .dispatch(json!({"action": "put", "payload": {"tableName": "Missing", "item": {"id": "1"}}}))
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::StorageError { .. }));

    let err = dispatcher
        .dispatch(json!({"action": "get", "payload": {"tableName": "T", "key": {"wrong": "1"}}}))
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::StorageError { .. }));
}

#[tokio::test]
async fn test_payload_shape_is_validated() {
    let dispatcher = dispatcher();
    let err = dispatcher
        .dispatch(json!({"action": "put", "payload": {"tableName": "T", "item": [1, 2]}}))
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::ValidationError { .. }));
}
