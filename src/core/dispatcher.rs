use crate::core::{Event, ItemStore, Outcome, StorageGateway};
use crate::utils::error::Result;
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
pub struct EventDispatcher {
    gateway: StorageGateway,
}

impl EventDispatcher {
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self {
            gateway: StorageGateway::new(store),
        }
    }

    /// Decodes a raw `{action, payload}` envelope and runs it.
    pub async fn dispatch(&self, envelope: Value) -> Result<Outcome> {
        let event = Event::from_envelope(envelope)?;
        self.dispatch_event(event).await
    }

    pub async fn dispatch_event(&self, event: Event) -> Result<Outcome> {
        tracing::info!(action = event.action(), table = %event.table_name(), "Dispatching event");

        let outcome = match event {
            Event::Put(req) => Outcome::Put(self.gateway.put(req.table_name, req.item).await?),
            Event::Get(req) => Outcome::Get(self.gateway.get(req.table_name, req.key).await?),
            Event::Query(req) => {
                Outcome::Query(self.gateway.query(req.table_name, req.key_condition).await?)
            }
            Event::Delete(req) => {
                Outcome::Delete(self.gateway.delete(req.table_name, req.key).await?)
            }
        };

        Ok(outcome)
    }
}
