use model::breach::{BreachEvent, PendingEvent};

use crate::{storage::Storage, Result};

/// Facade over the append-only alert log. Downstream consumers
/// (notification dispatch, dashboards) replay via `list_since` and are
/// fully decoupled from ingestion; there is no update or delete, so
/// corrections are modeled as new events.
pub struct AlertSink<S: Storage> {
    store: S,
}

impl<S: Storage> Clone for AlertSink<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: Storage> AlertSink<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Appends the events and returns them stamped with their ids. Never
    /// rejects a well-formed event; id assignment is atomic inside the
    /// store's append.
    pub async fn append(&self, pending: Vec<PendingEvent>) -> Result<Vec<BreachEvent>> {
        if pending.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.store.append_events(pending).await?)
    }

    /// Events with an id strictly greater than the cursor, in id order.
    pub async fn list_since(&self, cursor: u64) -> Result<Vec<BreachEvent>> {
        Ok(self.store.events_since(cursor).await?)
    }
}
