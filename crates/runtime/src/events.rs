//! Broadcast bus for resolved combat events.
//!
//! Collaborators subscribe to receive the JSON-shaped records of events the
//! scheduler completed or failed. Publishing is best-effort: an empty
//! subscriber list is normal, not an error.

use serde::Serialize;
use tokio::sync::broadcast;

use combat_core::EventRecord;

/// Notification emitted once per processed event.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatNotice {
    Completed(EventRecord),
    Failed(EventRecord),
}

impl CombatNotice {
    pub fn record(&self) -> &EventRecord {
        match self {
            Self::Completed(record) | Self::Failed(record) => record,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Broadcast channel fan-out for combat notices.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<CombatNotice>,
}

impl EventBus {
    /// Create a bus with the default buffer per subscriber.
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish a notice to every current subscriber.
    pub fn publish(&self, notice: CombatNotice) {
        if self.tx.send(notice).is_err() {
            // No subscribers for this bus - this is normal, not an error
            tracing::trace!("no subscribers for combat notice");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CombatNotice> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
