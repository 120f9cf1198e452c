use serde::Serialize;
use tokio::sync::broadcast;

use crate::models::Session;

/// Change notifications fanned out to other extension surfaces
/// (popup listing, sync worker). Serialized payloads mirror the
/// cross-context message shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "message", rename_all = "camelCase")]
pub enum SessionEvent {
    #[serde(rename_all = "camelCase")]
    SaveSession { session: Session, save_by_sync: bool },
    #[serde(rename_all = "camelCase")]
    UpdateSession { session: Session, save_by_sync: bool },
    #[serde(rename_all = "camelCase")]
    DeleteSession { id: String },
    DeleteAll,
}

/// Best-effort broadcast channel. Dispatch never fails the triggering
/// operation: a send with zero live subscribers is simply dropped.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    pub fn broadcast(&self, event: SessionEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(16)
    }
}
