//! Change notification between managers that share one store.
//!
//! Every write a manager makes to the store is published here tagged with the
//! writing context; receivers skip their own context, so a write never
//! notifies the manager that made it.

use tokio::sync::broadcast;
use uuid::Uuid;

/// Identifies one execution context (one manager instance).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(Uuid);

impl ContextId {
    pub fn new() -> Self {
        ContextId(Uuid::new_v4())
    }
}

impl Default for ContextId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ContextId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One store mutation. `new_value` is `None` for removals.
#[derive(Debug, Clone)]
pub struct StorageChange {
    pub key: String,
    pub new_value: Option<String>,
    pub source: ContextId,
}

pub trait ChangeTransport: Send + Sync {
    fn publish(&self, change: StorageChange);
    /// `None` when the transport never delivers anything.
    fn subscribe(&self) -> Option<broadcast::Receiver<StorageChange>>;
}

/// Single-context transport: publishes go nowhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTransport;

impl ChangeTransport for NullTransport {
    fn publish(&self, _change: StorageChange) {}

    fn subscribe(&self) -> Option<broadcast::Receiver<StorageChange>> {
        None
    }
}

/// In-process fan-out to every manager holding a clone of the same transport.
#[derive(Clone)]
pub struct BroadcastTransport {
    sender: broadcast::Sender<StorageChange>,
}

impl Default for BroadcastTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl BroadcastTransport {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1024);
        BroadcastTransport { sender }
    }
}

impl ChangeTransport for BroadcastTransport {
    fn publish(&self, change: StorageChange) {
        // Ignore send errors (no subscribers)
        let _ = self.sender.send(change);
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<StorageChange>> {
        Some(self.sender.subscribe())
    }
}
