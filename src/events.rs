use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

pub const DATA_UPDATED: &str = "data_updated";
pub const DATA_REMOVED: &str = "data_removed";
pub const USER_UPDATED: &str = "user_updated";
pub const USER_REMOVED: &str = "user_removed";
pub const USER_STATUS_UPDATED: &str = "user_status_updated";
pub const MESSAGE_ADDED: &str = "message_added";
pub const TYPING_UPDATED: &str = "typing_updated";
pub const ANNOUNCEMENT_ADDED: &str = "announcement_added";
pub const SYSTEM_STATS_UPDATED: &str = "system_stats_updated";

/// Every event the manager itself raises.
pub const ALL_EVENTS: [&str; 9] = [
    DATA_UPDATED,
    DATA_REMOVED,
    USER_UPDATED,
    USER_REMOVED,
    USER_STATUS_UPDATED,
    MESSAGE_ADDED,
    TYPING_UPDATED,
    ANNOUNCEMENT_ADDED,
    SYSTEM_STATS_UPDATED,
];

pub type Callback = Arc<dyn Fn(&Value) + Send + Sync>;

/// Wrap a closure as a [`Callback`]. Keep the returned handle to `off` it later.
pub fn callback<F>(f: F) -> Callback
where
    F: Fn(&Value) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Event name -> callbacks, in registration order.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Mutex<HashMap<String, Vec<Callback>>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, event: &str, cb: Callback) {
        let mut map = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
        map.entry(event.to_string()).or_default().push(cb);
    }

    /// Remove the first registration of this exact callback. Returns false if none matched.
    pub fn remove(&self, event: &str, cb: &Callback) -> bool {
        let mut map = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
        let Some(list) = map.get_mut(event) else {
            return false;
        };
        let Some(pos) = list
            .iter()
            .position(|c| std::ptr::addr_eq(Arc::as_ptr(c), Arc::as_ptr(cb)))
        else {
            return false;
        };
        list.remove(pos);
        if list.is_empty() {
            map.remove(event);
        }
        true
    }

    /// Call every listener for `event`. The lock is released first so
    /// listeners may register, unregister or emit.
    pub fn dispatch(&self, event: &str, data: &Value) -> usize {
        let snapshot: Vec<Callback> = {
            let map = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
            map.get(event).cloned().unwrap_or_default()
        };
        for cb in &snapshot {
            cb(data);
        }
        snapshot.len()
    }

    pub fn count(&self, event: &str) -> usize {
        let map = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
        map.get(event).map(Vec::len).unwrap_or(0)
    }
}

/// One manager event, as forwarded to async consumers (the SSE stream).
#[derive(Debug, Clone)]
pub struct LiveEvent {
    pub name: String,
    pub data: Value,
}

/// Fan-out of manager events to async subscribers.
#[derive(Clone)]
pub struct LiveFeed {
    pub sender: broadcast::Sender<LiveEvent>,
}

impl Default for LiveFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl LiveFeed {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1024);
        LiveFeed { sender }
    }

    pub fn publish(&self, name: &str, data: &Value) {
        // Ignore send errors (no subscribers)
        let _ = self.sender.send(LiveEvent {
            name: name.to_string(),
            data: data.clone(),
        });
    }
}
