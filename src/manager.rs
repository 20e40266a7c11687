//! The live state manager: in-process pub/sub, a durable key-value store, and
//! propagation of store writes to other managers bound to the same store.
//!
//! Every convenience operation (presence, chat, typing, announcements, stats)
//! is built on the four primitives `emit`, `get_data`, `set_data` and
//! `remove_data`, so a convenience write also raises `data_updated`.

use crate::clock::Clock;
use crate::events::{self, Callback, ListenerRegistry};
use crate::models::{
    Announcement, ChatMessage, Envelope, Payload, PresenceRecord, SystemStats, TypingMap,
    UserInput, strip_reserved,
};
use crate::store::Storage;
use crate::transport::{ChangeTransport, ContextId, StorageChange};
use crate::typing::{DEFAULT_STALE_MS, prune_stale};
use log::{debug, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast::{self, error::TryRecvError};

pub const USERS_KEY: &str = "live_users";
pub const ANNOUNCEMENTS_KEY: &str = "live_announcements";
pub const SYSTEM_STATS_KEY: &str = "system_stats";
pub const MESSAGES_KEY_PREFIX: &str = "chat_messages_";
pub const TYPING_KEY_PREFIX: &str = "typing_";
pub const EVENT_KEY_PREFIX: &str = "live_event_";

pub fn messages_key(channel_id: &str) -> String {
    format!("{MESSAGES_KEY_PREFIX}{channel_id}")
}

pub fn typing_key(channel_id: &str) -> String {
    format!("{TYPING_KEY_PREFIX}{channel_id}")
}

pub fn event_key(event: &str) -> String {
    format!("{EVENT_KEY_PREFIX}{event}")
}

pub struct LiveStateManager {
    store: Option<Arc<dyn Storage>>,
    clock: Arc<dyn Clock>,
    transport: Arc<dyn ChangeTransport>,
    context: ContextId,
    listeners: ListenerRegistry,
    inbox: Mutex<Option<broadcast::Receiver<StorageChange>>>,
    /// Serializes read-modify-write of stored collections within this context.
    writes: Mutex<()>,
    typing_stale_ms: i64,
}

impl LiveStateManager {
    /// `store` is `None` where no durable store exists; the manager then only
    /// does in-memory pub/sub.
    pub fn new(
        store: Option<Arc<dyn Storage>>,
        clock: Arc<dyn Clock>,
        transport: Arc<dyn ChangeTransport>,
    ) -> Self {
        let inbox = if store.is_some() {
            transport.subscribe()
        } else {
            None
        };
        let context = ContextId::new();
        debug!(
            "live state context {context} created (persistent: {}, cross-context: {})",
            store.is_some(),
            inbox.is_some()
        );
        LiveStateManager {
            store,
            clock,
            transport,
            context,
            listeners: ListenerRegistry::new(),
            inbox: Mutex::new(inbox),
            writes: Mutex::new(()),
            typing_stale_ms: DEFAULT_STALE_MS,
        }
    }

    pub fn with_typing_stale_ms(mut self, ms: i64) -> Self {
        self.typing_stale_ms = ms;
        self
    }

    pub fn is_persistent(&self) -> bool {
        self.store.is_some()
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    // --- Pub/sub ---

    pub fn on(&self, event: &str, cb: Callback) {
        self.listeners.add(event, cb);
    }

    pub fn off(&self, event: &str, cb: &Callback) {
        self.listeners.remove(event, cb);
    }

    /// Run local listeners in registration order, then leave an envelope in
    /// the store so other contexts re-emit it.
    pub fn emit(&self, event: &str, data: Value) {
        let delivered = self.listeners.dispatch(event, &data);
        debug!("emit {event} -> {delivered} local listener(s)");

        if self.store.is_none() {
            return;
        }
        let envelope = Envelope {
            event: event.to_string(),
            data,
            timestamp: self.clock.now_ms(),
        };
        match serde_json::to_string(&envelope) {
            Ok(raw) => self.write_raw(&event_key(event), Some(&raw)),
            Err(e) => warn!("failed to encode envelope for {event}: {e}"),
        }
    }

    // --- Key-value primitives ---

    /// Decoded value under `key`, or `None` if absent, unreadable or malformed.
    pub fn get_data<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let store = self.store.as_ref()?;
        let raw = match store.get_item(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("failed to read {key}: {e}");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("discarding malformed value under {key}: {e}");
                None
            }
        }
    }

    pub fn set_data<T: Serialize>(&self, key: &str, data: &T) {
        let stored = {
            let _guard = self.write_guard();
            self.store_value(key, data)
        };
        if let Some(value) = stored {
            self.data_updated(key, value);
        }
    }

    /// Encode and write `data` without emitting. Returns the encoded value,
    /// or `None` if it could not be encoded.
    fn store_value<T: Serialize>(&self, key: &str, data: &T) -> Option<Value> {
        let value = match serde_json::to_value(data) {
            Ok(v) => v,
            Err(e) => {
                warn!("failed to encode value for {key}: {e}");
                return None;
            }
        };
        if self.store.is_some() {
            self.write_raw(key, Some(&value.to_string()));
        }
        Some(value)
    }

    fn data_updated(&self, key: &str, value: Value) {
        self.emit(events::DATA_UPDATED, json!({"key": key, "data": value}));
    }

    /// Held across a get-mutate-store sequence; released before any emit so
    /// listeners may call back into the manager.
    fn write_guard(&self) -> MutexGuard<'_, ()> {
        self.writes.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn remove_data(&self, key: &str) {
        if self.store.is_some() {
            let _guard = self.write_guard();
            self.write_raw(key, None);
        }
        self.emit(events::DATA_REMOVED, json!({"key": key}));
    }

    /// Write to the store and announce the change to other contexts.
    fn write_raw(&self, key: &str, value: Option<&str>) {
        let Some(store) = &self.store else {
            return;
        };
        let result = match value {
            Some(v) => store.set_item(key, v),
            None => store.remove_item(key),
        };
        if let Err(e) = result {
            warn!("failed to write {key}: {e}");
            return;
        }
        self.transport.publish(StorageChange {
            key: key.to_string(),
            new_value: value.map(String::from),
            source: self.context,
        });
    }

    // --- Cross-context delivery ---

    /// Re-emit locally an event another context wrote. Returns whether any
    /// event was delivered. Never panics on bad input.
    pub fn handle_storage_change(&self, change: &StorageChange) -> bool {
        if change.source == self.context {
            return false;
        }
        let Some(event) = change.key.strip_prefix(EVENT_KEY_PREFIX) else {
            return false;
        };
        let Some(raw) = change.new_value.as_deref() else {
            return false;
        };
        match serde_json::from_str::<Envelope>(raw) {
            Ok(envelope) => {
                let delivered = self.listeners.dispatch(event, &envelope.data);
                debug!("cross-context {event} from {} -> {delivered} listener(s)", change.source);
                true
            }
            Err(e) => {
                warn!("ignoring malformed envelope under {}: {e}", change.key);
                false
            }
        }
    }

    /// Deliver every change queued by other contexts. Returns how many events
    /// were re-emitted.
    pub fn dispatch_pending(&self) -> usize {
        let mut changes = Vec::new();
        {
            let mut inbox = self.inbox.lock().unwrap_or_else(|e| e.into_inner());
            let Some(rx) = inbox.as_mut() else {
                return 0;
            };
            loop {
                match rx.try_recv() {
                    Ok(change) => changes.push(change),
                    Err(TryRecvError::Lagged(n)) => {
                        warn!("live state context {} lagged, missed {n} changes", self.context);
                    }
                    Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                }
            }
        }
        changes
            .iter()
            .filter(|c| self.handle_storage_change(c))
            .count()
    }

    /// Deliver changes from other contexts as they arrive. Takes over the
    /// inbox, so `dispatch_pending` returns 0 afterwards.
    pub async fn run_change_listener(self: Arc<Self>) {
        let rx = self
            .inbox
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        let Some(mut rx) = rx else {
            return;
        };
        loop {
            match rx.recv().await {
                Ok(change) => {
                    self.handle_storage_change(&change);
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("live state context {} lagged, missed {n} changes", self.context);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    // --- Presence ---

    pub fn get_users(&self) -> Vec<PresenceRecord> {
        self.get_data(USERS_KEY).unwrap_or_default()
    }

    /// Upsert by id. The emitted `user_updated` carries `user` as given, not
    /// the merged record.
    pub fn add_user(&self, user: UserInput) {
        let fields = strip_reserved(user.fields.clone(), &["id", "status", "lastSeen"]);
        let stored = {
            let _guard = self.write_guard();
            let now = self.clock.now_ms();
            let mut users = self.get_users();
            match users.iter_mut().find(|u| u.id == user.id) {
                Some(existing) => {
                    existing.fields.extend(fields);
                    if let Some(status) = &user.status {
                        existing.status = Some(status.clone());
                    }
                    existing.last_seen = now;
                }
                None => users.push(PresenceRecord {
                    id: user.id.clone(),
                    status: user.status.clone(),
                    last_seen: now,
                    fields,
                }),
            }
            self.store_value(USERS_KEY, &users)
        };

        if let Some(value) = stored {
            self.data_updated(USERS_KEY, value);
        }
        self.emit(
            events::USER_UPDATED,
            serde_json::to_value(&user).unwrap_or_default(),
        );
    }

    pub fn remove_user(&self, user_id: &str) {
        let stored = {
            let _guard = self.write_guard();
            let mut users = self.get_users();
            users.retain(|u| u.id != user_id);
            self.store_value(USERS_KEY, &users)
        };
        if let Some(value) = stored {
            self.data_updated(USERS_KEY, value);
        }
        self.emit(events::USER_REMOVED, json!({"userId": user_id}));
    }

    /// Returns false (and writes nothing) for an unknown user.
    pub fn update_user_status(&self, user_id: &str, status: &str) -> bool {
        let stored = {
            let _guard = self.write_guard();
            let mut users = self.get_users();
            let Some(user) = users.iter_mut().find(|u| u.id == user_id) else {
                return false;
            };
            user.status = Some(status.to_string());
            user.last_seen = self.clock.now_ms();
            self.store_value(USERS_KEY, &users)
        };

        if let Some(value) = stored {
            self.data_updated(USERS_KEY, value);
        }
        self.emit(
            events::USER_STATUS_UPDATED,
            json!({"userId": user_id, "status": status}),
        );
        true
    }

    // --- Chat ---

    pub fn get_messages(&self, channel_id: &str) -> Vec<ChatMessage> {
        self.get_data(&messages_key(channel_id)).unwrap_or_default()
    }

    pub fn add_message(&self, channel_id: &str, payload: Payload) -> ChatMessage {
        let key = messages_key(channel_id);
        let payload = strip_reserved(payload, &["id", "timestamp"]);
        let (message, stored) = {
            let _guard = self.write_guard();
            let now = self.clock.now_ms();
            let message = ChatMessage {
                id: now.to_string(),
                timestamp: now,
                payload,
            };
            let mut messages = self.get_messages(channel_id);
            messages.push(message.clone());
            let stored = self.store_value(&key, &messages);
            (message, stored)
        };

        if let Some(value) = stored {
            self.data_updated(&key, value);
        }
        self.emit(
            events::MESSAGE_ADDED,
            json!({"channelId": channel_id, "message": message}),
        );
        message
    }

    /// Channels that have a stored message sequence.
    pub fn channels(&self) -> Vec<String> {
        let Some(store) = &self.store else {
            return Vec::new();
        };
        let mut channels: Vec<String> = match store.keys() {
            Ok(keys) => keys
                .iter()
                .filter_map(|k| k.strip_prefix(MESSAGES_KEY_PREFIX))
                .map(String::from)
                .collect(),
            Err(e) => {
                warn!("failed to list keys: {e}");
                Vec::new()
            }
        };
        channels.sort();
        channels
    }

    // --- Typing ---

    pub fn set_typing(&self, channel_id: &str, user_id: &str, is_typing: bool) {
        let key = typing_key(channel_id);
        let (typing, stored) = {
            let _guard = self.write_guard();
            let mut typing: TypingMap = self.get_data(&key).unwrap_or_default();
            if is_typing {
                typing.insert(user_id.to_string(), self.clock.now_ms());
            } else {
                typing.remove(user_id);
            }
            let stored = self.store_value(&key, &typing);
            (typing, stored)
        };

        if let Some(value) = stored {
            self.data_updated(&key, value);
        }
        self.emit(
            events::TYPING_UPDATED,
            json!({"channelId": channel_id, "typing": typing}),
        );
    }

    /// Current typers. Stale entries are filtered out of the result only.
    pub fn get_typing(&self, channel_id: &str) -> TypingMap {
        let typing: TypingMap = self.get_data(&typing_key(channel_id)).unwrap_or_default();
        prune_stale(&typing, self.clock.now_ms(), self.typing_stale_ms)
    }

    // --- Announcements ---

    /// Newest first.
    pub fn get_announcements(&self) -> Vec<Announcement> {
        self.get_data(ANNOUNCEMENTS_KEY).unwrap_or_default()
    }

    pub fn add_announcement(&self, payload: Payload) -> Announcement {
        let payload = strip_reserved(payload, &["id", "timestamp"]);
        let (announcement, stored) = {
            let _guard = self.write_guard();
            let now = self.clock.now_ms();
            let announcement = Announcement {
                id: now.to_string(),
                timestamp: now,
                payload,
            };
            let mut announcements = self.get_announcements();
            announcements.insert(0, announcement.clone());
            let stored = self.store_value(ANNOUNCEMENTS_KEY, &announcements);
            (announcement, stored)
        };

        if let Some(value) = stored {
            self.data_updated(ANNOUNCEMENTS_KEY, value);
        }
        self.emit(
            events::ANNOUNCEMENT_ADDED,
            serde_json::to_value(&announcement).unwrap_or_default(),
        );
        announcement
    }

    // --- System stats ---

    pub fn update_system_stats(&self, stats: SystemStats) {
        let raw = serde_json::to_value(&stats).unwrap_or_default();
        let stamped = SystemStats {
            last_updated: Some(self.clock.now_ms()),
            ..stats
        };
        self.set_data(SYSTEM_STATS_KEY, &stamped);
        self.emit(events::SYSTEM_STATS_UPDATED, raw);
    }

    pub fn get_system_stats(&self) -> SystemStats {
        self.get_data(SYSTEM_STATS_KEY).unwrap_or_default()
    }
}
