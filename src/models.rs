use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Free-form fields carried alongside the typed ones.
pub type Payload = Map<String, Value>;

/// userId -> last typing signal (ms since epoch).
pub type TypingMap = BTreeMap<String, i64>;

/// Drop keys the manager owns so a flattened payload can never shadow them.
pub(crate) fn strip_reserved(mut payload: Payload, reserved: &[&str]) -> Payload {
    for key in reserved {
        payload.remove(*key);
    }
    payload
}

// --- Presence ---

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PresenceRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub last_seen: i64,
    #[serde(flatten)]
    pub fields: Payload,
}

/// What a caller hands to `add_user`: an id plus whatever it knows about the user.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UserInput {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(flatten)]
    pub fields: Payload,
}

impl UserInput {
    pub fn new(id: impl Into<String>) -> Self {
        UserInput {
            id: id.into(),
            status: None,
            fields: Payload::new(),
        }
    }

    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

// --- Chat ---

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub timestamp: i64,
    #[serde(flatten)]
    pub payload: Payload,
}

// --- Announcements ---

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Announcement {
    pub id: String,
    pub timestamp: i64,
    #[serde(flatten)]
    pub payload: Payload,
}

// --- System stats ---

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SystemStats {
    pub connected_users: u64,
    pub active_chats: u64,
    pub system_health: String,
    pub uptime: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<i64>,
    #[serde(flatten)]
    pub extra: Payload,
}

impl Default for SystemStats {
    fn default() -> Self {
        SystemStats {
            connected_users: 0,
            active_chats: 0,
            system_health: "operational".to_string(),
            uptime: "99.9%".to_string(),
            last_updated: None,
            extra: Payload::new(),
        }
    }
}

/// Wrapper written under `live_event_<name>` to carry an emit to other contexts.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Envelope {
    pub event: String,
    pub data: Value,
    pub timestamp: i64,
}

// --- HTTP request/response bodies ---

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct LoginResponse {
    pub token: String,
    pub account: crate::directory::Account,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct TypingRequest {
    #[serde(default = "default_true")]
    pub is_typing: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct TypingResponse {
    pub channel_id: String,
    pub typing: TypingMap,
}

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub role: crate::directory::Role,
    pub account: crate::directory::Account,
    pub announcements: Vec<Announcement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<SystemStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<PresenceRecord>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub channels: Vec<String>,
}
