// Route module decomposition: each area of the portal API in its own file.
// Shared types (request guards, session table) live here; route functions in submodules.

mod announcements;
mod auth;
mod dashboard;
mod messages;
mod stream;
mod system;
mod typing;
mod users;

// --- Re-exports (all route functions used by lib.rs mount) ---

pub use announcements::{create_announcement, list_announcements};
pub use auth::{login, logout, me};
pub use dashboard::get_dashboard;
pub use messages::{get_messages, send_message};
pub use stream::live_stream;
pub use system::{forbidden, health, not_found, stats, too_many_requests, unauthorized};
pub use typing::{get_typing, notify_typing};
pub use users::{list_users, remove_user, update_status};

// --- Shared request guards ---

use crate::directory::{Account, Role, UserDirectory};
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};
use rocket::serde::json::Json;
use std::collections::HashMap;
use std::sync::RwLock;

pub type ApiError = (Status, Json<serde_json::Value>);

pub(crate) fn api_error(status: Status, message: &str) -> ApiError {
    (status, Json(serde_json::json!({"error": message})))
}

pub struct ClientIp(pub String);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ClientIp {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let ip = req
            .headers()
            .get_one("X-Forwarded-For")
            .and_then(|s| s.split(',').next())
            .map(|s| s.trim().to_string())
            .or_else(|| req.remote().map(|r| r.ip().to_string()))
            .unwrap_or_else(|| "unknown".to_string());
        Outcome::Success(ClientIp(ip))
    }
}

// --- Sessions ---

/// Bearer token -> account id for everyone currently logged in.
#[derive(Default)]
pub struct Sessions {
    tokens: RwLock<HashMap<String, String>>,
}

impl Sessions {
    /// Start a session and return its token.
    pub fn start(&self, account_id: &str) -> String {
        let token = format!("sess_{:032x}", uuid::Uuid::new_v4().as_u128());
        let mut tokens = self.tokens.write().unwrap_or_else(|e| e.into_inner());
        tokens.insert(token.clone(), account_id.to_string());
        token
    }

    pub fn end(&self, token: &str) -> Option<String> {
        let mut tokens = self.tokens.write().unwrap_or_else(|e| e.into_inner());
        tokens.remove(token)
    }

    pub fn account_id(&self, token: &str) -> Option<String> {
        let tokens = self.tokens.read().unwrap_or_else(|e| e.into_inner());
        tokens.get(token).cloned()
    }

    /// Whether `account_id` still has another live session.
    pub fn has_account(&self, account_id: &str) -> bool {
        let tokens = self.tokens.read().unwrap_or_else(|e| e.into_inner());
        tokens.values().any(|id| id == account_id)
    }
}

/// The logged-in caller, resolved from `Authorization: Bearer <token>`.
pub struct Session {
    pub token: String,
    pub account: Account,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.account.role == Role::Admin
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Session {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let Some(token) = req
            .headers()
            .get_one("Authorization")
            .and_then(|auth| auth.strip_prefix("Bearer "))
            .map(|t| t.trim().to_string())
        else {
            return Outcome::Error((Status::Unauthorized, ()));
        };
        let (Some(sessions), Some(directory)) = (
            req.rocket().state::<Sessions>(),
            req.rocket().state::<UserDirectory>(),
        ) else {
            return Outcome::Error((Status::InternalServerError, ()));
        };
        match sessions
            .account_id(&token)
            .and_then(|id| directory.get(&id))
        {
            Some(account) => Outcome::Success(Session { token, account }),
            None => Outcome::Error((Status::Unauthorized, ())),
        }
    }
}
