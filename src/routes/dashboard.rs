use crate::directory::Role;
use crate::manager::LiveStateManager;
use crate::models::Dashboard;
use rocket::serde::json::Json;
use rocket::{get, State};
use std::sync::Arc;

use super::Session;

/// Admins get stats, presence and every channel; students get their own channels.
#[get("/api/v1/dashboard")]
pub fn get_dashboard(manager: &State<Arc<LiveStateManager>>, session: Session) -> Json<Dashboard> {
    let role = session.account.role;
    let announcements = manager.get_announcements();

    let dashboard = match role {
        Role::Admin => Dashboard {
            role,
            announcements,
            stats: Some(manager.get_system_stats()),
            users: Some(manager.get_users()),
            channels: manager.channels(),
            account: session.account,
        },
        Role::Student => Dashboard {
            role,
            announcements,
            stats: None,
            users: None,
            channels: session.account.channels.clone(),
            account: session.account,
        },
    };
    Json(dashboard)
}
