use crate::manager::LiveStateManager;
use crate::models::{PresenceRecord, StatusUpdate};
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{delete, get, put, State};
use std::sync::Arc;

use super::{ApiError, Session, api_error};

#[get("/api/v1/users")]
pub fn list_users(
    manager: &State<Arc<LiveStateManager>>,
    _session: Session,
) -> Json<Vec<PresenceRecord>> {
    Json(manager.get_users())
}

#[put("/api/v1/users/<user_id>/status", format = "json", data = "<body>")]
pub fn update_status(
    manager: &State<Arc<LiveStateManager>>,
    session: Session,
    user_id: &str,
    body: Json<StatusUpdate>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if session.account.id != user_id && !session.is_admin() {
        return Err(api_error(
            Status::Forbidden,
            "Only admins can change another user's status",
        ));
    }

    let status = body.status.trim();
    if status.is_empty() || status.len() > 32 {
        return Err(api_error(Status::BadRequest, "Status must be 1-32 characters"));
    }

    if !manager.update_user_status(user_id, status) {
        return Err(api_error(Status::NotFound, "User not online"));
    }
    Ok(Json(serde_json::json!({"userId": user_id, "status": status})))
}

#[delete("/api/v1/users/<user_id>")]
pub fn remove_user(
    manager: &State<Arc<LiveStateManager>>,
    session: Session,
    user_id: &str,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !session.is_admin() {
        return Err(api_error(Status::Forbidden, "Admin role required"));
    }
    manager.remove_user(user_id);
    Ok(Json(serde_json::json!({"ok": true})))
}
