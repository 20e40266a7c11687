use crate::manager::LiveStateManager;
use crate::models::{Announcement, Payload};
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{get, post, State};
use std::sync::Arc;

use super::{ApiError, Session, api_error};

#[get("/api/v1/announcements?<limit>")]
pub fn list_announcements(
    manager: &State<Arc<LiveStateManager>>,
    limit: Option<usize>,
) -> Json<Vec<Announcement>> {
    let mut announcements = manager.get_announcements();
    if let Some(limit) = limit {
        announcements.truncate(limit);
    }
    Json(announcements)
}

#[post("/api/v1/announcements", format = "json", data = "<body>")]
pub fn create_announcement(
    manager: &State<Arc<LiveStateManager>>,
    session: Session,
    body: Json<Payload>,
) -> Result<Json<Announcement>, ApiError> {
    if !session.is_admin() {
        return Err(api_error(Status::Forbidden, "Admin role required"));
    }

    let mut payload = body.into_inner();
    let title = payload
        .get("title")
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .unwrap_or_default();
    if title.is_empty() || title.len() > 200 {
        return Err(api_error(Status::BadRequest, "Title must be 1-200 characters"));
    }
    payload.insert("title".into(), title.into());
    payload.insert("author".into(), session.account.name.clone().into());

    Ok(Json(manager.add_announcement(payload)))
}
