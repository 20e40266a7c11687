use crate::manager::LiveStateManager;
use crate::models::{TypingRequest, TypingResponse};
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{get, post, State};
use std::sync::Arc;

use super::messages::valid_channel_id;
use super::{ApiError, Session, api_error};

#[post("/api/v1/channels/<channel_id>/typing", format = "json", data = "<body>")]
pub fn notify_typing(
    manager: &State<Arc<LiveStateManager>>,
    session: Session,
    channel_id: &str,
    body: Json<TypingRequest>,
) -> Result<Json<TypingResponse>, ApiError> {
    if !valid_channel_id(channel_id) {
        return Err(api_error(Status::BadRequest, "Invalid channel id"));
    }
    manager.set_typing(channel_id, &session.account.id, body.is_typing);
    Ok(Json(TypingResponse {
        channel_id: channel_id.to_string(),
        typing: manager.get_typing(channel_id),
    }))
}

#[get("/api/v1/channels/<channel_id>/typing")]
pub fn get_typing(
    manager: &State<Arc<LiveStateManager>>,
    _session: Session,
    channel_id: &str,
) -> Result<Json<TypingResponse>, ApiError> {
    if !valid_channel_id(channel_id) {
        return Err(api_error(Status::BadRequest, "Invalid channel id"));
    }
    Ok(Json(TypingResponse {
        channel_id: channel_id.to_string(),
        typing: manager.get_typing(channel_id),
    }))
}
