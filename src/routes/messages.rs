use crate::manager::LiveStateManager;
use crate::models::{ChatMessage, Payload};
use crate::rate_limit::{RateLimitConfig, RateLimiter};
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{get, post, State};
use std::sync::Arc;

use super::{ApiError, ClientIp, Session, api_error};

pub(crate) fn valid_channel_id(channel_id: &str) -> bool {
    !channel_id.is_empty()
        && channel_id.len() <= 64
        && channel_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[get("/api/v1/channels/<channel_id>/messages?<limit>")]
pub fn get_messages(
    manager: &State<Arc<LiveStateManager>>,
    _session: Session,
    channel_id: &str,
    limit: Option<usize>,
) -> Result<Json<Vec<ChatMessage>>, ApiError> {
    if !valid_channel_id(channel_id) {
        return Err(api_error(Status::BadRequest, "Invalid channel id"));
    }
    let mut messages = manager.get_messages(channel_id);
    // Most recent N, still oldest first
    if let Some(limit) = limit
        && messages.len() > limit
    {
        messages.drain(..messages.len() - limit);
    }
    Ok(Json(messages))
}

#[post("/api/v1/channels/<channel_id>/messages", format = "json", data = "<body>")]
#[allow(clippy::too_many_arguments)]
pub fn send_message(
    manager: &State<Arc<LiveStateManager>>,
    rate_limiter: &State<RateLimiter>,
    rate_config: &State<RateLimitConfig>,
    ip: ClientIp,
    session: Session,
    channel_id: &str,
    body: Json<Payload>,
) -> Result<Json<ChatMessage>, ApiError> {
    if !rate_limiter.check(
        &format!("send_msg:{}", ip.0),
        rate_config.messages_max,
        rate_config.messages_window_secs,
    ) {
        return Err((
            Status::TooManyRequests,
            Json(serde_json::json!({
                "error": format!("Rate limited: max {} messages per minute", rate_config.messages_max),
                "limit": rate_config.messages_max
            })),
        ));
    }

    if !valid_channel_id(channel_id) {
        return Err(api_error(Status::BadRequest, "Invalid channel id"));
    }

    let mut payload = body.into_inner();
    let text = payload
        .get("text")
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .unwrap_or_default();
    if text.is_empty() || text.len() > 10_000 {
        return Err(api_error(Status::BadRequest, "Text must be 1-10000 characters"));
    }

    // Sender comes from the session, never from the body
    payload.insert("text".into(), text.into());
    payload.insert("senderId".into(), session.account.id.clone().into());
    payload.insert("senderName".into(), session.account.name.clone().into());

    let message = manager.add_message(channel_id, payload);
    // Sending a message ends the sender's typing indicator
    manager.set_typing(channel_id, &session.account.id, false);
    Ok(Json(message))
}
