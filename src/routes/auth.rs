use crate::directory::{Account, UserDirectory};
use crate::manager::LiveStateManager;
use crate::models::{LoginRequest, LoginResponse, UserInput};
use crate::rate_limit::{RateLimitConfig, RateLimiter};
use log::info;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{get, post, State};
use std::sync::Arc;

use super::{ApiError, ClientIp, Session, Sessions, api_error};

#[post("/api/v1/auth/login", format = "json", data = "<body>")]
#[allow(clippy::too_many_arguments)]
pub fn login(
    manager: &State<Arc<LiveStateManager>>,
    directory: &State<UserDirectory>,
    sessions: &State<Sessions>,
    rate_limiter: &State<RateLimiter>,
    rate_config: &State<RateLimitConfig>,
    ip: ClientIp,
    body: Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if !rate_limiter.check(
        &format!("login:{}", ip.0),
        rate_config.login_max,
        rate_config.login_window_secs,
    ) {
        return Err((
            Status::TooManyRequests,
            Json(serde_json::json!({
                "error": format!("Rate limited: max {} logins per minute", rate_config.login_max),
                "limit": rate_config.login_max
            })),
        ));
    }

    let Some(account) = directory.authenticate(&body.email, &body.password) else {
        return Err(api_error(Status::Unauthorized, "Invalid email or password"));
    };

    let token = sessions.start(&account.id);
    manager.add_user(
        UserInput::new(account.id.clone())
            .with_status("online")
            .with_field("name", account.name.clone())
            .with_field("role", serde_json::to_value(account.role).unwrap_or_default()),
    );
    info!("{} logged in", account.id);

    Ok(Json(LoginResponse { token, account }))
}

#[post("/api/v1/auth/logout")]
pub fn logout(
    manager: &State<Arc<LiveStateManager>>,
    sessions: &State<Sessions>,
    session: Session,
) -> Json<serde_json::Value> {
    sessions.end(&session.token);
    // Keep presence while another session for the same account is live
    if !sessions.has_account(&session.account.id) {
        manager.remove_user(&session.account.id);
    }
    info!("{} logged out", session.account.id);
    Json(serde_json::json!({"ok": true}))
}

#[get("/api/v1/auth/me")]
pub fn me(session: Session) -> Json<Account> {
    Json(session.account)
}
