use crate::manager::LiveStateManager;
use crate::models::SystemStats;
use rocket::serde::json::Json;
use rocket::{get, State};
use std::sync::Arc;

#[get("/api/v1/health")]
pub fn health(manager: &State<Arc<LiveStateManager>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "campus-live",
        "version": env!("CARGO_PKG_VERSION"),
        "persistent": manager.is_persistent()
    }))
}

#[get("/api/v1/stats")]
pub fn stats(manager: &State<Arc<LiveStateManager>>) -> Json<SystemStats> {
    Json(manager.get_system_stats())
}

#[rocket::catch(401)]
pub fn unauthorized() -> Json<serde_json::Value> {
    Json(serde_json::json!({"error": "Login required"}))
}

#[rocket::catch(403)]
pub fn forbidden() -> Json<serde_json::Value> {
    Json(serde_json::json!({"error": "Forbidden"}))
}

#[rocket::catch(429)]
pub fn too_many_requests() -> Json<serde_json::Value> {
    Json(serde_json::json!({"error": "Too many requests"}))
}

#[rocket::catch(404)]
pub fn not_found() -> Json<serde_json::Value> {
    Json(serde_json::json!({"error": "Not found"}))
}
