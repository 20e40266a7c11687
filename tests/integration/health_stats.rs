use rocket::http::Status;
use crate::common::test_client;

// --- Health ---

#[test]
fn test_health() {
    let client = test_client();
    let res = client.get("/api/v1/health").dispatch();
    assert_eq!(res.status(), Status::Ok);
    let body: serde_json::Value = res.into_json().unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "campus-live");
    assert_eq!(body["persistent"], true);
}

// --- Stats ---

#[test]
fn test_stats_default_snapshot() {
    let client = test_client();
    let res = client.get("/api/v1/stats").dispatch();
    assert_eq!(res.status(), Status::Ok);
    let body: serde_json::Value = res.into_json().unwrap();
    assert_eq!(body["connectedUsers"], 0);
    assert_eq!(body["activeChats"], 0);
    assert_eq!(body["systemHealth"], "operational");
    assert_eq!(body["uptime"], "99.9%");
    assert!(body.get("lastUpdated").is_none());
}

#[test]
fn test_unknown_route_is_json_404() {
    let client = test_client();
    let res = client.get("/api/v1/nope").dispatch();
    assert_eq!(res.status(), Status::NotFound);
    let body: serde_json::Value = res.into_json().unwrap();
    assert_eq!(body["error"], "Not found");
}
