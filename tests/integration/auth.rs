use rocket::http::{ContentType, Status};
use crate::common::{ADMIN, ALEX, bearer, login, test_client};

// --- Login / logout ---

#[test]
fn test_login_returns_token_and_account() {
    let client = test_client();
    let res = client
        .post("/api/v1/auth/login")
        .header(ContentType::JSON)
        .body(r#"{"email": "ADMIN@campus.local", "password": "admin123"}"#)
        .dispatch();
    assert_eq!(res.status(), Status::Ok);
    let body: serde_json::Value = res.into_json().unwrap();
    assert!(body["token"].as_str().unwrap().starts_with("sess_"));
    assert_eq!(body["account"]["role"], "admin");
    assert_eq!(body["account"]["id"], "admin-1");
}

#[test]
fn test_login_wrong_password() {
    let client = test_client();
    let res = client
        .post("/api/v1/auth/login")
        .header(ContentType::JSON)
        .body(r#"{"email": "alex@campus.local", "password": "nope"}"#)
        .dispatch();
    assert_eq!(res.status(), Status::Unauthorized);
    let body: serde_json::Value = res.into_json().unwrap();
    assert_eq!(body["error"], "Invalid email or password");
}

#[test]
fn test_me_requires_session() {
    let client = test_client();
    let res = client.get("/api/v1/auth/me").dispatch();
    assert_eq!(res.status(), Status::Unauthorized);

    let res = client
        .get("/api/v1/auth/me")
        .header(bearer("sess_bogus"))
        .dispatch();
    assert_eq!(res.status(), Status::Unauthorized);

    let token = login(&client, ALEX);
    let res = client.get("/api/v1/auth/me").header(bearer(&token)).dispatch();
    assert_eq!(res.status(), Status::Ok);
    let body: serde_json::Value = res.into_json().unwrap();
    assert_eq!(body["name"], "Alex Student");
    assert_eq!(body["role"], "student");
}

#[test]
fn test_login_registers_presence_and_logout_clears_it() {
    let client = test_client();
    let admin = login(&client, ADMIN);
    let alex = login(&client, ALEX);

    let users: Vec<serde_json::Value> = client
        .get("/api/v1/users")
        .header(bearer(&admin))
        .dispatch()
        .into_json()
        .unwrap();
    let alex_rec = users.iter().find(|u| u["id"] == "student-1").unwrap();
    assert_eq!(alex_rec["status"], "online");
    assert_eq!(alex_rec["name"], "Alex Student");
    assert!(alex_rec["lastSeen"].as_i64().unwrap() > 0);

    let res = client.post("/api/v1/auth/logout").header(bearer(&alex)).dispatch();
    assert_eq!(res.status(), Status::Ok);

    // Token no longer valid
    let res = client.get("/api/v1/auth/me").header(bearer(&alex)).dispatch();
    assert_eq!(res.status(), Status::Unauthorized);

    let users: Vec<serde_json::Value> = client
        .get("/api/v1/users")
        .header(bearer(&admin))
        .dispatch()
        .into_json()
        .unwrap();
    assert!(users.iter().all(|u| u["id"] != "student-1"));
}

#[test]
fn test_relogin_keeps_single_presence_record() {
    let client = test_client();
    let first = login(&client, ALEX);
    let _second = login(&client, ALEX);

    let users: Vec<serde_json::Value> = client
        .get("/api/v1/users")
        .header(bearer(&first))
        .dispatch()
        .into_json()
        .unwrap();
    assert_eq!(users.iter().filter(|u| u["id"] == "student-1").count(), 1);

    // Logging out one of two sessions keeps presence
    client.post("/api/v1/auth/logout").header(bearer(&first)).dispatch();
    let admin = login(&client, ADMIN);
    let users: Vec<serde_json::Value> = client
        .get("/api/v1/users")
        .header(bearer(&admin))
        .dispatch()
        .into_json()
        .unwrap();
    assert!(users.iter().any(|u| u["id"] == "student-1"));
}
