use rocket::http::{ContentType, Status};
use crate::common::{ADMIN, ALEX, SAM, bearer, login, test_client};

// --- Presence status ---

#[test]
fn test_update_own_status() {
    let client = test_client();
    let alex = login(&client, ALEX);

    let res = client
        .put("/api/v1/users/student-1/status")
        .header(ContentType::JSON)
        .header(bearer(&alex))
        .body(r#"{"status": "away"}"#)
        .dispatch();
    assert_eq!(res.status(), Status::Ok);
    let body: serde_json::Value = res.into_json().unwrap();
    assert_eq!(body["userId"], "student-1");
    assert_eq!(body["status"], "away");

    let users: Vec<serde_json::Value> = client
        .get("/api/v1/users")
        .header(bearer(&alex))
        .dispatch()
        .into_json()
        .unwrap();
    assert_eq!(users[0]["status"], "away");
}

#[test]
fn test_student_cannot_change_other_status() {
    let client = test_client();
    let alex = login(&client, ALEX);
    let _sam = login(&client, SAM);

    let res = client
        .put("/api/v1/users/student-2/status")
        .header(ContentType::JSON)
        .header(bearer(&alex))
        .body(r#"{"status": "busy"}"#)
        .dispatch();
    assert_eq!(res.status(), Status::Forbidden);
}

#[test]
fn test_status_for_offline_user_is_404_and_changes_nothing() {
    let client = test_client();
    let admin = login(&client, ADMIN);

    let before: Vec<serde_json::Value> = client
        .get("/api/v1/users")
        .header(bearer(&admin))
        .dispatch()
        .into_json()
        .unwrap();

    let res = client
        .put("/api/v1/users/ghost/status")
        .header(ContentType::JSON)
        .header(bearer(&admin))
        .body(r#"{"status": "online"}"#)
        .dispatch();
    assert_eq!(res.status(), Status::NotFound);

    let after: Vec<serde_json::Value> = client
        .get("/api/v1/users")
        .header(bearer(&admin))
        .dispatch()
        .into_json()
        .unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_status_validation() {
    let client = test_client();
    let alex = login(&client, ALEX);
    let res = client
        .put("/api/v1/users/student-1/status")
        .header(ContentType::JSON)
        .header(bearer(&alex))
        .body(r#"{"status": "   "}"#)
        .dispatch();
    assert_eq!(res.status(), Status::BadRequest);
}

#[test]
fn test_admin_removes_user() {
    let client = test_client();
    let admin = login(&client, ADMIN);
    let alex = login(&client, ALEX);

    let res = client
        .delete("/api/v1/users/admin-1")
        .header(bearer(&alex))
        .dispatch();
    assert_eq!(res.status(), Status::Forbidden);

    let res = client
        .delete("/api/v1/users/student-1")
        .header(bearer(&admin))
        .dispatch();
    assert_eq!(res.status(), Status::Ok);

    let users: Vec<serde_json::Value> = client
        .get("/api/v1/users")
        .header(bearer(&admin))
        .dispatch()
        .into_json()
        .unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["id"], "admin-1");
}
