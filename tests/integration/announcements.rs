use rocket::http::{ContentType, Status};
use crate::common::{ADMIN, ALEX, bearer, login, test_client};

// --- Announcements ---

#[test]
fn test_announcements_newest_first() {
    let client = test_client();
    let admin = login(&client, ADMIN);

    for title in ["x", "y"] {
        let res = client
            .post("/api/v1/announcements")
            .header(ContentType::JSON)
            .header(bearer(&admin))
            .body(format!(r#"{{"title": "{title}", "body": "details"}}"#))
            .dispatch();
        assert_eq!(res.status(), Status::Ok);
        let a: serde_json::Value = res.into_json().unwrap();
        assert_eq!(a["title"], title);
        assert_eq!(a["author"], "Campus Admin");
        assert!(a["timestamp"].is_i64());
        // Two posts in the same millisecond would share an id
        std::thread::sleep(std::time::Duration::from_millis(2));
    }

    let list: Vec<serde_json::Value> = client
        .get("/api/v1/announcements")
        .dispatch()
        .into_json()
        .unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["title"], "y");
    assert_eq!(list[1]["title"], "x");

    let top: Vec<serde_json::Value> = client
        .get("/api/v1/announcements?limit=1")
        .dispatch()
        .into_json()
        .unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0]["title"], "y");
}

#[test]
fn test_students_cannot_announce() {
    let client = test_client();
    let alex = login(&client, ALEX);
    let res = client
        .post("/api/v1/announcements")
        .header(ContentType::JSON)
        .header(bearer(&alex))
        .body(r#"{"title": "free pizza"}"#)
        .dispatch();
    assert_eq!(res.status(), Status::Forbidden);

    let list: Vec<serde_json::Value> = client
        .get("/api/v1/announcements")
        .dispatch()
        .into_json()
        .unwrap();
    assert!(list.is_empty());
}

#[test]
fn test_announcement_requires_title() {
    let client = test_client();
    let admin = login(&client, ADMIN);
    let res = client
        .post("/api/v1/announcements")
        .header(ContentType::JSON)
        .header(bearer(&admin))
        .body(r#"{"body": "no title"}"#)
        .dispatch();
    assert_eq!(res.status(), Status::BadRequest);
}
