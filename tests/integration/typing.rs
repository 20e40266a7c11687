use campus_live::config::Config;
use rocket::http::{ContentType, Status};
use crate::common::{ALEX, SAM, bearer, login, test_client, test_client_with_config, test_config};

// --- Typing indicators ---

#[test]
fn test_typing_on_and_off() {
    let client = test_client();
    let alex = login(&client, ALEX);
    let sam = login(&client, SAM);

    let res = client
        .post("/api/v1/channels/general/typing")
        .header(ContentType::JSON)
        .header(bearer(&alex))
        .body(r#"{"is_typing": true}"#)
        .dispatch();
    assert_eq!(res.status(), Status::Ok);
    let body: serde_json::Value = res.into_json().unwrap();
    assert_eq!(body["channel_id"], "general");
    assert!(body["typing"]["student-1"].is_i64());

    let body: serde_json::Value = client
        .get("/api/v1/channels/general/typing")
        .header(bearer(&sam))
        .dispatch()
        .into_json()
        .unwrap();
    assert!(body["typing"]["student-1"].is_i64());

    let res = client
        .post("/api/v1/channels/general/typing")
        .header(ContentType::JSON)
        .header(bearer(&alex))
        .body(r#"{"is_typing": false}"#)
        .dispatch();
    let body: serde_json::Value = res.into_json().unwrap();
    assert!(body["typing"].as_object().unwrap().is_empty());
}

#[test]
fn test_typing_defaults_to_true() {
    let client = test_client();
    let alex = login(&client, ALEX);
    let body: serde_json::Value = client
        .post("/api/v1/channels/general/typing")
        .header(ContentType::JSON)
        .header(bearer(&alex))
        .body("{}")
        .dispatch()
        .into_json()
        .unwrap();
    assert!(body["typing"]["student-1"].is_i64());
}

#[test]
fn test_sending_message_clears_typing() {
    let client = test_client();
    let alex = login(&client, ALEX);
    client
        .post("/api/v1/channels/general/typing")
        .header(ContentType::JSON)
        .header(bearer(&alex))
        .body(r#"{"is_typing": true}"#)
        .dispatch();
    client
        .post("/api/v1/channels/general/messages")
        .header(ContentType::JSON)
        .header(bearer(&alex))
        .body(r#"{"text": "done typing"}"#)
        .dispatch();

    let body: serde_json::Value = client
        .get("/api/v1/channels/general/typing")
        .header(bearer(&alex))
        .dispatch()
        .into_json()
        .unwrap();
    assert!(body["typing"].as_object().unwrap().is_empty());
}

#[test]
fn test_typing_goes_stale() {
    let config = Config {
        typing_stale_ms: 300,
        ..test_config()
    };
    let client = test_client_with_config(config);
    let alex = login(&client, ALEX);

    let body: serde_json::Value = client
        .post("/api/v1/channels/general/typing")
        .header(ContentType::JSON)
        .header(bearer(&alex))
        .body(r#"{"is_typing": true}"#)
        .dispatch()
        .into_json()
        .unwrap();
    assert!(body["typing"]["student-1"].is_i64());

    std::thread::sleep(std::time::Duration::from_millis(400));

    let body: serde_json::Value = client
        .get("/api/v1/channels/general/typing")
        .header(bearer(&alex))
        .dispatch()
        .into_json()
        .unwrap();
    assert!(body["typing"].as_object().unwrap().is_empty());
}
