use rocket::http::{ContentType, Status};
use campus_live::config::Config;
use crate::common::{ALEX, bearer, login, test_client_with_config, test_config};

// --- Configurable Rate Limits ---

#[test]
fn test_custom_message_rate_limit() {
    let mut config = test_config();
    config.rate_limits.messages_max = 3;
    let client = test_client_with_config(config);
    let alex = login(&client, ALEX);

    for i in 0..3 {
        let res = client
            .post("/api/v1/channels/general/messages")
            .header(ContentType::JSON)
            .header(bearer(&alex))
            .body(format!(r#"{{"text": "msg {i}"}}"#))
            .dispatch();
        assert_eq!(res.status(), Status::Ok, "Message {i} should succeed");
    }

    let res = client
        .post("/api/v1/channels/general/messages")
        .header(ContentType::JSON)
        .header(bearer(&alex))
        .body(r#"{"text": "too many"}"#)
        .dispatch();
    assert_eq!(res.status(), Status::TooManyRequests);
    let body: serde_json::Value = res.into_json().unwrap();
    assert!(body["error"].as_str().unwrap().contains("3"));
    assert_eq!(body["limit"], 3);
}

#[test]
fn test_custom_login_rate_limit() {
    let config = Config {
        rate_limits: campus_live::rate_limit::RateLimitConfig {
            login_max: 2,
            ..Default::default()
        },
        ..test_config()
    };
    let client = test_client_with_config(config);

    for _ in 0..2 {
        let res = client
            .post("/api/v1/auth/login")
            .header(ContentType::JSON)
            .body(r#"{"email": "alex@campus.local", "password": "wrong"}"#)
            .dispatch();
        assert_eq!(res.status(), Status::Unauthorized);
    }

    // Even the right password is refused once the budget is spent
    let res = client
        .post("/api/v1/auth/login")
        .header(ContentType::JSON)
        .body(r#"{"email": "alex@campus.local", "password": "student123"}"#)
        .dispatch();
    assert_eq!(res.status(), Status::TooManyRequests);
}
