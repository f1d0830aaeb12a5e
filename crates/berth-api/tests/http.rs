use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use berth_api::{AppState, AppStateInner, router};
use berth_db::Database;
use chrono::FixedOffset;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

fn state() -> AppState {
    let db = Database::open_in_memory(FixedOffset::east_opt(3 * 3600).unwrap()).unwrap();
    Arc::new(AppStateInner { db })
}

fn app() -> Router {
    router(state())
}

async fn send(app: &Router, method: &str, uri: &str, form: Option<&str>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match form {
        Some(form) => builder
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn create_user(app: &Router, username: &str) -> i64 {
    let form = format!("username={username}&password=secret1");
    let (status, body) = send(app, "POST", "/api/user", Some(&form)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["id"].as_i64().unwrap()
}

async fn create_booking(app: &Router, user_id: i64, start: &str, end: &str) -> (StatusCode, Value) {
    let form = format!("user_id={user_id}&start_time={start}&end_time={end}&comment=");
    send(app, "POST", "/api/booking", Some(&form)).await
}

#[tokio::test]
async fn user_roundtrip_hashes_password() {
    let app = app();
    let (status, created) =
        send(&app, "POST", "/api/user", Some("username=alice&password=secret1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["username"], "alice");
    assert_ne!(created["password"], "secret1");
    assert_eq!(created["created_at"], created["updated_at"]);

    let id = created["id"].as_i64().unwrap();
    let (status, fetched) = send(&app, "GET", &format!("/api/user/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn unknown_user_is_empty_object() {
    let app = app();
    for _ in 0..2 {
        let (status, body) = send(&app, "GET", "/api/user/12345", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({}));
    }
}

#[tokio::test]
async fn non_numeric_id_is_bad_request() {
    let app = app();
    let (status, body) = send(&app, "GET", "/api/booking/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().starts_with(r#"invalid id "abc""#));
}

#[tokio::test]
async fn control_chars_in_id_still_give_json() {
    let app = app();
    let (status, body) = send(&app, "GET", "/api/user/1%0A2", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().starts_with(r#"invalid id "1\n2""#), "{body}");
}

#[tokio::test]
async fn invalid_user_input_is_rejected() {
    let app = app();

    let form = "username=al%2Fice&password=secret1";
    let (status, body) = send(&app, "POST", "/api/user", Some(form)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "banned symbols in username");

    let form = "username=al&password=secret1";
    let (status, body) = send(&app, "POST", "/api/user", Some(form)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "incorrect username length (3 <= length <= 20)");

    let form = "username=alice&password=123";
    let (status, body) = send(&app, "POST", "/api/user", Some(form)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "incorrect password length (6 <= length <= 20)");
}

#[tokio::test]
async fn duplicate_username_is_bad_request() {
    let app = app();
    create_user(&app, "bob").await;

    let form = "username=bob&password=other12";
    let (status, body) = send(&app, "POST", "/api/user", Some(form)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "username already exists");
}

#[tokio::test]
async fn update_user_fields() {
    let app = app();
    let id = create_user(&app, "carol").await;
    create_user(&app, "dave").await;
    let (_, before) = send(&app, "GET", &format!("/api/user/{id}"), None).await;

    let (status, body) = send(&app, "PUT", &format!("/api/user/{id}"), Some("username=dave")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "username already exists");

    let (status, after) = send(
        &app,
        "PUT",
        &format!("/api/user/{id}"),
        Some("username=caroline&password=newpass1"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(after["username"], "caroline");
    assert_ne!(after["password"], before["password"]);
    assert_eq!(after["created_at"], before["created_at"]);

    // blank fields keep what is stored
    let uri = format!("/api/user/{id}");
    let (status, same) = send(&app, "PUT", &uri, Some("username=&password=")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(same["username"], "caroline");
    assert_eq!(same["password"], after["password"]);

    let (status, body) = send(&app, "PUT", "/api/user/999", Some("username=ghost")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "user wasn't found");
}

#[tokio::test]
async fn update_user_refreshes_updated_at() {
    let state = state();
    let app = router(state.clone());
    let id = create_user(&app, "kate").await;
    state
        .db
        .in_transaction(|tx| {
            tx.execute(
                "UPDATE users SET created_at = '2000-01-01 00:00:00',
                    updated_at = '2000-01-01 00:00:00' WHERE id = ?1",
                [id],
            )?;
            Ok(())
        })
        .unwrap();

    let uri = format!("/api/user/{id}");
    let (status, body) = send(&app, "PUT", &uri, Some("username=katie")).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["created_at"], "2000-01-01 00:00:00");
    assert_ne!(body["updated_at"], "2000-01-01 00:00:00");
}

#[tokio::test]
async fn put_without_body_changes_nothing() {
    let app = app();
    let id = create_user(&app, "liam").await;
    let uri = format!("/api/user/{id}");
    let (_, before) = send(&app, "GET", &uri, None).await;

    let (status, after) = send(&app, "PUT", &uri, None).await;
    assert_eq!(status, StatusCode::OK, "{after}");
    assert_eq!(after["username"], "liam");
    assert_eq!(after["password"], before["password"]);
}

#[tokio::test]
async fn unknown_form_fields_are_ignored() {
    let app = app();
    let form = "username=mia&password=secret1&email=a%40b.c";
    let (status, body) = send(&app, "POST", "/api/user", Some(form)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["username"], "mia");
}

#[tokio::test]
async fn malformed_forms_are_json_bad_requests() {
    let app = app();
    let user_id = create_user(&app, "noah").await;

    let form = format!("user_id={user_id}&user_id=2&start_time=x&end_time=y");
    let (status, body) = send(&app, "POST", "/api/booking", Some(&form)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string(), "{body}");

    let request = Request::builder()
        .method("POST")
        .uri("/api/user")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"username":"noah2"}"#))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["message"].is_string(), "{body}");
}

#[tokio::test]
async fn booking_requires_existing_user() {
    let app = app();
    let (status, body) =
        create_booking(&app, 42, "2023-10-01%2012:00:00", "2023-10-01%2014:30:00").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "user with this user_id doesn't exist");

    let (_, list) = send(&app, "GET", "/api/booking", None).await;
    assert_eq!(list["count"], 0);

    let (status, body) = send(&app, "POST", "/api/booking", Some("start_time=x")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "user_id isn`t set");
}

#[tokio::test]
async fn booking_window_is_checked() {
    let app = app();
    let user_id = create_user(&app, "erin").await;

    let (status, body) =
        create_booking(&app, user_id, "2023-10-01%2012:00:00", "2023-10-01%2012:00:00").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "incorrect time duration");

    let (status, body) = create_booking(&app, user_id, "noon", "2023-10-01%2012:00:00").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "incorrect start_time");
}

#[tokio::test]
async fn booking_create_accepts_iso_times() {
    let app = app();
    let user_id = create_user(&app, "frank").await;

    let (status, body) =
        create_booking(&app, user_id, "2023-10-01T12:00:00Z", "2023-10-01T14:30:00Z").await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["user_id"], user_id);
    assert_eq!(body["start_time"], "2023-10-01 12:00:00");
    assert_eq!(body["end_time"], "2023-10-01 14:30:00");
    assert_eq!(body["comment"], "");
}

#[tokio::test]
async fn update_booking_keeps_blank_times() {
    let app = app();
    let user_id = create_user(&app, "grace").await;
    let (_, created) =
        create_booking(&app, user_id, "2023-10-01%2012:00:00", "2023-10-01%2014:30:00").await;
    let id = created["id"].as_i64().unwrap();
    let uri = format!("/api/booking/{id}");

    let (status, body) = send(
        &app,
        "PUT",
        &uri,
        Some("end_time=2023-10-01%2016:00:00&comment=running%20late"),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["start_time"], "2023-10-01 12:00:00");
    assert_eq!(body["end_time"], "2023-10-01 16:00:00");
    assert_eq!(body["comment"], "running late");

    let (status, body) = send(&app, "PUT", &uri, Some("end_time=2023-10-01%2011:00:00")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "incorrect time duration");

    let (status, body) = send(&app, "PUT", "/api/booking/999", Some("comment=")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "booking wasn't found");
}

#[tokio::test]
async fn list_bookings_pagination() {
    let app = app();
    let user_id = create_user(&app, "heidi").await;
    let mut ids = Vec::new();
    for _ in 0..5 {
        let (_, b) =
            create_booking(&app, user_id, "2023-10-01%2012:00:00", "2023-10-01%2014:30:00").await;
        ids.push(b["id"].as_i64().unwrap());
    }
    let listed = |body: &Value| -> Vec<i64> {
        body["rows"]
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["id"].as_i64().unwrap())
            .collect()
    };

    let (status, body) = send(&app, "GET", "/api/booking?limit=2&page=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 5);
    assert_eq!(listed(&body), ids[2..4].to_vec());

    let (_, body) = send(&app, "GET", "/api/booking?limit=2&offset=1&page=3", None).await;
    assert_eq!(listed(&body), ids[1..3].to_vec());

    let (_, body) = send(&app, "GET", "/api/booking?page=2", None).await;
    assert_eq!(listed(&body), ids);

    let (status, _) = send(&app, "GET", "/api/booking?limit=abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_user_cascades() {
    let app = app();
    let user_id = create_user(&app, "ivan").await;
    let (_, b1) =
        create_booking(&app, user_id, "2023-10-01%2012:00:00", "2023-10-01%2014:30:00").await;
    let (_, b2) =
        create_booking(&app, user_id, "2023-10-02%2012:00:00", "2023-10-02%2014:30:00").await;

    let (status, body) = send(&app, "DELETE", &format!("/api/user/{user_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "user was successfully deleted");

    for b in [b1, b2] {
        let (status, body) = send(&app, "GET", &format!("/api/booking/{}", b["id"]), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({}));
    }

    let (status, body) = send(&app, "DELETE", &format!("/api/user/{user_id}"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "user with this id doesn't exist");
}

#[tokio::test]
async fn delete_booking_once() {
    let app = app();
    let user_id = create_user(&app, "judy").await;
    let (_, b) =
        create_booking(&app, user_id, "2023-10-01%2012:00:00", "2023-10-01%2014:30:00").await;
    let uri = format!("/api/booking/{}", b["id"]);

    let (status, body) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "booking was successfully deleted");

    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, user) = send(&app, "GET", &format!("/api/user/{user_id}"), None).await;
    assert_eq!(user["username"], "judy");
}

#[tokio::test]
async fn health_check() {
    let app = app();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
