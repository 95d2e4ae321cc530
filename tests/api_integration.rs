//! HTTP API integration tests
//!
//! These drive the full router against in-memory SQLite storage.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use disctracker::api::create_api_router;
use disctracker::config::PaginationConfig;
use disctracker::storage::{SqliteStorage, Storage};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

async fn create_test_storage() -> Arc<dyn Storage> {
    let storage = SqliteStorage::new("sqlite::memory:", 1).await.unwrap();
    storage.init().await.unwrap();
    Arc::new(storage)
}

fn test_pagination() -> PaginationConfig {
    PaginationConfig {
        cursor_hmac_secret: Some("api-test-secret".to_string()),
        ..Default::default()
    }
}

async fn create_app() -> Router {
    create_api_router(create_test_storage().await, test_pagination())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_disc(app: &Router, id: &str) {
    let (status, _) = send(
        app,
        Method::POST,
        "/discs",
        Some(json!({
            "id": id,
            "manufacturer": "Innova",
            "plastic": "Champion",
            "name": "Roc3"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

async fn check_in(app: &Router, disc_id: &str, body: Value) -> Value {
    let (status, value) = send(app, Method::POST, &format!("/checkin/{disc_id}"), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "check in failed: {value}");
    value
}

fn check_in_body(username: &str, state: &str, lat: f64, lon: f64) -> Value {
    json!({
        "username": username,
        "courseName": "Course1",
        "city": "City1",
        "state": state,
        "zip": "11111",
        "country": "United States",
        "latitude": lat,
        "longitude": lon,
        "note": "I am a note"
    })
}

#[tokio::test]
async fn test_health_check() {
    let app = create_app().await;
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "OK");
}

#[tokio::test]
async fn test_disc_crud() {
    let app = create_app().await;
    create_disc(&app, "12345").await;

    let (status, body) = send(&app, Method::GET, "/discs/12345", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Roc3");
    assert_eq!(body["imgUrl"], Value::Null);

    let (status, body) = send(
        &app,
        Method::POST,
        "/discs",
        Some(json!({"id": "12345", "manufacturer": "A", "plastic": "B", "name": "C"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["status"], 409);

    let (status, body) = send(
        &app,
        Method::PATCH,
        "/discs/12345",
        Some(json!({"imgUrl": "https://example.com/roc.png"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["imgUrl"], "https://example.com/roc.png");

    let (status, body) = send(&app, Method::GET, "/discs?name=roc", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, Method::DELETE, "/discs/12345", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, Method::GET, "/discs/12345", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["status"], 404);
}

#[tokio::test]
async fn test_create_disc_rejects_blank_fields() {
    let app = create_app().await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/discs",
        Some(json!({"id": "", "manufacturer": "A", "plastic": "B", "name": "C"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "id must not be empty");
}

#[tokio::test]
async fn test_stats_for_three_check_ins() {
    let app = create_app().await;
    create_disc(&app, "12345").await;

    check_in(&app, "12345", check_in_body("u1", "Massachusetts", 42.10, -72.58)).await;
    check_in(&app, "12345", check_in_body("u2", "Massachusetts", 42.10, -72.58)).await;
    check_in(&app, "12345", check_in_body("u3", "Unknown Region", 40.71, -74.00)).await;

    let (status, stats) = send(&app, Method::GET, "/checkin/12345/stats", None).await;
    assert_eq!(status, StatusCode::OK);

    let distance = stats["distance"].as_f64().unwrap();
    assert!(distance > 150.0 && distance < 220.0, "distance was {distance}");
    assert_eq!(stats["stateCount"], 1);
    assert_eq!(stats["userCount"], 3);
    assert_eq!(stats["countryCount"], 1);
    assert_eq!(stats["courseCount"], 1);

    let (status, body) = send(&app, Method::GET, "/checkin/distance/12345", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["distance"].as_f64().unwrap(), distance);
}

#[tokio::test]
async fn test_stats_for_unknown_disc_is_not_found() {
    let app = create_app().await;

    let (status, body) = send(&app, Method::GET, "/checkin/00000/stats", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "disc 00000 not found");

    let (status, _) = send(&app, Method::GET, "/checkin/distance/00000", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stats_for_disc_without_check_ins_is_zero() {
    let app = create_app().await;
    create_disc(&app, "67891").await;

    let (status, stats) = send(&app, Method::GET, "/checkin/67891/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        stats,
        json!({
            "distance": 0.0,
            "stateCount": 0,
            "userCount": 0,
            "countryCount": 0,
            "courseCount": 0
        })
    );
}

#[tokio::test]
async fn test_check_in_validation() {
    let app = create_app().await;
    create_disc(&app, "12345").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/checkin/12345",
        Some(check_in_body("u1", "Ohio", 95.0, -83.0)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("latitude"));

    let (status, _) = send(
        &app,
        Method::POST,
        "/checkin/00000",
        Some(check_in_body("u1", "Ohio", 40.0, -83.0)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let mut blank_course = check_in_body("u1", "Ohio", 40.0, -83.0);
    blank_course["courseName"] = json!("");
    let (status, _) = send(&app, Method::POST, "/checkin/12345", Some(blank_course)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_check_in_update_and_delete() {
    let app = create_app().await;
    create_disc(&app, "12345").await;
    let created = check_in(&app, "12345", check_in_body("u1", "Ohio", 40.0, -83.0)).await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/checkin/id/{id}"),
        Some(json!({"note": "moved", "latitude": 41.5})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["note"], "moved");
    assert_eq!(body["latitude"], "41.5");
    assert_eq!(body["longitude"], "-83");

    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/checkin/id/{id}"),
        Some(json!({"longitude": -200.0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::DELETE, &format!("/checkin/id/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::GET, &format!("/checkin/id/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_disc_check_ins_paginate_with_cursor() {
    let app = create_app().await;
    create_disc(&app, "12345").await;
    for i in 0..5 {
        check_in(
            &app,
            "12345",
            check_in_body(&format!("u{i}"), "Vermont", 44.0 + i as f64, -72.0),
        )
        .await;
    }

    let (status, first) = send(&app, Method::GET, "/checkin/12345?limit=2", None).await;
    assert_eq!(status, StatusCode::OK);
    let first_items = first["items"].as_array().unwrap();
    assert_eq!(first_items.len(), 2);
    assert_eq!(first_items[0]["username"], "u0");
    let cursor = first["nextCursor"].as_str().unwrap().to_string();

    let mut usernames: Vec<String> = first_items
        .iter()
        .map(|c| c["username"].as_str().unwrap().to_string())
        .collect();
    let mut next = Some(cursor);
    while let Some(cursor) = next {
        let (status, page) = send(
            &app,
            Method::GET,
            &format!("/checkin/12345?limit=2&cursor={cursor}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        usernames.extend(
            page["items"]
                .as_array()
                .unwrap()
                .iter()
                .map(|c| c["username"].as_str().unwrap().to_string()),
        );
        next = page["nextCursor"].as_str().map(str::to_string);
    }

    assert_eq!(usernames, vec!["u0", "u1", "u2", "u3", "u4"]);

    let (status, newest_first) =
        send(&app, Method::GET, "/checkin/12345?direction=DESC&limit=1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(newest_first["items"][0]["username"], "u4");
}

#[tokio::test]
async fn test_tampered_cursor_is_rejected() {
    let app = create_app().await;
    create_disc(&app, "12345").await;

    let (status, _) = send(&app, Method::GET, "/checkin/12345?cursor=abc.def", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_check_ins_by_user_and_course_filter() {
    let app = create_app().await;
    create_disc(&app, "12345").await;
    check_in(&app, "12345", check_in_body("u1", "Maine", 44.0, -70.0)).await;
    check_in(&app, "12345", check_in_body("u2", "Maine", 44.1, -70.0)).await;

    let (status, page) = send(&app, Method::GET, "/checkin/user/u2", None).await;
    assert_eq!(status, StatusCode::OK);
    let items = page["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["username"], "u2");

    let (status, page) = send(&app, Method::GET, "/checkin?courseName=course1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["items"].as_array().unwrap().len(), 2);
    assert_eq!(page["nextCursor"], Value::Null);

    let (status, _) = send(&app, Method::GET, "/checkin/99999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_courses_listing() {
    let storage = create_test_storage().await;
    for name in ["Maple Hill", "Borderland", "Maple Ridge"] {
        storage
            .add_course(&disctracker::models::NewCourse {
                course_name: name.to_string(),
                city: None,
                state: Some("Massachusetts".to_string()),
                zip: None,
                country: Some("United States".to_string()),
                holes: Some(18),
            })
            .await
            .unwrap();
    }
    let app = create_api_router(storage, test_pagination());

    let (status, body) = send(&app, Method::GET, "/courses?courseName=maple", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["courseName"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Maple Hill", "Maple Ridge"]);
}

#[tokio::test]
async fn test_direction_is_lenient() {
    let app = create_app().await;
    create_disc(&app, "12345").await;
    check_in(&app, "12345", check_in_body("u0", "Maine", 44.0, -70.0)).await;
    check_in(&app, "12345", check_in_body("u1", "Maine", 44.1, -70.0)).await;

    let (status, page) = send(&app, Method::GET, "/checkin/12345?direction=desc", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["items"][0]["username"], "u1");

    let (status, page) = send(&app, Method::GET, "/checkin/12345?direction=sideways", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["items"][0]["username"], "u0", "disc listing defaults to oldest first");

    let (status, page) = send(&app, Method::GET, "/checkin?direction=sideways", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["items"][0]["username"], "u1", "global listing defaults to newest first");

    let (status, page) = send(&app, Method::GET, "/checkin?direction=asc", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["items"][0]["username"], "u0");
}

#[tokio::test]
async fn test_malformed_requests_use_json_error_body() {
    let app = create_app().await;
    create_disc(&app, "12345").await;

    let mut missing_latitude = check_in_body("u1", "Ohio", 40.0, -83.0);
    missing_latitude.as_object_mut().unwrap().remove("latitude");
    let (status, body) = send(&app, Method::POST, "/checkin/12345", Some(missing_latitude)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["status"], 400);
    assert!(body["error"]["message"].as_str().unwrap().contains("latitude"));

    let (status, body) = send(&app, Method::GET, "/checkin?limit=lots", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["status"], 400);

    let (status, body) = send(&app, Method::GET, "/checkin/id/not-a-number", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["status"], 400);
}

#[tokio::test]
async fn test_partial_updates_reject_blank_required_fields() {
    let app = create_app().await;
    create_disc(&app, "12345").await;
    let created = check_in(&app, "12345", check_in_body("u1", "Ohio", 40.0, -83.0)).await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/checkin/id/{id}"),
        Some(json!({"state": "", "courseName": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "courseName must not be empty");

    let (_, unchanged) = send(&app, Method::GET, &format!("/checkin/id/{id}"), None).await;
    assert_eq!(unchanged["state"], "Ohio");
    assert_eq!(unchanged["courseName"], "Course1");

    let (status, body) = send(
        &app,
        Method::PATCH,
        "/discs/12345",
        Some(json!({"name": "   "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "name must not be empty");
}

#[tokio::test]
async fn test_unbounded_page_size_settings_do_not_overflow() {
    let pagination = PaginationConfig {
        cursor_hmac_secret: Some("api-test-secret".to_string()),
        default_page_size: i64::MAX,
        max_page_size: i64::MAX,
    };
    let app = create_api_router(create_test_storage().await, pagination);
    create_disc(&app, "12345").await;
    check_in(&app, "12345", check_in_body("u1", "Ohio", 40.0, -83.0)).await;

    let (status, page) = send(
        &app,
        Method::GET,
        &format!("/checkin/12345?limit={}", i64::MAX),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["items"].as_array().unwrap().len(), 1);
    assert_eq!(page["nextCursor"], Value::Null);
}
