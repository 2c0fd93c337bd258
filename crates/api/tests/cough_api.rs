//! Integration tests for cough event ingest, listings, statistics and the
//! monitor rate limit.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use chrono::{DateTime, Duration, Utc};
use common::{body_json, device_token, get, send_authed, send_json, TestApp};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::ServiceExt;

const T0: i64 = 1_700_000_000_000;

async fn report(app: &TestApp, token: &str, body: Value) -> (StatusCode, Value) {
    let response = send_json(app, Method::POST, "/api/cough/event", body, Some(token)).await;
    (response.status(), body_json(response).await)
}

async fn authed_json(app: &TestApp, uri: &str, token: &str) -> Value {
    let response = send_authed(app, Method::GET, uri, token).await;
    assert_eq!(response.status(), StatusCode::OK, "{uri}");
    body_json(response).await
}

fn millis(value: &Value) -> i64 {
    DateTime::parse_from_rfc3339(value.as_str().unwrap())
        .unwrap()
        .timestamp_millis()
}

// ---------------------------------------------------------------------------
// Ingest
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn cough_health_is_public(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = get(&app, "/api/cough/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], "Airea Cough Monitor API");
    assert!(json["timestamp"].is_string());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn event_registers_unknown_device(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let token = device_token(&app, "ESP32_HALL").await;

    let (status, json) = report(
        &app,
        &token,
        json!({
            "deviceId": "ESP32_NEW",
            "coughType": "Dry",
            "confidence": 0.92,
            "rawScore": 3.4,
            "timestamp": T0,
            "audioVolume": 0.6,
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(json["id"].as_i64().unwrap() > 0);
    assert_eq!(json["deviceId"], "ESP32_NEW");
    assert_eq!(json["coughType"], "Dry");
    assert_eq!(json["confidence"], 0.92);
    assert_eq!(json["rawScore"], 3.4);
    assert_eq!(json["audioVolume"], 0.6);
    assert_eq!(millis(&json["timestamp"]), T0);
    assert!(json["createdAt"].is_string());

    let device = authed_json(&app, "/api/device/ESP32_NEW", &token).await;
    assert_eq!(device["isActive"], true);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn event_without_timestamp_uses_receive_time(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let token = device_token(&app, "ESP32_HALL").await;
    let before = Utc::now().timestamp_millis();

    let (status, json) = report(
        &app,
        &token,
        json!({ "deviceId": "ESP32_HALL", "coughType": "wet", "confidence": 0.5 }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let stamped = millis(&json["timestamp"]);
    assert!(stamped >= before - 1 && stamped <= Utc::now().timestamp_millis());
    assert!(json["rawScore"].is_null());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn invalid_events_are_rejected(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let token = device_token(&app, "ESP32_HALL").await;

    let cases = [
        (json!({ "deviceId": "ESP32_HALL", "coughType": "dry" }), "confidence is required"),
        (
            json!({ "deviceId": "ESP32_HALL", "coughType": "dry", "confidence": 1.5 }),
            "confidence must be between 0 and 1",
        ),
        (json!({ "deviceId": "ESP32_HALL", "confidence": 0.5 }), "coughType is required"),
        (json!({ "coughType": "dry", "confidence": 0.5 }), "Device ID is required"),
    ];
    for (body, message) in cases {
        let (status, json) = report(&app, &token, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{message}");
        assert_eq!(json["error"], message);
    }

    let response = send_json(
        &app,
        Method::POST,
        "/api/cough/event",
        json!({ "deviceId": "ESP32_HALL", "coughType": "dry", "confidence": 0.5 }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Listings
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn events_by_device_and_range(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let token = device_token(&app, "ESP32_HALL").await;
    for (offset, kind) in [(0, "dry"), (60_000, "wet"), (120_000, "dry")] {
        let body = json!({
            "deviceId": "ESP32_HALL",
            "coughType": kind,
            "confidence": 0.8,
            "timestamp": T0 + offset,
        });
        assert_eq!(report(&app, &token, body).await.0, StatusCode::CREATED);
    }

    let all = authed_json(&app, "/api/cough/device/ESP32_HALL", &token).await;
    let all = all.as_array().unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(millis(&all[0]["timestamp"]), T0 + 120_000);

    let uri = format!("/api/cough/device/ESP32_HALL/range?start={T0}&end={}", T0 + 60_000);
    let range = authed_json(&app, &uri, &token).await;
    let kinds: Vec<&str> = range
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["coughType"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["wet", "dry"]);

    let other = authed_json(&app, "/api/cough/device/ESP32_OTHER", &token).await;
    assert!(other.as_array().unwrap().is_empty());

    let uri = format!("/api/cough/device/ESP32_HALL/range?start={}&end={T0}", T0 + 1);
    let response = send_authed(&app, Method::GET, &uri, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn statistics_per_window(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let token = device_token(&app, "ESP32_HALL").await;

    for (kind, confidence) in [("dry", 0.9), ("DRY", 0.7), ("wet", 0.5), ("whoop", 0.3)] {
        let body = json!({ "deviceId": "ESP32_HALL", "coughType": kind, "confidence": confidence });
        assert_eq!(report(&app, &token, body).await.0, StatusCode::CREATED);
    }
    let three_days_ago = (Utc::now() - Duration::days(3)).timestamp_millis();
    let body = json!({
        "deviceId": "ESP32_HALL",
        "coughType": "wet",
        "confidence": 0.6,
        "timestamp": three_days_ago,
    });
    assert_eq!(report(&app, &token, body).await.0, StatusCode::CREATED);

    let hour = authed_json(&app, "/api/cough/stats/ESP32_HALL/hour", &token).await;
    assert_eq!(hour["period"], "hour");
    assert_eq!(hour["totalCoughs"], 4);
    assert_eq!(hour["dryCoughs"], 2);
    assert_eq!(hour["wetCoughs"], 1);
    assert_eq!(hour["unknownCoughs"], 1);
    assert!((hour["averageConfidence"].as_f64().unwrap() - 0.6).abs() < 1e-9);
    assert_eq!(hour["coughsPerHour"], 4.0);
    assert_eq!(hour["mostCommonType"], "dry");

    let today = authed_json(&app, "/api/cough/stats/ESP32_HALL/today", &token).await;
    assert_eq!(today["period"], "day");
    assert_eq!(today["totalCoughs"], 4);

    let week = authed_json(&app, "/api/cough/stats/ESP32_HALL/week", &token).await;
    assert_eq!(week["period"], "week");
    assert_eq!(week["totalCoughs"], 5);
    assert_eq!(week["wetCoughs"], 2);
    assert!((week["coughsPerHour"].as_f64().unwrap() - 5.0 / 168.0).abs() < 1e-9);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn statistics_without_events(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let token = device_token(&app, "ESP32_HALL").await;

    let stats = authed_json(&app, "/api/cough/stats/ESP32_QUIET/hour", &token).await;
    assert_eq!(stats["totalCoughs"], 0);
    assert_eq!(stats["averageConfidence"], 0.0);
    assert_eq!(stats["coughsPerHour"], 0.0);
    assert_eq!(stats["mostCommonType"], "none");

    let response = get(&app, "/api/cough/stats/ESP32_QUIET/hour").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Rate limiting
// ---------------------------------------------------------------------------

async fn from_client(app: &TestApp, uri: &str, client: &str) -> StatusCode {
    let request = Request::builder()
        .uri(uri)
        .header("x-forwarded-for", client)
        .body(Body::empty())
        .unwrap();
    app.router.clone().oneshot(request).await.unwrap().status()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn monitor_routes_are_rate_limited_per_client(pool: SqlitePool) {
    let app = common::build_rate_limited_app(pool, 3);

    for _ in 0..3 {
        assert_eq!(from_client(&app, "/api/cough/health", "203.0.113.7").await, StatusCode::OK);
    }
    let request = Request::builder()
        .uri("/api/auth/health")
        .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Too many requests. Please try again later.");
    assert_eq!(json["code"], "RATE_LIMITED");

    // Another client still has its budget.
    assert_eq!(from_client(&app, "/api/cough/health", "198.51.100.2").await, StatusCode::OK);

    // Travel routes are not limited.
    assert_eq!(from_client(&app, "/health", "203.0.113.7").await, StatusCode::OK);
    assert_eq!(
        from_client(&app, "/api/image/popular-destinations", "203.0.113.7").await,
        StatusCode::OK
    );
}
