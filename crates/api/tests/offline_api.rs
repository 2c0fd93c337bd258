//! Integration tests for the offline bundle endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, post};
use sqlx::SqlitePool;
use wayfarer_db::repositories::OfflineDataRepo;

#[sqlx::test(migrations = "../db/migrations")]
async fn status_of_new_user_is_not_synced(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = get(&app, "/api/offline/status?user_id=alice").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["user_id"], "alice");
    assert_eq!(json["sync_status"], "not_synced");
    assert_eq!(json["items_count"], 0);
    assert_eq!(json["total_size_mb"], 0.0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn download_writes_bundle_and_updates_status(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = post(&app, "/api/offline/download?user_id=alice&destination_id=3").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "success");
    assert_eq!(json["data_type"], "map");
    assert_eq!(json["file_name"], "destination_3_map.json");
    assert!(json["file_size_kb"].as_f64().unwrap() > 0.0);
    assert!(json.get("file_path").is_none());

    let on_disk = app.cache_dir.join("alice").join("destination_3_map.json");
    let payload: serde_json::Value =
        serde_json::from_slice(&std::fs::read(on_disk).unwrap()).unwrap();
    assert_eq!(payload["destination_id"], 3);
    assert_eq!(payload["type"], "map");

    let json = body_json(get(&app, "/api/offline/status?user_id=alice").await).await;
    assert_eq!(json["sync_status"], "synced");
    assert_eq!(json["items_count"], 1);
    assert_eq!(json["items"][0]["name"], "destination_3_map.json");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn download_rejects_unknown_data_type(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = post(
        &app,
        "/api/offline/download?user_id=alice&destination_id=1&data_type=video",
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn download_rejects_path_like_user_id(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = post(&app, "/api/offline/download?user_id=..&destination_id=1").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(!app.cache_dir.join("destination_1_map.json").exists());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn download_over_allowance_conflicts(pool: SqlitePool) {
    let app = common::build_test_app_with(pool, None, 0);
    let response = post(&app, "/api/offline/download?user_id=alice&destination_id=1").await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn sync_without_data_reports_error(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = post(&app, "/api/offline/sync?user_id=nobody").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "error");
    assert_eq!(json["message"], "No offline data found");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn sync_counts_bundles_and_flags_rows(pool: SqlitePool) {
    let app = common::build_test_app(pool.clone());
    let mut events = app.subscribe();

    post(&app, "/api/offline/download?user_id=bob&destination_id=1&data_type=guide").await;
    post(&app, "/api/offline/download?user_id=bob&destination_id=2&data_type=hotels").await;
    app.flush_events(&mut events).await;

    let rows = OfflineDataRepo::list_for_user(&pool, "bob").await.unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| !r.is_synced));

    let json = body_json(post(&app, "/api/offline/sync?user_id=bob").await).await;
    assert_eq!(json["status"], "synced");
    assert_eq!(json["files_synced"], 2);
    app.flush_events(&mut events).await;

    let rows = OfflineDataRepo::list_for_user(&pool, "bob").await.unwrap();
    assert!(rows.iter().all(|r| r.is_synced));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn downloads_lists_recorded_bundles(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let mut events = app.subscribe();

    post(&app, "/api/offline/download?user_id=dana&destination_id=4&data_type=map").await;
    app.flush_events(&mut events).await;

    let response = get(&app, "/api/offline/downloads?user_id=dana").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let rows = json["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["destination_id"], 4);
    assert_eq!(rows[0]["data_type"], "map");
    assert_eq!(rows[0]["is_synced"], false);

    let response = get(&app, "/api/offline/downloads?user_id=..").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn storage_info_adds_up(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    post(&app, "/api/offline/download?user_id=alice&destination_id=1&data_type=itinerary").await;

    let json = body_json(get(&app, "/api/offline/storage-info?user_id=alice").await).await;
    assert_eq!(json["user_id"], "alice");
    assert_eq!(json["max_storage_mb"], 500);

    let used = json["used_mb"].as_f64().unwrap();
    let available = json["available_mb"].as_f64().unwrap();
    assert!((used + available - 500.0).abs() < 1e-9);
    assert!(json["usage_percentage"].as_f64().unwrap() >= 0.0);
}
