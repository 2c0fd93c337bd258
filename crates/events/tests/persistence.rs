//! Integration tests for activity event persistence.

use std::sync::Arc;

use sqlx::SqlitePool;
use wayfarer_db::repositories::{ImageSearchRepo, OfflineDataRepo, VoiceCommandRepo};
use wayfarer_events::{ActivityEvent, EventBus, EventPersistence};

#[sqlx::test(migrations = "../db/migrations")]
async fn test_persist_creates_user_and_logs_command(pool: SqlitePool) {
    let event = ActivityEvent::voice_command("alice", "find coffee", Some("coffee"), 1);
    EventPersistence::persist(&pool, &event).await.unwrap();

    let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE user_id = ?1")
        .bind("alice")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(users, 1);
    let rows = VoiceCommandRepo::list_recent(&pool, "alice", 20).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].command_type.as_deref(), Some("coffee"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_download_then_sync(pool: SqlitePool) {
    let download = ActivityEvent::offline_download("bob", 2, "map", "/cache/bob/d.json", 512);
    EventPersistence::persist(&pool, &download).await.unwrap();
    EventPersistence::persist(&pool, &ActivityEvent::offline_sync("bob", 1))
        .await
        .unwrap();

    let rows = OfflineDataRepo::list_for_user(&pool, "bob").await.unwrap();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].is_synced);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_run_loop_drains_until_bus_dropped(pool: SqlitePool) {
    let bus = Arc::new(EventBus::default());
    let receiver = bus.subscribe();
    let handle = tokio::spawn(EventPersistence::run(pool.clone(), receiver));

    bus.publish(ActivityEvent::image_search("carol", Some("Sacred Temple"), 0.88));
    bus.publish(ActivityEvent::image_search("carol", None, 0.0));
    drop(bus);

    handle.await.unwrap();
    let rows = ImageSearchRepo::list_recent(&pool, "carol", 20).await.unwrap();
    assert_eq!(rows.len(), 2);
}
