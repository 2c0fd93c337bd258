//! Integration tests for the voice navigation endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, post, post_file};
use sqlx::SqlitePool;

// ---------------------------------------------------------------------------
// POST /api/voice/process
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn process_finds_coffee_with_weather_and_photo(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = post(&app, "/api/voice/process?user_id=alice&text_input=Find%20coffee").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    assert_eq!(json["status"], "success");
    assert_eq!(json["intent"], "coffee");
    assert_eq!(json["message"], "Found 1 coffees");
    assert_eq!(json["user_id"], "alice");
    assert_eq!(json["command"], "Find coffee");
    assert_eq!(json["user_location"]["latitude"], 40.7128);

    let destination = &json["destinations"][0];
    assert_eq!(destination["name"], "Brew Haven");
    assert_eq!(destination["distance_km"], 0.5);
    assert_eq!(destination["rating"], 4.7);
    assert_eq!(destination["weather"]["temperature_c"], 21.5);
    assert_eq!(destination["weather"]["humidity"], "N/A");
    assert_eq!(
        destination["photo_url"],
        "https://via.placeholder.com/400x300?text=COFFEE"
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn process_unrecognised_command_fails_softly(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = post(&app, "/api/voice/process?user_id=alice&text_input=sing%20a%20song").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "failed");
    assert!(json["intent"].is_null());
    assert_eq!(json["destinations"].as_array().unwrap().len(), 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn process_intent_without_places_reports_no_results(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = post(&app, "/api/voice/process?user_id=alice&text_input=show%20me%20a%20museum").await;

    let json = body_json(response).await;
    assert_eq!(json["status"], "no_results");
    assert_eq!(json["intent"], "museum");
    assert_eq!(json["message"], "No museums found nearby");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn process_rejects_out_of_range_coordinates(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = post(
        &app,
        "/api/voice/process?user_id=alice&text_input=coffee&latitude=91&longitude=0",
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn process_rejects_unsafe_user_id(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = post(&app, "/api/voice/process?user_id=..&text_input=coffee").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn process_requires_text_input(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = post(&app, "/api/voice/process?user_id=alice").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn process_records_user_location(pool: SqlitePool) {
    let app = common::build_test_app(pool.clone());
    post(
        &app,
        "/api/voice/process?user_id=carol&text_input=hotel&latitude=51.5074&longitude=-0.1278",
    )
    .await;

    let (latitude, longitude): (f64, f64) =
        sqlx::query_as("SELECT latitude, longitude FROM users WHERE user_id = ?1")
            .bind("carol")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!((latitude - 51.5074).abs() < 1e-9);
    assert!((longitude + 0.1278).abs() < 1e-9);
}

// ---------------------------------------------------------------------------
// POST /api/voice/transcribe-audio
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn transcribe_audio_runs_simulated_transcription(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = post_file(
        &app,
        "/api/voice/transcribe-audio?user_id=alice",
        "audio_file",
        "Command.WAV",
        b"RIFF....WAVE",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["filename"], "Command.WAV");
    assert_eq!(json["transcription"], "Find restaurants nearby");
    assert_eq!(json["intent"], "restaurant");
    assert_eq!(json["destinations"][0]["name"], "Italian Kitchen");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn transcribe_audio_rejects_unknown_format(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = post_file(
        &app,
        "/api/voice/transcribe-audio?user_id=alice",
        "audio_file",
        "notes.txt",
        b"hello",
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Unsupported audio format");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn transcribe_audio_requires_the_file_field(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = post_file(
        &app,
        "/api/voice/transcribe-audio?user_id=alice",
        "attachment",
        "clip.wav",
        b"RIFF",
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Missing audio_file field");
}

// ---------------------------------------------------------------------------
// GET /api/voice/nearby-search and /api/voice/weather
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn nearby_search_enriches_places_with_weather(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = get(&app, "/api/voice/nearby-search?search_type=hotel&radius=1000").await;

    let json = body_json(response).await;
    assert_eq!(json["status"], "success");
    assert_eq!(json["search_type"], "hotel");
    assert_eq!(json["total_results"], 1);
    assert_eq!(json["destinations"][0]["name"], "Grand Hotel");
    assert_eq!(json["destinations"][0]["lat"], 40.7158);
    assert_eq!(json["destinations"][0]["weather"]["wind_speed"], 3.2);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn nearby_search_without_results(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = get(&app, "/api/voice/nearby-search?search_type=museum").await;

    let json = body_json(response).await;
    assert_eq!(json["status"], "no_results");
    assert_eq!(json["message"], "No museums found");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn weather_defaults_to_new_york(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = get(&app, "/api/voice/weather").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["location"]["latitude"], 40.7128);
    assert_eq!(json["location"]["longitude"], -74.006);
    assert_eq!(json["weather"]["timezone"], "America/New_York");
}

// ---------------------------------------------------------------------------
// GET /api/voice/history
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn history_lists_logged_commands_newest_first(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let mut events = app.subscribe();

    post(&app, "/api/voice/process?user_id=dave&text_input=coffee").await;
    post(&app, "/api/voice/process?user_id=dave&text_input=find%20an%20atm").await;
    post(&app, "/api/voice/process?user_id=erin&text_input=hotel").await;
    app.flush_events(&mut events).await;

    let json = body_json(get(&app, "/api/voice/history?user_id=dave").await).await;
    let data = json["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["transcription"], "find an atm");
    assert_eq!(data[0]["command_type"], "atm");
    assert_eq!(data[0]["results_count"], 0);
    assert_eq!(data[1]["command_type"], "coffee");
    assert_eq!(data[1]["results_count"], 1);

    let json = body_json(get(&app, "/api/voice/history?user_id=dave&limit=1").await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}
