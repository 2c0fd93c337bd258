#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tokio::sync::broadcast;
use tower::ServiceExt;

use wayfarer_api::auth::jwt::JwtConfig;
use wayfarer_api::config::ServerConfig;
use wayfarer_api::middleware::rate_limit::RateLimiter;
use wayfarer_api::router::build_app_router;
use wayfarer_api::state::AppState;
use wayfarer_clients::{
    placeholder_url, ClientError, CurrentWeather, Landmark, LandmarkDetector, PhotoLookup,
    PlaceSearch, Weather, WeatherLookup,
};
use wayfarer_core::geo::Coordinates;
use wayfarer_core::intent::Intent;
use wayfarer_core::offline::OfflineCache;
use wayfarer_core::places::{demo_places, Place};
use wayfarer_events::{ActivityEvent, EventBus, EventPersistence};

// ---------------------------------------------------------------------------
// Upstream stubs
// ---------------------------------------------------------------------------

/// Answers every search from the demo table.
pub struct DemoPlaces;

#[async_trait]
impl PlaceSearch for DemoPlaces {
    async fn nearby(&self, search_type: &str, _origin: Coordinates, _radius_m: u32) -> Vec<Place> {
        Intent::from_name(search_type)
            .map(demo_places)
            .unwrap_or_default()
    }
}

/// Mild weather everywhere.
pub struct FixedWeather;

#[async_trait]
impl WeatherLookup for FixedWeather {
    async fn current(&self, _at: Coordinates) -> Weather {
        Weather::Current(CurrentWeather {
            temperature_c: Some(21.5),
            wind_speed: Some(3.2),
            humidity: None,
            timezone: "America/New_York".to_string(),
        })
    }
}

/// Always the placeholder image.
pub struct PlaceholderPhotos;

#[async_trait]
impl PhotoLookup for PlaceholderPhotos {
    async fn photo_url(&self, query: &str) -> String {
        placeholder_url(query)
    }
}

/// Recognises every image as the same landmark, or fails when `broken`.
pub struct FixedLandmark {
    pub broken: bool,
}

#[async_trait]
impl LandmarkDetector for FixedLandmark {
    async fn detect(&self, _image: &[u8]) -> Result<Option<Landmark>, ClientError> {
        if self.broken {
            return Err(ClientError::Malformed("stub failure".into()));
        }
        Ok(Some(Landmark {
            description: "Eiffel Tower".to_string(),
            latitude: 48.8584,
            longitude: 2.2945,
            labels: vec!["tower".to_string(), "landmark".to_string()],
        }))
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// A test application plus the resources it owns.
pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
    pub event_bus: Arc<EventBus>,
    pub cache_dir: PathBuf,
    pub uploads_dir: PathBuf,
    _dir: TempDir,
}

impl TestApp {
    /// Subscribe before issuing requests to observe their activity events.
    pub fn subscribe(&self) -> broadcast::Receiver<ActivityEvent> {
        self.event_bus.subscribe()
    }

    /// Persist every event already published on `receiver`.
    pub async fn flush_events(&self, receiver: &mut broadcast::Receiver<ActivityEvent>) {
        while let Ok(event) = receiver.try_recv() {
            EventPersistence::persist(&self.pool, &event).await.unwrap();
        }
    }
}

/// Signing secret of every test application.
pub const JWT_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";

/// Build a test `ServerConfig` rooted in `dir`.
pub fn test_config(dir: &TempDir, max_cache_mb: u64) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_url: "sqlite::memory:".to_string(),
        offline_cache_dir: dir.path().join("offline_cache"),
        image_uploads_dir: dir.path().join("uploads"),
        max_cache_mb,
        google_maps_api_key: None,
        unsplash_access_key: None,
        google_vision_api_key: None,
        open_meteo_url: "http://127.0.0.1:9/v1/forecast".to_string(),
        jwt: JwtConfig {
            secret: JWT_SECRET.to_string(),
            expiration_ms: 3_600_000,
        },
        rate_limit_per_minute: 1_000,
    }
}

/// Build the full application with stubbed upstreams and no vision provider.
pub fn build_test_app(pool: SqlitePool) -> TestApp {
    build_test_app_with(pool, None, 500)
}

/// Build the full application, mirroring `main.rs` apart from the upstreams.
pub fn build_test_app_with(
    pool: SqlitePool,
    vision: Option<Arc<dyn LandmarkDetector>>,
    max_cache_mb: u64,
) -> TestApp {
    assemble(pool, vision, |config| config.max_cache_mb = max_cache_mb)
}

/// Build the application with a small per-client request budget.
pub fn build_rate_limited_app(pool: SqlitePool, per_minute: u32) -> TestApp {
    assemble(pool, None, |config| config.rate_limit_per_minute = per_minute)
}

fn assemble(
    pool: SqlitePool,
    vision: Option<Arc<dyn LandmarkDetector>>,
    configure: impl FnOnce(&mut ServerConfig),
) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(&dir, 500);
    configure(&mut config);
    let event_bus = Arc::new(EventBus::default());

    let state = AppState {
        pool: pool.clone(),
        offline_cache: Arc::new(OfflineCache::new(
            config.offline_cache_dir.clone(),
            config.max_cache_mb,
        )),
        config: Arc::new(config.clone()),
        places: Arc::new(DemoPlaces),
        weather: Arc::new(FixedWeather),
        photos: Arc::new(PlaceholderPhotos),
        vision,
        event_bus: Arc::clone(&event_bus),
        rate_limiter: Arc::new(RateLimiter::per_minute(config.rate_limit_per_minute)),
    };

    TestApp {
        router: build_app_router(state, &config),
        pool,
        event_bus,
        cache_dir: config.offline_cache_dir,
        uploads_dir: config.image_uploads_dir,
        _dir: dir,
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub const BOUNDARY: &str = "wayfarer-test-boundary";

pub async fn send(app: &TestApp, method: Method, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.router.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &TestApp, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri).await
}

pub async fn post(app: &TestApp, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri).await
}

/// POST a single file as `multipart/form-data`.
pub async fn post_file(
    app: &TestApp,
    uri: &str,
    field: &str,
    file_name: &str,
    data: &[u8],
) -> Response<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    app.router.clone().oneshot(request).await.unwrap()
}

/// Send a JSON body, with a bearer token when given.
pub async fn send_json(
    app: &TestApp,
    method: Method,
    uri: &str,
    body: serde_json::Value,
    token: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();
    app.router.clone().oneshot(request).await.unwrap()
}

/// Send a bodiless request with a bearer token.
pub async fn send_authed(app: &TestApp, method: Method, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.router.clone().oneshot(request).await.unwrap()
}

/// Register `device_id`, issue it an API key and log in. Returns the token.
pub async fn device_token(app: &TestApp, device_id: &str) -> String {
    let response = send_json(
        app,
        Method::POST,
        "/api/device/register",
        serde_json::json!({ "deviceId": device_id }),
        None,
    )
    .await;
    assert_eq!(response.status(), 201);

    let key = body_json(post(app, &format!("/api/auth/generate-key/{device_id}")).await).await;
    let api_key = key["apiKey"].as_str().unwrap().to_string();

    let login = send_json(
        app,
        Method::POST,
        "/api/auth/login",
        serde_json::json!({ "deviceId": device_id, "apiKey": api_key }),
        None,
    )
    .await;
    assert_eq!(login.status(), 200);
    body_json(login).await["token"].as_str().unwrap().to_string()
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
