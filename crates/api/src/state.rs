use std::sync::Arc;

use wayfarer_clients::{
    GooglePlacesClient, GoogleVisionClient, LandmarkDetector, OpenMeteoClient, PhotoLookup,
    PlaceSearch, UnsplashClient, WeatherLookup,
};
use wayfarer_core::offline::OfflineCache;
use wayfarer_events::EventBus;

use crate::config::ServerConfig;
use crate::middleware::rate_limit::RateLimiter;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: wayfarer_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Per-user offline bundle storage.
    pub offline_cache: Arc<OfflineCache>,
    pub places: Arc<dyn PlaceSearch>,
    pub weather: Arc<dyn WeatherLookup>,
    pub photos: Arc<dyn PhotoLookup>,
    /// Landmark detection, only when a vision key is configured.
    pub vision: Option<Arc<dyn LandmarkDetector>>,
    /// Activity events, persisted in the background.
    pub event_bus: Arc<EventBus>,
    /// Request budget for the cough monitor routes.
    pub rate_limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Wire the upstream clients described by `config` around a shared HTTP client.
    pub fn new(
        pool: wayfarer_db::DbPool,
        config: ServerConfig,
        http: reqwest::Client,
        event_bus: Arc<EventBus>,
    ) -> Self {
        let places = GooglePlacesClient::new(http.clone(), config.google_maps_api_key.clone());
        let weather = OpenMeteoClient::new(http.clone(), config.open_meteo_url.clone());
        let photos = UnsplashClient::new(http.clone(), config.unsplash_access_key.clone());
        let vision = config
            .google_vision_api_key
            .clone()
            .map(|key| Arc::new(GoogleVisionClient::new(http, key)) as Arc<dyn LandmarkDetector>);

        tracing::info!(
            places_live = config.google_maps_api_key.is_some(),
            photos_live = config.unsplash_access_key.is_some(),
            vision_live = vision.is_some(),
            "Upstream clients configured"
        );

        Self {
            pool,
            rate_limiter: Arc::new(RateLimiter::per_minute(config.rate_limit_per_minute)),
            offline_cache: Arc::new(OfflineCache::new(
                config.offline_cache_dir.clone(),
                config.max_cache_mb,
            )),
            config: Arc::new(config),
            places: Arc::new(places),
            weather: Arc::new(weather),
            photos: Arc::new(photos),
            vision,
            event_bus,
        }
    }
}
