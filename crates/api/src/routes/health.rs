use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database is unreachable.
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    pub providers: Providers,
}

/// Which upstreams answer live and which fall back to canned data.
#[derive(Serialize)]
pub struct Providers {
    pub places: &'static str,
    pub photos: &'static str,
    pub vision: bool,
}

impl Providers {
    fn of(state: &AppState) -> Self {
        let config = &state.config;
        Self {
            places: if config.google_maps_api_key.is_some() { "google" } else { "demo" },
            photos: if config.unsplash_access_key.is_some() { "unsplash" } else { "placeholder" },
            vision: state.vision.is_some(),
        }
    }
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = wayfarer_db::health_check(&state.pool).await.is_ok();

    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        service: "Wayfarer Backend",
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        providers: Providers::of(&state),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
