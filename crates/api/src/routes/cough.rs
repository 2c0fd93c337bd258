//! Route definitions for cough events.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::cough;
use crate::state::AppState;

/// Cough event routes.
///
/// ```text
/// GET    /health                          -> health
/// POST   /event                           -> record_event
/// GET    /device/{device_id}              -> device_events
/// GET    /device/{device_id}/range        -> events_in_range
/// GET    /stats/{device_id}/hour          -> hour_stats
/// GET    /stats/{device_id}/today         -> today_stats
/// GET    /stats/{device_id}/week          -> week_stats
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(cough::health))
        .route("/event", post(cough::record_event))
        .route("/device/{device_id}", get(cough::device_events))
        .route("/device/{device_id}/range", get(cough::events_in_range))
        .route("/stats/{device_id}/hour", get(cough::hour_stats))
        .route("/stats/{device_id}/today", get(cough::today_stats))
        .route("/stats/{device_id}/week", get(cough::week_stats))
}
