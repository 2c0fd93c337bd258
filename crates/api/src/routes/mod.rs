pub mod auth;
pub mod cough;
pub mod device;
pub mod health;
pub mod image;
pub mod info;
pub mod offline;
pub mod voice;

use axum::Router;

use crate::state::AppState;

/// Build the travel `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /voice/process                       run a text command (POST)
/// /voice/transcribe-audio              run an uploaded audio command (POST, multipart)
/// /voice/nearby-search                 places of a type with weather
/// /voice/weather                       current weather
/// /voice/history                       logged commands for a user
///
/// /offline/status                      cached bundles for a user
/// /offline/download                    cache a destination bundle (POST)
/// /offline/sync                        mark cached bundles synced (POST)
/// /offline/storage-info                usage against the allowance
/// /offline/downloads                   recorded downloads for a user
///
/// /image/search                        identify a destination (POST, multipart)
/// /image/popular-destinations          recognisable destinations
/// /image/popular-destinations/{id}     one destination
/// /image/history                       logged searches for a user
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/voice", voice::router())
        .nest("/offline", offline::router())
        .nest("/image", image::router())
}

/// Build the cough monitor `/api` route tree, mounted behind the rate limiter.
///
/// ```text
/// /auth/generate-key/{device_id}       issue an API key (POST)
/// /auth/login                          API key for a bearer token (POST)
/// /auth/revoke/{device_id}             drop the API key (DELETE)
/// /auth/health                         liveness
///
/// /cough/health                        liveness
/// /cough/event                         record a detection (POST, token)
/// /cough/device/{device_id}            events of a device (token)
/// /cough/device/{device_id}/range      events between two instants (token)
/// /cough/stats/{device_id}/{window}    hour, today or week summary (token)
///
/// /device/register                     register a device (POST)
/// /device/active                       active devices (token)
/// /device/all                          every device (token)
/// /device/{device_id}                  read, edit (PUT) or deactivate (DELETE) (token)
/// ```
pub fn monitor_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/cough", cough::router())
        .nest("/device", device::router())
}
