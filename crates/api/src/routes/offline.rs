//! Route definitions for offline bundles.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::offline;
use crate::state::AppState;

/// Offline cache routes.
///
/// ```text
/// GET    /status            -> status
/// POST   /download          -> download
/// POST   /sync              -> sync
/// GET    /storage-info      -> storage_info
/// GET    /downloads         -> downloads
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status", get(offline::status))
        .route("/download", post(offline::download))
        .route("/sync", post(offline::sync))
        .route("/storage-info", get(offline::storage_info))
        .route("/downloads", get(offline::downloads))
}
