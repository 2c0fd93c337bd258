//! Route definitions for image search.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::image;
use crate::state::AppState;

/// Largest accepted image upload.
const MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

/// Image search routes.
///
/// ```text
/// POST   /search                       -> search
/// GET    /popular-destinations         -> popular_destinations
/// GET    /popular-destinations/{id}    -> destination
/// GET    /history                      -> history
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/search",
            post(image::search).layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES)),
        )
        .route("/popular-destinations", get(image::popular_destinations))
        .route("/popular-destinations/{id}", get(image::destination))
        .route("/history", get(image::history))
}
