use axum::routing::get;
use axum::Router;

use crate::handlers::info;
use crate::state::AppState;

/// Static informational routes.
///
/// ```text
/// GET /             -> welcome
/// GET /features     -> list_features
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(info::welcome))
        .route("/features", get(info::list_features))
}
