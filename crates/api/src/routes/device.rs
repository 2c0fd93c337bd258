//! Route definitions for device management.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::device;
use crate::state::AppState;

/// Device routes.
///
/// ```text
/// POST   /register         -> register
/// GET    /active           -> list_active
/// GET    /all              -> list_all
/// GET    /{device_id}      -> get
/// PUT    /{device_id}      -> update
/// DELETE /{device_id}      -> deactivate
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(device::register))
        .route("/active", get(device::list_active))
        .route("/all", get(device::list_all))
        .route(
            "/{device_id}",
            get(device::get).put(device::update).delete(device::deactivate),
        )
}
