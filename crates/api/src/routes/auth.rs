//! Route definitions for device authentication.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Auth routes. None of them require a token.
///
/// ```text
/// POST   /generate-key/{device_id}   -> generate_key
/// POST   /login                      -> login
/// DELETE /revoke/{device_id}         -> revoke
/// GET    /health                     -> health
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate-key/{device_id}", post(auth::generate_key))
        .route("/login", post(auth::login))
        .route("/revoke/{device_id}", delete(auth::revoke))
        .route("/health", get(auth::health))
}
