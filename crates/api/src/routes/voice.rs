//! Route definitions for voice navigation.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::voice;
use crate::state::AppState;

/// Voice navigation routes.
///
/// ```text
/// POST   /process           -> process_command
/// POST   /transcribe-audio  -> transcribe_audio
/// GET    /nearby-search     -> nearby_search
/// GET    /weather           -> weather
/// GET    /history           -> history
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/process", post(voice::process_command))
        .route("/transcribe-audio", post(voice::transcribe_audio))
        .route("/nearby-search", get(voice::nearby_search))
        .route("/weather", get(voice::weather))
        .route("/history", get(voice::history))
}
