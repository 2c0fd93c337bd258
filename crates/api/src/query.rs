//! Shared query parameter types for API handlers.
//!
//! Query structs that appear across several handler modules live here.

use serde::Deserialize;
use wayfarer_core::geo::{Coordinates, DEFAULT_LATITUDE, DEFAULT_LONGITUDE};

use crate::error::AppResult;

/// `?user_id=` on its own.
#[derive(Debug, Deserialize)]
pub struct UserParams {
    pub user_id: String,
}

/// Optional `?latitude=&longitude=`, defaulting to New York City.
///
/// Handlers taking further parameters repeat these two fields with the same
/// defaults, since `Query` cannot deserialize numbers through `#[serde(flatten)]`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LocationParams {
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
}

impl LocationParams {
    /// Range-checked coordinates.
    pub fn coordinates(&self) -> AppResult<Coordinates> {
        Ok(Coordinates::validated(self.latitude, self.longitude)?)
    }
}

pub fn default_latitude() -> f64 {
    DEFAULT_LATITUDE
}

pub fn default_longitude() -> f64 {
    DEFAULT_LONGITUDE
}

/// `?user_id=&limit=` for the activity history endpoints. The limit is
/// clamped in the handler via `clamp_limit`.
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub user_id: String,
    pub limit: Option<i64>,
}
