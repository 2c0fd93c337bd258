//! Logged image searches.

use serde::Serialize;
use sqlx::FromRow;
use wayfarer_core::types::{DbId, Timestamp};

/// A row from the `image_searches` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ImageSearch {
    pub id: DbId,
    pub user_id: String,
    pub detected_location: Option<String>,
    pub confidence_score: f64,
    pub created_at: Timestamp,
}

/// DTO for logging a completed search.
#[derive(Debug, Clone)]
pub struct CreateImageSearch {
    pub user_id: String,
    pub detected_location: Option<String>,
    pub confidence_score: f64,
}
