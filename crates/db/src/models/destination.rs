//! Recognisable destinations.

use serde::Serialize;
use sqlx::FromRow;
use wayfarer_core::types::DbId;

/// A row from the `destinations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Destination {
    pub id: DbId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub description: String,
    pub country: String,
    pub category: String,
    pub rating: f64,
    pub photo_url: Option<String>,
}
