//! Users known to the service, keyed by their client-supplied `user_id`.

use serde::Serialize;
use sqlx::FromRow;
use wayfarer_core::types::{DbId, Timestamp};

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub user_id: String,
    pub created_at: Timestamp,
    pub language: String,
    pub latitude: f64,
    pub longitude: f64,
}
