//! Offline cache bookkeeping rows.

use serde::Serialize;
use sqlx::FromRow;
use wayfarer_core::types::{DbId, Timestamp};

/// A row from the `offline_data` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OfflineData {
    pub id: DbId,
    pub user_id: String,
    pub destination_id: DbId,
    pub data_type: String,
    pub cached_at: Timestamp,
    pub file_path: String,
    pub file_size: i64,
    pub is_synced: bool,
}

/// DTO for recording a completed offline download.
#[derive(Debug, Clone)]
pub struct CreateOfflineData {
    pub user_id: String,
    pub destination_id: DbId,
    pub data_type: String,
    pub file_path: String,
    pub file_size: i64,
}
