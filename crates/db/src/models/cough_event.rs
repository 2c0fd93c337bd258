//! Cough detections reported by devices.

use serde::Serialize;
use sqlx::FromRow;
use wayfarer_core::types::{DbId, Timestamp};

/// A row from the `cough_events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoughEvent {
    pub id: DbId,
    pub device_id: String,
    pub cough_type: String,
    pub confidence: f64,
    pub raw_score: Option<f64>,
    /// When the device heard the cough.
    pub timestamp: Timestamp,
    pub audio_volume: Option<f64>,
    pub created_at: Timestamp,
}

/// DTO for recording an event.
#[derive(Debug, Clone)]
pub struct CreateCoughEvent {
    pub device_id: String,
    pub cough_type: String,
    pub confidence: f64,
    pub raw_score: Option<f64>,
    pub timestamp: Timestamp,
    pub audio_volume: Option<f64>,
}
