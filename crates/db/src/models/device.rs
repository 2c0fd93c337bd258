//! Cough monitor devices.

use serde::Serialize;
use sqlx::FromRow;
use wayfarer_core::types::{DbId, Timestamp};

/// A row from the `devices` table. The API key hash is never serialized.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: DbId,
    pub device_id: String,
    pub device_name: Option<String>,
    pub location: Option<String>,
    pub is_active: bool,
    #[serde(skip)]
    pub api_key_hash: Option<String>,
    #[serde(skip)]
    pub api_key_created_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for registering a device.
#[derive(Debug, Clone, Default)]
pub struct CreateDevice {
    pub device_id: String,
    pub device_name: Option<String>,
    pub location: Option<String>,
}

/// DTO for editing a device. `None` fields keep their value.
#[derive(Debug, Clone, Default)]
pub struct UpdateDevice {
    pub device_name: Option<String>,
    pub location: Option<String>,
}
