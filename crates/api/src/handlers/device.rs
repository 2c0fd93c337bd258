//! Handlers for the `/device` resource.
//!
//! Registration is open so a new sensor can bootstrap its API key; the
//! other routes require a device token.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use wayfarer_core::devices::require_device_id;
use wayfarer_core::error::CoreError;
use wayfarer_db::models::device::{CreateDevice, Device, UpdateDevice};
use wayfarer_db::repositories::DeviceRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthDevice;
use crate::state::AppState;

fn not_found(device_id: &str) -> CoreError {
    CoreError::NotFound {
        entity: "Device",
        id: device_id.to_string(),
    }
}

// ---------------------------------------------------------------------------
// POST /device/register
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDeviceRequest {
    #[serde(default)]
    pub device_id: String,
    pub device_name: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterDeviceResponse {
    pub success: bool,
    pub message: &'static str,
    pub device: Device,
}

/// Register a device. An existing device is returned unchanged.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterDeviceRequest>,
) -> AppResult<(StatusCode, Json<RegisterDeviceResponse>)> {
    let device_id = require_device_id(&input.device_id)?;
    let device = DeviceRepo::register(
        &state.pool,
        &CreateDevice {
            device_id: device_id.to_string(),
            device_name: input.device_name,
            location: input.location,
        },
    )
    .await?;

    tracing::info!(device_id = %device.device_id, "Device registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterDeviceResponse {
            success: true,
            message: "Device registered successfully",
            device,
        }),
    ))
}

// ---------------------------------------------------------------------------
// GET /device/active, GET /device/all
// ---------------------------------------------------------------------------

pub async fn list_active(
    State(state): State<AppState>,
    _auth: AuthDevice,
) -> AppResult<Json<Vec<Device>>> {
    Ok(Json(DeviceRepo::list_active(&state.pool).await?))
}

pub async fn list_all(
    State(state): State<AppState>,
    _auth: AuthDevice,
) -> AppResult<Json<Vec<Device>>> {
    Ok(Json(DeviceRepo::list_all(&state.pool).await?))
}

// ---------------------------------------------------------------------------
// GET /device/{device_id}
// ---------------------------------------------------------------------------

pub async fn get(
    State(state): State<AppState>,
    _auth: AuthDevice,
    Path(device_id): Path<String>,
) -> AppResult<Json<Device>> {
    let device = DeviceRepo::find_by_device_id(&state.pool, &device_id)
        .await?
        .ok_or_else(|| not_found(&device_id))?;
    Ok(Json(device))
}

// ---------------------------------------------------------------------------
// PUT /device/{device_id}
// ---------------------------------------------------------------------------

/// Request body for `PUT /device/{device_id}`. Omitted fields are kept.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDeviceRequest {
    pub device_name: Option<String>,
    pub location: Option<String>,
}

pub async fn update(
    State(state): State<AppState>,
    _auth: AuthDevice,
    Path(device_id): Path<String>,
    Json(input): Json<UpdateDeviceRequest>,
) -> AppResult<Json<Device>> {
    let device = DeviceRepo::update(
        &state.pool,
        &device_id,
        &UpdateDevice {
            device_name: input.device_name,
            location: input.location,
        },
    )
    .await?
    .ok_or_else(|| not_found(&device_id))?;

    tracing::info!(device_id = %device_id, "Device updated");
    Ok(Json(device))
}

// ---------------------------------------------------------------------------
// DELETE /device/{device_id}
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Deactivate a device. Its history and row are kept.
pub async fn deactivate(
    State(state): State<AppState>,
    _auth: AuthDevice,
    Path(device_id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    if !DeviceRepo::deactivate(&state.pool, &device_id).await? {
        return Err(not_found(&device_id).into());
    }

    tracing::info!(device_id = %device_id, "Device deactivated");
    Ok(Json(MessageResponse {
        message: "Device deactivated successfully",
    }))
}
