//! Handlers for the `/auth` resource: device API keys and login.
//!
//! A device is issued one API key at a time. Logging in with it returns a
//! bearer token accepted by the protected monitor routes.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use wayfarer_core::devices::{generate_api_key, validate_login_device_id};
use wayfarer_core::error::CoreError;
use wayfarer_db::repositories::DeviceRepo;

use crate::auth::jwt::generate_token;
use crate::auth::password::{hash_api_key, verify_api_key};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

const KEY_NOTICE: &str = "IMPORTANT: Save this API key securely. It will not be shown again!";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub device_id: String,
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub device_id: String,
    pub token_type: &'static str,
    /// Token lifetime in seconds.
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyResponse {
    pub device_id: String,
    /// Plaintext key, returned only here.
    pub api_key: String,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeResponse {
    pub message: &'static str,
    pub device_id: String,
}

#[derive(Debug, Serialize)]
pub struct ServiceHealth {
    pub status: &'static str,
    pub service: &'static str,
}

fn unauthorized(message: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(message.to_string()))
}

// ---------------------------------------------------------------------------
// POST /auth/generate-key/{device_id}
// ---------------------------------------------------------------------------

/// Issue a new API key, replacing any previous one.
pub async fn generate_key(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> AppResult<Json<ApiKeyResponse>> {
    if DeviceRepo::find_by_device_id(&state.pool, &device_id)
        .await?
        .is_none()
    {
        return Err(AppError::BadRequest(format!("Device not found: {device_id}")));
    }

    let api_key = generate_api_key();
    let key_hash = hash_api_key(&api_key)
        .map_err(|e| AppError::Core(CoreError::Internal(format!("API key hashing error: {e}"))))?;
    DeviceRepo::set_api_key(&state.pool, &device_id, &key_hash).await?;

    tracing::info!(device_id = %device_id, "API key issued");

    Ok(Json(ApiKeyResponse {
        device_id,
        api_key,
        message: KEY_NOTICE,
    }))
}

// ---------------------------------------------------------------------------
// POST /auth/login
// ---------------------------------------------------------------------------

/// Exchange a device id and API key for a bearer token.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    validate_login_device_id(&input.device_id)?;
    if input.api_key.trim().is_empty() {
        return Err(CoreError::Validation("API key is required".into()).into());
    }

    let device = DeviceRepo::find_by_device_id(&state.pool, &input.device_id)
        .await?
        .ok_or_else(|| unauthorized("Invalid credentials"))?;

    if !device.is_active {
        return Err(unauthorized("Device is deactivated"));
    }

    let key_hash = device
        .api_key_hash
        .as_deref()
        .ok_or_else(|| unauthorized("Device has no API key. Please generate one first."))?;

    let valid = verify_api_key(&input.api_key, key_hash)
        .map_err(|e| AppError::Core(CoreError::Internal(format!("API key verification error: {e}"))))?;
    if !valid {
        tracing::warn!(device_id = %device.device_id, "Rejected login with wrong API key");
        return Err(unauthorized("Invalid credentials"));
    }

    let token = generate_token(&device.device_id, &state.config.jwt)
        .map_err(|e| AppError::Core(CoreError::Internal(format!("Token generation error: {e}"))))?;

    tracing::info!(device_id = %device.device_id, "Device logged in");

    Ok(Json(LoginResponse {
        token,
        device_id: device.device_id,
        token_type: "Bearer",
        expires_in: state.config.jwt.expires_in_secs(),
    }))
}

// ---------------------------------------------------------------------------
// DELETE /auth/revoke/{device_id}
// ---------------------------------------------------------------------------

/// Forget a device's API key. Unknown devices are not an error.
pub async fn revoke(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> AppResult<Json<RevokeResponse>> {
    let cleared = DeviceRepo::clear_api_key(&state.pool, &device_id).await?;
    tracing::info!(device_id = %device_id, cleared, "API key revoked");

    Ok(Json(RevokeResponse {
        message: "API key revoked successfully",
        device_id,
    }))
}

// ---------------------------------------------------------------------------
// GET /auth/health
// ---------------------------------------------------------------------------

pub async fn health() -> Json<ServiceHealth> {
    Json(ServiceHealth {
        status: "healthy",
        service: "Authentication Service",
    })
}
