//! Handlers for the `/cough` resource: event ingest, listings and statistics.
//!
//! Everything except the health check requires a device token.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use wayfarer_core::cough::{
    now_millis, require_cough_type, timestamp_from_millis, validate_confidence, CoughStatistics,
    StatsPeriod,
};
use wayfarer_core::devices::require_device_id;
use wayfarer_core::error::CoreError;
use wayfarer_core::types::Timestamp;
use wayfarer_db::models::cough_event::{CoughEvent, CreateCoughEvent};
use wayfarer_db::models::device::CreateDevice;
use wayfarer_db::repositories::{CoughEventRepo, DeviceRepo};

use crate::error::AppResult;
use crate::middleware::auth::AuthDevice;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CoughHealth {
    pub status: &'static str,
    pub service: &'static str,
    pub timestamp: Timestamp,
}

// ---------------------------------------------------------------------------
// GET /cough/health
// ---------------------------------------------------------------------------

pub async fn health() -> Json<CoughHealth> {
    Json(CoughHealth {
        status: "healthy",
        service: "Airea Cough Monitor API",
        timestamp: chrono::Utc::now(),
    })
}

// ---------------------------------------------------------------------------
// POST /cough/event
// ---------------------------------------------------------------------------

/// Request body for `POST /cough/event`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoughEventRequest {
    #[serde(default)]
    pub device_id: String,
    #[serde(default)]
    pub cough_type: String,
    pub confidence: Option<f64>,
    pub raw_score: Option<f64>,
    /// Unix time in milliseconds; the receive time when absent.
    pub timestamp: Option<i64>,
    pub audio_volume: Option<f64>,
}

/// Store a detection, registering the reporting device on first sight.
pub async fn record_event(
    State(state): State<AppState>,
    auth: AuthDevice,
    Json(input): Json<CoughEventRequest>,
) -> AppResult<(StatusCode, Json<CoughEvent>)> {
    let device_id = require_device_id(&input.device_id)?;
    let cough_type = require_cough_type(&input.cough_type)?;
    let confidence = input
        .confidence
        .ok_or_else(|| CoreError::Validation("confidence is required".into()))?;
    validate_confidence(confidence)?;
    let timestamp = match input.timestamp {
        Some(millis) => timestamp_from_millis(millis)?,
        None => now_millis(),
    };

    DeviceRepo::register(
        &state.pool,
        &CreateDevice {
            device_id: device_id.to_string(),
            ..Default::default()
        },
    )
    .await?;

    let event = CoughEventRepo::create(
        &state.pool,
        &CreateCoughEvent {
            device_id: device_id.to_string(),
            cough_type: cough_type.to_string(),
            confidence,
            raw_score: input.raw_score,
            timestamp,
            audio_volume: input.audio_volume,
        },
    )
    .await?;

    tracing::info!(
        event_id = event.id,
        device_id = %event.device_id,
        cough_type = %event.cough_type,
        confidence = event.confidence,
        reported_by = %auth.device_id,
        "Cough event recorded"
    );

    Ok((StatusCode::CREATED, Json(event)))
}

// ---------------------------------------------------------------------------
// GET /cough/device/{device_id}
// ---------------------------------------------------------------------------

pub async fn device_events(
    State(state): State<AppState>,
    _auth: AuthDevice,
    Path(device_id): Path<String>,
) -> AppResult<Json<Vec<CoughEvent>>> {
    let events = CoughEventRepo::list_for_device(&state.pool, &device_id).await?;
    Ok(Json(events))
}

// ---------------------------------------------------------------------------
// GET /cough/device/{device_id}/range
// ---------------------------------------------------------------------------

/// `?start=&end=` as Unix milliseconds, both inclusive.
#[derive(Debug, Deserialize)]
pub struct RangeParams {
    pub start: i64,
    pub end: i64,
}

pub async fn events_in_range(
    State(state): State<AppState>,
    _auth: AuthDevice,
    Path(device_id): Path<String>,
    Query(params): Query<RangeParams>,
) -> AppResult<Json<Vec<CoughEvent>>> {
    let start = timestamp_from_millis(params.start)?;
    let end = timestamp_from_millis(params.end)?;
    if start > end {
        return Err(CoreError::Validation("start must not be after end".into()).into());
    }

    let events = CoughEventRepo::list_in_range(&state.pool, &device_id, start, end).await?;
    Ok(Json(events))
}

// ---------------------------------------------------------------------------
// GET /cough/stats/{device_id}/{hour,today,week}
// ---------------------------------------------------------------------------

pub async fn hour_stats(
    State(state): State<AppState>,
    _auth: AuthDevice,
    Path(device_id): Path<String>,
) -> AppResult<Json<CoughStatistics>> {
    statistics(&state, &device_id, StatsPeriod::Hour).await
}

pub async fn today_stats(
    State(state): State<AppState>,
    _auth: AuthDevice,
    Path(device_id): Path<String>,
) -> AppResult<Json<CoughStatistics>> {
    statistics(&state, &device_id, StatsPeriod::Today).await
}

pub async fn week_stats(
    State(state): State<AppState>,
    _auth: AuthDevice,
    Path(device_id): Path<String>,
) -> AppResult<Json<CoughStatistics>> {
    statistics(&state, &device_id, StatsPeriod::Week).await
}

async fn statistics(
    state: &AppState,
    device_id: &str,
    period: StatsPeriod,
) -> AppResult<Json<CoughStatistics>> {
    let (start, end) = period.window(chrono::Utc::now());
    let tallies = CoughEventRepo::tally_by_type(&state.pool, device_id, start, end).await?;
    Ok(Json(CoughStatistics::from_tallies(&tallies, start, end, period)))
}
