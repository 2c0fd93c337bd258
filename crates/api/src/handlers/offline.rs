//! Handlers for offline destination bundles.
//!
//! Bundles live on disk under the configured cache directory; the
//! `offline_data` table mirrors them through activity events.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use wayfarer_core::offline::{CacheStatus, DataType, DownloadReceipt, StorageInfo, SyncOutcome};
use wayfarer_core::types::DbId;
use wayfarer_core::uploads::validate_user_id;
use wayfarer_db::models::offline_data::OfflineData;
use wayfarer_db::repositories::OfflineDataRepo;
use wayfarer_events::ActivityEvent;

use crate::error::AppResult;
use crate::query::UserParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Response for `GET /offline/storage-info`.
#[derive(Debug, Serialize)]
pub struct StorageInfoResponse {
    pub user_id: String,
    #[serde(flatten)]
    pub info: StorageInfo,
}

// ---------------------------------------------------------------------------
// GET /offline/status
// ---------------------------------------------------------------------------

pub async fn status(
    State(state): State<AppState>,
    Query(params): Query<UserParams>,
) -> AppResult<Json<CacheStatus>> {
    let status = state.offline_cache.status(&params.user_id).await?;
    Ok(Json(status))
}

// ---------------------------------------------------------------------------
// POST /offline/download
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct DownloadParams {
    pub user_id: String,
    pub destination_id: DbId,
    /// One of `map`, `guide`, `itinerary`, `hotels` (default `map`).
    pub data_type: Option<String>,
}

/// Write a destination bundle into the user's cache.
pub async fn download(
    State(state): State<AppState>,
    Query(params): Query<DownloadParams>,
) -> AppResult<Json<DownloadReceipt>> {
    let data_type = match params.data_type.as_deref() {
        Some(name) => DataType::from_name(name)?,
        None => DataType::Map,
    };

    let receipt = state
        .offline_cache
        .download(&params.user_id, params.destination_id, data_type)
        .await?;

    state.event_bus.publish(ActivityEvent::offline_download(
        params.user_id.as_str(),
        receipt.destination_id,
        data_type.name(),
        receipt.file_path.to_string_lossy(),
        receipt.file_size_bytes,
    ));

    tracing::info!(
        user_id = %params.user_id,
        destination_id = receipt.destination_id,
        data_type = data_type.name(),
        "Offline bundle downloaded"
    );

    Ok(Json(receipt))
}

// ---------------------------------------------------------------------------
// POST /offline/sync
// ---------------------------------------------------------------------------

/// Mark the user's bundles as synced.
pub async fn sync(
    State(state): State<AppState>,
    Query(params): Query<UserParams>,
) -> AppResult<Json<SyncOutcome>> {
    let outcome = state.offline_cache.sync(&params.user_id).await?;

    if let SyncOutcome::Synced { files_synced, .. } = &outcome {
        state
            .event_bus
            .publish(ActivityEvent::offline_sync(params.user_id.as_str(), *files_synced));
    }

    Ok(Json(outcome))
}

// ---------------------------------------------------------------------------
// GET /offline/storage-info
// ---------------------------------------------------------------------------

pub async fn storage_info(
    State(state): State<AppState>,
    Query(params): Query<UserParams>,
) -> AppResult<Json<StorageInfoResponse>> {
    let info = state.offline_cache.storage_info(&params.user_id).await?;
    Ok(Json(StorageInfoResponse {
        user_id: params.user_id,
        info,
    }))
}

// ---------------------------------------------------------------------------
// GET /offline/downloads
// ---------------------------------------------------------------------------

/// Recorded downloads for a user with their sync flags, newest first.
pub async fn downloads(
    State(state): State<AppState>,
    Query(params): Query<UserParams>,
) -> AppResult<Json<DataResponse<Vec<OfflineData>>>> {
    validate_user_id(&params.user_id)?;
    let rows = OfflineDataRepo::list_for_user(&state.pool, &params.user_id).await?;
    Ok(Json(DataResponse { data: rows }))
}
