//! Handlers for destination search by image.
//!
//! An upload is identified in stages: landmark detection when a vision key is
//! configured, then keywords in the file name, then a hash of the bytes. The
//! last stage always answers, so a valid upload never comes back empty.

use std::io::Cursor;

use axum::extract::{Multipart, Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use wayfarer_clients::Landmark;
use wayfarer_core::destinations::{classify_offline, Category, TravelDetails, LANDMARK_CONFIDENCE};
use wayfarer_core::error::CoreError;
use wayfarer_core::hashing::sha256_hex;
use wayfarer_core::types::DbId;
use wayfarer_core::history::{clamp_limit, DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT};
use wayfarer_core::uploads::{base_name, ensure_extension, stored_upload_name, validate_user_id, IMAGE_EXTENSIONS};
use wayfarer_db::models::destination::Destination;
use wayfarer_db::models::image_search::ImageSearch;
use wayfarer_db::repositories::{DestinationRepo, ImageSearchRepo};
use wayfarer_events::ActivityEvent;

use crate::error::AppResult;
use crate::handlers::read_file_field;
use crate::query::{HistoryParams, UserParams};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

/// How an upload was identified.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Identification {
    /// A landmark recognised by the vision provider.
    Landmark {
        status: &'static str,
        detected_location: String,
        country: &'static str,
        coordinates: LatLng,
        confidence: f64,
        detected_labels: Vec<String>,
        source: &'static str,
    },
    /// One of the fixed destination signatures.
    Signature {
        status: &'static str,
        detected_location: &'static str,
        country: &'static str,
        category: Category,
        coordinates: LatLng,
        confidence: f64,
        photo_url: String,
        travel_details: TravelDetails,
    },
}

impl Identification {
    fn from_landmark(landmark: Landmark) -> Self {
        Self::Landmark {
            status: "success",
            detected_location: landmark.description,
            country: "Detected",
            coordinates: LatLng {
                lat: landmark.latitude,
                lng: landmark.longitude,
            },
            confidence: LANDMARK_CONFIDENCE,
            detected_labels: landmark.labels,
            source: "Google Vision API",
        }
    }

    fn location(&self) -> &str {
        match self {
            Self::Landmark {
                detected_location, ..
            } => detected_location.as_str(),
            Self::Signature {
                detected_location, ..
            } => *detected_location,
        }
    }

    fn confidence(&self) -> f64 {
        match self {
            Self::Landmark { confidence, .. } | Self::Signature { confidence, .. } => *confidence,
        }
    }
}

/// Response for `POST /image/search`.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub user_id: String,
    pub filename: String,
    #[serde(flatten)]
    pub identification: Identification,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_dimensions: Option<ImageDimensions>,
}

#[derive(Debug, Serialize)]
pub struct PopularDestinations {
    pub destinations: Vec<Destination>,
}

/// Optional `?category=` filter for the catalogue.
#[derive(Debug, Deserialize)]
pub struct CategoryParams {
    pub category: Option<String>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Read width and height from the image header without decoding pixels.
fn read_dimensions(data: &[u8]) -> Option<ImageDimensions> {
    let reader = image::ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .ok()?;
    let (width, height) = reader.into_dimensions().ok()?;
    Some(ImageDimensions { width, height })
}

/// Run the classifier stages over an upload.
async fn identify(state: &AppState, file_name: &str, data: &[u8]) -> Identification {
    if let Some(vision) = &state.vision {
        match vision.detect(data).await {
            Ok(Some(landmark)) => return Identification::from_landmark(landmark),
            Ok(None) => tracing::debug!(file = %file_name, "No landmark detected"),
            Err(e) => tracing::warn!(error = %e, file = %file_name, "Landmark detection failed"),
        }
    }

    let category = classify_offline(file_name, data);
    let signature = category.signature();
    let photo_url = state.photos.photo_url(signature.location).await;

    Identification::Signature {
        status: "success",
        detected_location: signature.location,
        country: signature.country,
        category,
        coordinates: LatLng {
            lat: signature.lat,
            lng: signature.lng,
        },
        confidence: signature.confidence,
        photo_url,
        travel_details: TravelDetails::default(),
    }
}

// ---------------------------------------------------------------------------
// POST /image/search
// ---------------------------------------------------------------------------

/// Store an uploaded image and identify the destination it shows.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<UserParams>,
    mut multipart: Multipart,
) -> AppResult<Json<SearchResponse>> {
    validate_user_id(&params.user_id)?;

    let upload = read_file_field(&mut multipart, "image_file").await?;
    ensure_extension(&upload.file_name, IMAGE_EXTENSIONS, "image")?;
    let file_name = base_name(&upload.file_name)?.to_string();

    let dir = &state.config.image_uploads_dir;
    tokio::fs::create_dir_all(dir).await.map_err(CoreError::from)?;
    let path = dir.join(stored_upload_name(&params.user_id, &file_name)?);
    tokio::fs::write(&path, &upload.data)
        .await
        .map_err(CoreError::from)?;

    let identification = identify(&state, &file_name, &upload.data).await;

    state.event_bus.publish(ActivityEvent::image_search(
        params.user_id.as_str(),
        Some(identification.location()),
        identification.confidence(),
    ));

    tracing::info!(
        user_id = %params.user_id,
        file = %path.display(),
        sha256 = %sha256_hex(&upload.data),
        location = identification.location(),
        "Image search completed"
    );

    Ok(Json(SearchResponse {
        user_id: params.user_id,
        filename: file_name,
        image_dimensions: read_dimensions(&upload.data),
        identification,
    }))
}

// ---------------------------------------------------------------------------
// GET /image/popular-destinations
// ---------------------------------------------------------------------------

pub async fn popular_destinations(
    State(state): State<AppState>,
    Query(params): Query<CategoryParams>,
) -> AppResult<Json<PopularDestinations>> {
    let destinations = match params.category.as_deref() {
        Some(category) => DestinationRepo::list_by_category(&state.pool, category).await?,
        None => DestinationRepo::list(&state.pool).await?,
    };
    Ok(Json(PopularDestinations { destinations }))
}

// ---------------------------------------------------------------------------
// GET /image/popular-destinations/{id}
// ---------------------------------------------------------------------------

pub async fn destination(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Destination>> {
    let destination = DestinationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "Destination",
            id: id.to_string(),
        })?;
    Ok(Json(destination))
}

// ---------------------------------------------------------------------------
// GET /image/history
// ---------------------------------------------------------------------------

/// Most recent logged searches for a user, newest first.
pub async fn history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> AppResult<Json<DataResponse<Vec<ImageSearch>>>> {
    validate_user_id(&params.user_id)?;
    let limit = clamp_limit(params.limit, DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT);
    let searches = ImageSearchRepo::list_recent(&state.pool, &params.user_id, limit).await?;
    Ok(Json(DataResponse { data: searches }))
}
