//! Handlers for voice navigation.
//!
//! A command is matched against the intent table, the matching places are
//! searched around the caller and each place is enriched with current weather
//! and a photo. Upstream failures never fail the request; the clients fall
//! back to demo data instead.

use axum::extract::{Multipart, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use wayfarer_clients::Weather;
use wayfarer_core::geo::Coordinates;
use wayfarer_core::history::{clamp_limit, DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT};
use wayfarer_core::intent::{detect_intent, Intent, SIMULATED_TRANSCRIPTION, UNRECOGNISED_COMMAND_MESSAGE};
use wayfarer_core::places::{Place, DEFAULT_SEARCH_RADIUS_M, MAX_PLACES};
use wayfarer_core::uploads::{ensure_extension, validate_user_id, AUDIO_EXTENSIONS};
use wayfarer_db::models::voice_command::VoiceCommand;
use wayfarer_db::repositories::{UserRepo, VoiceCommandRepo};
use wayfarer_events::ActivityEvent;

use crate::error::AppResult;
use crate::handlers::read_file_field;
use crate::query::{default_latitude, default_longitude, HistoryParams, LocationParams};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Outcome of a voice command.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandStatus {
    Success,
    NoResults,
    Failed,
}

/// A place found for a command, with conditions on site.
#[derive(Debug, Serialize)]
pub struct CommandDestination {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub distance_km: f64,
    pub rating: f64,
    pub weather: Weather,
    pub photo_url: String,
}

/// Result of running one command.
#[derive(Debug, Serialize)]
pub struct CommandResult {
    pub status: CommandStatus,
    pub message: String,
    pub intent: Option<Intent>,
    pub destinations: Vec<CommandDestination>,
}

/// Response for `POST /voice/process`.
#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub user_id: String,
    pub command: String,
    pub user_location: Coordinates,
    #[serde(flatten)]
    pub result: CommandResult,
}

/// Response for `POST /voice/transcribe-audio`.
#[derive(Debug, Serialize)]
pub struct TranscriptionResponse {
    pub user_id: String,
    pub filename: String,
    pub transcription: String,
    #[serde(flatten)]
    pub result: CommandResult,
}

/// A nearby-search hit with its weather.
#[derive(Debug, Serialize)]
pub struct NearbyPlace {
    #[serde(flatten)]
    pub place: Place,
    pub weather: Weather,
}

/// Response for `GET /voice/nearby-search`.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NearbyResponse {
    Success {
        search_type: String,
        total_results: usize,
        destinations: Vec<NearbyPlace>,
    },
    NoResults {
        message: String,
    },
}

/// Response for `GET /voice/weather`.
#[derive(Debug, Serialize)]
pub struct WeatherResponse {
    pub location: Coordinates,
    pub weather: Weather,
}

// ---------------------------------------------------------------------------
// Command pipeline
// ---------------------------------------------------------------------------

/// Detect the intent of `text` and gather destinations around `origin`.
async fn run_command(state: &AppState, text: &str, origin: Coordinates) -> CommandResult {
    let Some(intent) = detect_intent(text) else {
        return CommandResult {
            status: CommandStatus::Failed,
            message: UNRECOGNISED_COMMAND_MESSAGE.to_string(),
            intent: None,
            destinations: Vec::new(),
        };
    };

    let places = state
        .places
        .nearby(intent.name(), origin, DEFAULT_SEARCH_RADIUS_M)
        .await;

    if places.is_empty() {
        return CommandResult {
            status: CommandStatus::NoResults,
            message: format!("No {intent}s found nearby"),
            intent: Some(intent),
            destinations: Vec::new(),
        };
    }

    // Photos are looked up by intent, so one lookup serves every place.
    let photo_url = state.photos.photo_url(intent.name()).await;

    let mut destinations = Vec::with_capacity(places.len().min(MAX_PLACES));
    for place in places.into_iter().take(MAX_PLACES) {
        let weather = state
            .weather
            .current(Coordinates::new(place.lat, place.lng))
            .await;
        destinations.push(CommandDestination {
            name: place.name,
            latitude: place.lat,
            longitude: place.lng,
            address: place.address,
            distance_km: place.distance,
            rating: place.rating,
            weather,
            photo_url: photo_url.clone(),
        });
    }

    CommandResult {
        status: CommandStatus::Success,
        message: format!("Found {} {intent}s", destinations.len()),
        intent: Some(intent),
        destinations,
    }
}

/// Record the caller's position and publish the command to the activity log.
async fn record_command(
    state: &AppState,
    user_id: &str,
    origin: Coordinates,
    transcription: &str,
    result: &CommandResult,
) -> AppResult<()> {
    UserRepo::ensure(&state.pool, user_id).await?;
    UserRepo::update_location(&state.pool, user_id, origin.latitude, origin.longitude).await?;

    state.event_bus.publish(ActivityEvent::voice_command(
        user_id,
        transcription,
        result.intent.map(Intent::name),
        result.destinations.len(),
    ));
    Ok(())
}

// ---------------------------------------------------------------------------
// POST /voice/process
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ProcessParams {
    pub user_id: String,
    pub text_input: String,
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
}

/// Run a text command and return the places found.
pub async fn process_command(
    State(state): State<AppState>,
    Query(params): Query<ProcessParams>,
) -> AppResult<Json<ProcessResponse>> {
    validate_user_id(&params.user_id)?;
    let origin = Coordinates::validated(params.latitude, params.longitude)?;

    let result = run_command(&state, &params.text_input, origin).await;
    record_command(&state, &params.user_id, origin, &params.text_input, &result).await?;

    tracing::info!(
        user_id = %params.user_id,
        intent = ?result.intent,
        results = result.destinations.len(),
        "Voice command processed"
    );

    Ok(Json(ProcessResponse {
        user_id: params.user_id,
        command: params.text_input,
        user_location: origin,
        result,
    }))
}

// ---------------------------------------------------------------------------
// POST /voice/transcribe-audio
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct TranscribeParams {
    pub user_id: String,
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
}

/// Accept an audio upload and run it as a command.
///
/// Speech recognition is simulated: every clip transcribes to the same text.
pub async fn transcribe_audio(
    State(state): State<AppState>,
    Query(params): Query<TranscribeParams>,
    mut multipart: Multipart,
) -> AppResult<Json<TranscriptionResponse>> {
    validate_user_id(&params.user_id)?;
    let origin = Coordinates::validated(params.latitude, params.longitude)?;

    let upload = read_file_field(&mut multipart, "audio_file").await?;
    ensure_extension(&upload.file_name, AUDIO_EXTENSIONS, "audio")?;

    tracing::debug!(
        user_id = %params.user_id,
        file = %upload.file_name,
        bytes = upload.data.len(),
        "Audio command received"
    );

    let transcription = SIMULATED_TRANSCRIPTION;
    let result = run_command(&state, transcription, origin).await;
    record_command(&state, &params.user_id, origin, transcription, &result).await?;

    Ok(Json(TranscriptionResponse {
        user_id: params.user_id,
        filename: upload.file_name,
        transcription: transcription.to_string(),
        result,
    }))
}

// ---------------------------------------------------------------------------
// GET /voice/nearby-search
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct NearbyParams {
    pub search_type: String,
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
    /// Search radius in metres.
    pub radius: Option<u32>,
}

/// Places of a free-form type around a position, each with its weather.
pub async fn nearby_search(
    State(state): State<AppState>,
    Query(params): Query<NearbyParams>,
) -> AppResult<Json<NearbyResponse>> {
    let origin = Coordinates::validated(params.latitude, params.longitude)?;
    let radius = params.radius.unwrap_or(DEFAULT_SEARCH_RADIUS_M);
    let search_type = params.search_type.trim().to_lowercase();

    let places = state.places.nearby(&search_type, origin, radius).await;
    if places.is_empty() {
        return Ok(Json(NearbyResponse::NoResults {
            message: format!("No {search_type}s found"),
        }));
    }

    let mut destinations = Vec::with_capacity(places.len());
    for place in places {
        let weather = state
            .weather
            .current(Coordinates::new(place.lat, place.lng))
            .await;
        destinations.push(NearbyPlace { place, weather });
    }

    Ok(Json(NearbyResponse::Success {
        search_type,
        total_results: destinations.len(),
        destinations,
    }))
}

// ---------------------------------------------------------------------------
// GET /voice/weather
// ---------------------------------------------------------------------------

pub async fn weather(
    State(state): State<AppState>,
    Query(params): Query<LocationParams>,
) -> AppResult<Json<WeatherResponse>> {
    let location = params.coordinates()?;
    let weather = state.weather.current(location).await;
    Ok(Json(WeatherResponse { location, weather }))
}

// ---------------------------------------------------------------------------
// GET /voice/history
// ---------------------------------------------------------------------------

/// Most recent logged commands for a user, newest first.
pub async fn history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> AppResult<Json<DataResponse<Vec<VoiceCommand>>>> {
    validate_user_id(&params.user_id)?;
    let limit = clamp_limit(params.limit, DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT);
    let commands = VoiceCommandRepo::list_recent(&state.pool, &params.user_id, limit).await?;
    Ok(Json(DataResponse { data: commands }))
}
