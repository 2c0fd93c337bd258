//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>` in the API state. Handlers
//! publish once the response data is computed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use wayfarer_core::types::DbId;

// ---------------------------------------------------------------------------
// ActivityEvent
// ---------------------------------------------------------------------------

/// A user-facing action worth recording.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActivityEvent {
    /// A voice command was interpreted.
    VoiceCommand {
        user_id: String,
        transcription: String,
        /// Detected intent name; `None` when nothing matched.
        command_type: Option<String>,
        results_count: i64,
        at: DateTime<Utc>,
    },

    /// An uploaded image was classified.
    ImageSearch {
        user_id: String,
        detected_location: Option<String>,
        confidence_score: f64,
        at: DateTime<Utc>,
    },

    /// A destination bundle was written to the offline cache.
    OfflineDownload {
        user_id: String,
        destination_id: DbId,
        data_type: String,
        file_path: String,
        file_size: i64,
        at: DateTime<Utc>,
    },

    /// A user's offline cache was synced.
    OfflineSync {
        user_id: String,
        files_synced: usize,
        at: DateTime<Utc>,
    },
}

impl ActivityEvent {
    pub fn voice_command(
        user_id: impl Into<String>,
        transcription: impl Into<String>,
        command_type: Option<&str>,
        results_count: usize,
    ) -> Self {
        Self::VoiceCommand {
            user_id: user_id.into(),
            transcription: transcription.into(),
            command_type: command_type.map(str::to_string),
            results_count: results_count as i64,
            at: Utc::now(),
        }
    }

    pub fn image_search(
        user_id: impl Into<String>,
        detected_location: Option<&str>,
        confidence_score: f64,
    ) -> Self {
        Self::ImageSearch {
            user_id: user_id.into(),
            detected_location: detected_location.map(str::to_string),
            confidence_score,
            at: Utc::now(),
        }
    }

    pub fn offline_download(
        user_id: impl Into<String>,
        destination_id: DbId,
        data_type: impl Into<String>,
        file_path: impl Into<String>,
        file_size: u64,
    ) -> Self {
        Self::OfflineDownload {
            user_id: user_id.into(),
            destination_id,
            data_type: data_type.into(),
            file_path: file_path.into(),
            file_size: i64::try_from(file_size).unwrap_or(i64::MAX),
            at: Utc::now(),
        }
    }

    pub fn offline_sync(user_id: impl Into<String>, files_synced: usize) -> Self {
        Self::OfflineSync {
            user_id: user_id.into(),
            files_synced,
            at: Utc::now(),
        }
    }

    /// The user the event belongs to.
    pub fn user_id(&self) -> &str {
        match self {
            Self::VoiceCommand { user_id, .. }
            | Self::ImageSearch { user_id, .. }
            | Self::OfflineDownload { user_id, .. }
            | Self::OfflineSync { user_id, .. } => user_id,
        }
    }

    /// Short name used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::VoiceCommand { .. } => "voice_command",
            Self::ImageSearch { .. } => "image_search",
            Self::OfflineDownload { .. } => "offline_download",
            Self::OfflineSync { .. } => "offline_sync",
        }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// ```rust
/// use wayfarer_events::bus::{ActivityEvent, EventBus};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(ActivityEvent::offline_sync("alice", 3));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<ActivityEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest unconsumed messages are dropped and
    /// slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With no subscribers the event is dropped.
    pub fn publish(&self, event: ActivityEvent) {
        // SendError only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ActivityEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
