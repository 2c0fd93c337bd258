//! Logged voice commands.

use serde::Serialize;
use sqlx::FromRow;
use wayfarer_core::types::{DbId, Timestamp};

/// A row from the `voice_commands` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VoiceCommand {
    pub id: DbId,
    pub user_id: String,
    pub transcription: String,
    /// Detected intent name, `None` when the command was not understood.
    pub command_type: Option<String>,
    pub results_count: i64,
    pub created_at: Timestamp,
}

/// DTO for logging a processed command.
#[derive(Debug, Clone)]
pub struct CreateVoiceCommand {
    pub user_id: String,
    pub transcription: String,
    pub command_type: Option<String>,
    pub results_count: i64,
}
