//! Repository for the `voice_commands` table.

use sqlx::SqlitePool;
use wayfarer_core::types::DbId;

use crate::models::voice_command::{CreateVoiceCommand, VoiceCommand};

const COLUMNS: &str = "id, user_id, transcription, command_type, results_count, created_at";

pub struct VoiceCommandRepo;

impl VoiceCommandRepo {
    /// Log a processed command, returning the new row id.
    pub async fn create(
        pool: &SqlitePool,
        input: &CreateVoiceCommand,
    ) -> Result<DbId, sqlx::Error> {
        let row: (DbId,) = sqlx::query_as(
            "INSERT INTO voice_commands (user_id, transcription, command_type, results_count)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id",
        )
        .bind(&input.user_id)
        .bind(&input.transcription)
        .bind(&input.command_type)
        .bind(input.results_count)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Most recent commands for a user.
    pub async fn list_recent(
        pool: &SqlitePool,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<VoiceCommand>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM voice_commands WHERE user_id = ?1
             ORDER BY created_at DESC, id DESC LIMIT ?2"
        );
        sqlx::query_as::<_, VoiceCommand>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
