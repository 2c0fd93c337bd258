//! Durable activity log service.
//!
//! [`EventPersistence`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! and writes every [`ActivityEvent`] to its log table. It runs as a
//! long-lived background task and stops when the bus sender is dropped.

use tokio::sync::broadcast;
use wayfarer_db::models::image_search::CreateImageSearch;
use wayfarer_db::models::offline_data::CreateOfflineData;
use wayfarer_db::models::voice_command::CreateVoiceCommand;
use wayfarer_db::repositories::{ImageSearchRepo, OfflineDataRepo, UserRepo, VoiceCommandRepo};
use wayfarer_db::DbPool;

use crate::bus::ActivityEvent;

/// Background service that persists activity events to the database.
pub struct EventPersistence;

impl EventPersistence {
    /// Run the persistence loop until the channel closes.
    pub async fn run(pool: DbPool, mut receiver: broadcast::Receiver<ActivityEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = Self::persist(&pool, &event).await {
                        tracing::error!(
                            error = %e,
                            kind = event.kind(),
                            user_id = event.user_id(),
                            "Failed to persist activity event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Event persistence lagged, some events were not persisted"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, persistence shutting down");
                    break;
                }
            }
        }
    }

    /// Write a single event.
    ///
    /// The owning user row is created first since every log table references
    /// `users.user_id`.
    pub async fn persist(pool: &DbPool, event: &ActivityEvent) -> Result<(), sqlx::Error> {
        UserRepo::ensure(pool, event.user_id()).await?;

        match event {
            ActivityEvent::VoiceCommand {
                user_id,
                transcription,
                command_type,
                results_count,
                ..
            } => {
                let input = CreateVoiceCommand {
                    user_id: user_id.clone(),
                    transcription: transcription.clone(),
                    command_type: command_type.clone(),
                    results_count: *results_count,
                };
                VoiceCommandRepo::create(pool, &input).await?;
            }
            ActivityEvent::ImageSearch {
                user_id,
                detected_location,
                confidence_score,
                ..
            } => {
                let input = CreateImageSearch {
                    user_id: user_id.clone(),
                    detected_location: detected_location.clone(),
                    confidence_score: *confidence_score,
                };
                ImageSearchRepo::create(pool, &input).await?;
            }
            ActivityEvent::OfflineDownload {
                user_id,
                destination_id,
                data_type,
                file_path,
                file_size,
                ..
            } => {
                let input = CreateOfflineData {
                    user_id: user_id.clone(),
                    destination_id: *destination_id,
                    data_type: data_type.clone(),
                    file_path: file_path.clone(),
                    file_size: *file_size,
                };
                OfflineDataRepo::upsert(pool, &input).await?;
            }
            ActivityEvent::OfflineSync { user_id, .. } => {
                let updated = OfflineDataRepo::mark_all_synced(pool, user_id).await?;
                tracing::debug!(user_id = %user_id, rows = updated, "Marked offline data synced");
            }
        }
        Ok(())
    }
}
