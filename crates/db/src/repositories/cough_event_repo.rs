//! Repository for the `cough_events` table.
//!
//! Timestamps are stored as RFC 3339 UTC text written by the service, so
//! range filters compare them as strings.

use sqlx::SqlitePool;
use wayfarer_core::cough::TypeTally;
use wayfarer_core::types::Timestamp;

use crate::models::cough_event::{CoughEvent, CreateCoughEvent};

const COLUMNS: &str = "id, device_id, cough_type, confidence, raw_score, timestamp, \
                       audio_volume, created_at";

pub struct CoughEventRepo;

impl CoughEventRepo {
    /// Record an event. The device row must already exist.
    pub async fn create(
        pool: &SqlitePool,
        input: &CreateCoughEvent,
    ) -> Result<CoughEvent, sqlx::Error> {
        let query = format!(
            "INSERT INTO cough_events
                 (device_id, cough_type, confidence, raw_score, timestamp, audio_volume)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CoughEvent>(&query)
            .bind(&input.device_id)
            .bind(&input.cough_type)
            .bind(input.confidence)
            .bind(input.raw_score)
            .bind(input.timestamp)
            .bind(input.audio_volume)
            .fetch_one(pool)
            .await
    }

    /// Every event of a device, most recent first.
    pub async fn list_for_device(
        pool: &SqlitePool,
        device_id: &str,
    ) -> Result<Vec<CoughEvent>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM cough_events
             WHERE device_id = ?1
             ORDER BY timestamp DESC, id DESC"
        );
        sqlx::query_as::<_, CoughEvent>(&query)
            .bind(device_id)
            .fetch_all(pool)
            .await
    }

    /// Events of a device with `start <= timestamp <= end`, most recent first.
    pub async fn list_in_range(
        pool: &SqlitePool,
        device_id: &str,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<CoughEvent>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM cough_events
             WHERE device_id = ?1 AND timestamp BETWEEN ?2 AND ?3
             ORDER BY timestamp DESC, id DESC"
        );
        sqlx::query_as::<_, CoughEvent>(&query)
            .bind(device_id)
            .bind(start)
            .bind(end)
            .fetch_all(pool)
            .await
    }

    /// Count and confidence sum per lower-cased label within the window.
    pub async fn tally_by_type(
        pool: &SqlitePool,
        device_id: &str,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<TypeTally>, sqlx::Error> {
        let rows: Vec<(String, i64, f64)> = sqlx::query_as(
            "SELECT LOWER(cough_type), COUNT(*), COALESCE(SUM(confidence), 0.0)
             FROM cough_events
             WHERE device_id = ?1 AND timestamp BETWEEN ?2 AND ?3
             GROUP BY LOWER(cough_type)
             ORDER BY LOWER(cough_type)",
        )
        .bind(device_id)
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(label, count, confidence_sum)| TypeTally {
                label,
                count,
                confidence_sum,
            })
            .collect())
    }
}
