//! Repository for the `offline_data` table.
//!
//! One row exists per `(user_id, destination_id, data_type)`; downloading the
//! same bundle again refreshes the row and clears its synced flag.

use sqlx::SqlitePool;

use crate::models::offline_data::{CreateOfflineData, OfflineData};

const COLUMNS: &str = "id, user_id, destination_id, data_type, cached_at, file_path, \
                       file_size, is_synced";

pub struct OfflineDataRepo;

impl OfflineDataRepo {
    /// Insert or refresh the bookkeeping row for a download.
    pub async fn upsert(
        pool: &SqlitePool,
        input: &CreateOfflineData,
    ) -> Result<OfflineData, sqlx::Error> {
        let query = format!(
            "INSERT INTO offline_data (user_id, destination_id, data_type, file_path, file_size)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (user_id, destination_id, data_type) DO UPDATE SET
                 file_path = excluded.file_path,
                 file_size = excluded.file_size,
                 cached_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now'),
                 is_synced = 0
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OfflineData>(&query)
            .bind(&input.user_id)
            .bind(input.destination_id)
            .bind(&input.data_type)
            .bind(&input.file_path)
            .bind(input.file_size)
            .fetch_one(pool)
            .await
    }

    /// All entries for a user, newest first.
    pub async fn list_for_user(
        pool: &SqlitePool,
        user_id: &str,
    ) -> Result<Vec<OfflineData>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM offline_data WHERE user_id = ?1 ORDER BY cached_at DESC, id DESC"
        );
        sqlx::query_as::<_, OfflineData>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Flag every entry of a user as synced. Returns the number of rows changed.
    pub async fn mark_all_synced(pool: &SqlitePool, user_id: &str) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("UPDATE offline_data SET is_synced = 1 WHERE user_id = ?1 AND is_synced = 0")
                .bind(user_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected())
    }
}
