//! Repository for the `image_searches` table.

use sqlx::SqlitePool;
use wayfarer_core::types::DbId;

use crate::models::image_search::{CreateImageSearch, ImageSearch};

const COLUMNS: &str = "id, user_id, detected_location, confidence_score, created_at";

pub struct ImageSearchRepo;

impl ImageSearchRepo {
    /// Log a completed search, returning the new row id.
    pub async fn create(pool: &SqlitePool, input: &CreateImageSearch) -> Result<DbId, sqlx::Error> {
        let row: (DbId,) = sqlx::query_as(
            "INSERT INTO image_searches (user_id, detected_location, confidence_score)
             VALUES (?1, ?2, ?3)
             RETURNING id",
        )
        .bind(&input.user_id)
        .bind(&input.detected_location)
        .bind(input.confidence_score)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Most recent searches for a user.
    pub async fn list_recent(
        pool: &SqlitePool,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<ImageSearch>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM image_searches WHERE user_id = ?1
             ORDER BY created_at DESC, id DESC LIMIT ?2"
        );
        sqlx::query_as::<_, ImageSearch>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
