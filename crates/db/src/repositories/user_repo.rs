//! Repository for the `users` table.

use sqlx::SqlitePool;

use crate::models::user::User;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, created_at, language, latitude, longitude";

/// Provides lookups and lazy creation of users.
pub struct UserRepo;

impl UserRepo {
    /// Return the user with `user_id`, creating it with defaults if absent.
    pub async fn ensure(pool: &SqlitePool, user_id: &str) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (user_id) VALUES (?1)
             ON CONFLICT (user_id) DO UPDATE SET user_id = excluded.user_id
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Remember the last position a user searched from.
    ///
    /// Returns `None` if the user does not exist.
    pub async fn update_location(
        pool: &SqlitePool,
        user_id: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET latitude = ?2, longitude = ?3
             WHERE user_id = ?1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(user_id)
            .bind(latitude)
            .bind(longitude)
            .fetch_optional(pool)
            .await
    }
}
