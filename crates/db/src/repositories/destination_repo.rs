//! Repository for the `destinations` table.

use sqlx::SqlitePool;
use wayfarer_core::types::DbId;

use crate::models::destination::Destination;

const COLUMNS: &str = "id, name, latitude, longitude, description, country, category, \
                       rating, photo_url";

/// Read access to the destination catalogue.
pub struct DestinationRepo;

impl DestinationRepo {
    /// All destinations in catalogue order.
    pub async fn list(pool: &SqlitePool) -> Result<Vec<Destination>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM destinations ORDER BY id");
        sqlx::query_as::<_, Destination>(&query)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &SqlitePool,
        id: DbId,
    ) -> Result<Option<Destination>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM destinations WHERE id = ?1");
        sqlx::query_as::<_, Destination>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Destinations in one category (e.g. `"beach"`), in catalogue order.
    pub async fn list_by_category(
        pool: &SqlitePool,
        category: &str,
    ) -> Result<Vec<Destination>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM destinations WHERE category = ?1 ORDER BY id");
        sqlx::query_as::<_, Destination>(&query)
            .bind(category)
            .fetch_all(pool)
            .await
    }
}
