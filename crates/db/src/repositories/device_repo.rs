//! Repository for the `devices` table.

use sqlx::SqlitePool;

use crate::models::device::{CreateDevice, Device, UpdateDevice};

const COLUMNS: &str = "id, device_id, device_name, location, is_active, api_key_hash, \
                       api_key_created_at, created_at, updated_at";

const NOW: &str = "strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

pub struct DeviceRepo;

impl DeviceRepo {
    /// Insert a device, or return the existing row unchanged.
    pub async fn register(pool: &SqlitePool, input: &CreateDevice) -> Result<Device, sqlx::Error> {
        let query = format!(
            "INSERT INTO devices (device_id, device_name, location) VALUES (?1, ?2, ?3)
             ON CONFLICT (device_id) DO UPDATE SET device_id = excluded.device_id
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Device>(&query)
            .bind(&input.device_id)
            .bind(&input.device_name)
            .bind(&input.location)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_device_id(
        pool: &SqlitePool,
        device_id: &str,
    ) -> Result<Option<Device>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM devices WHERE device_id = ?1");
        sqlx::query_as::<_, Device>(&query)
            .bind(device_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_active(pool: &SqlitePool) -> Result<Vec<Device>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM devices WHERE is_active = 1 ORDER BY id");
        sqlx::query_as::<_, Device>(&query).fetch_all(pool).await
    }

    pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Device>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM devices ORDER BY id");
        sqlx::query_as::<_, Device>(&query).fetch_all(pool).await
    }

    /// Apply the provided fields and bump `updated_at`.
    ///
    /// Returns `None` if the device does not exist.
    pub async fn update(
        pool: &SqlitePool,
        device_id: &str,
        input: &UpdateDevice,
    ) -> Result<Option<Device>, sqlx::Error> {
        let query = format!(
            "UPDATE devices SET
                 device_name = COALESCE(?2, device_name),
                 location = COALESCE(?3, location),
                 updated_at = {NOW}
             WHERE device_id = ?1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Device>(&query)
            .bind(device_id)
            .bind(&input.device_name)
            .bind(&input.location)
            .fetch_optional(pool)
            .await
    }

    /// Mark a device inactive. Returns `false` if it does not exist.
    pub async fn deactivate(pool: &SqlitePool, device_id: &str) -> Result<bool, sqlx::Error> {
        let query =
            format!("UPDATE devices SET is_active = 0, updated_at = {NOW} WHERE device_id = ?1");
        let result = sqlx::query(&query).bind(device_id).execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Store the hash of a freshly issued API key. Returns `false` if the
    /// device does not exist.
    pub async fn set_api_key(
        pool: &SqlitePool,
        device_id: &str,
        key_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let query = format!(
            "UPDATE devices SET api_key_hash = ?2, api_key_created_at = {NOW}, updated_at = {NOW}
             WHERE device_id = ?1"
        );
        let result = sqlx::query(&query)
            .bind(device_id)
            .bind(key_hash)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Forget the device's API key. Returns the number of rows changed.
    pub async fn clear_api_key(pool: &SqlitePool, device_id: &str) -> Result<u64, sqlx::Error> {
        let query = format!(
            "UPDATE devices SET api_key_hash = NULL, api_key_created_at = NULL, updated_at = {NOW}
             WHERE device_id = ?1"
        );
        let result = sqlx::query(&query).bind(device_id).execute(pool).await?;
        Ok(result.rows_affected())
    }
}
