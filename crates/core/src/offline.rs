//! Per-user offline cache of destination data.
//!
//! Every user gets a directory under the cache root holding one pretty-printed
//! JSON file per `(destination, data type)` pair. The directory listing is the
//! source of truth for status and storage figures.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::CoreError;
use crate::geo::round2;
use crate::types::{DbId, Timestamp};
use crate::uploads::validate_user_id;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default per-user storage allowance in MiB.
pub const DEFAULT_MAX_STORAGE_MB: u64 = 500;

const BYTES_PER_KB: f64 = 1024.0;
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// Kind of bundle a user can take offline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    #[default]
    Map,
    Guide,
    Itinerary,
    Hotels,
}

impl DataType {
    pub const ALL: [DataType; 4] = [
        DataType::Map,
        DataType::Guide,
        DataType::Itinerary,
        DataType::Hotels,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Map => "map",
            Self::Guide => "guide",
            Self::Itinerary => "itinerary",
            Self::Hotels => "hotels",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid data_type '{name}'. Must be one of: map, guide, itinerary, hotels"
                ))
            })
    }
}

/// Cache file name for a destination bundle.
pub fn cache_file_name(destination_id: DbId, data_type: DataType) -> String {
    format!("destination_{destination_id}_{}.json", data_type.name())
}

/// Build the canned payload stored for a destination bundle.
pub fn build_payload(
    destination_id: DbId,
    data_type: DataType,
    downloaded_at: Timestamp,
) -> serde_json::Value {
    let mut payload = json!({
        "destination_id": destination_id,
        "type": data_type.name(),
        "downloaded_at": downloaded_at.to_rfc3339(),
    });

    let (key, section) = match data_type {
        DataType::Map => {
            payload["zoom_levels"] = json!([1, 5, 10, 15, 20]);
            (
                "map_tiles",
                json!(["tile_0_0.pbf", "tile_0_1.pbf", "tile_1_0.pbf", "tile_1_1.pbf"]),
            )
        }
        DataType::Guide => (
            "guides",
            json!([
                {"name": "local_guide.pdf", "size": "2.5MB"},
                {"name": "emergency_contacts.txt", "size": "50KB"},
                {"name": "cultural_tips.txt", "size": "100KB"},
            ]),
        ),
        DataType::Itinerary => (
            "itinerary",
            json!([
                {"day": 1, "activities": ["Morning visit", "Lunch", "Evening walk"]},
                {"day": 2, "activities": ["Museum", "Restaurant", "Shopping"]},
                {"day": 3, "activities": ["Nature walk", "Photography", "Relaxation"]},
            ]),
        ),
        DataType::Hotels => (
            "hotels",
            json!([
                {"name": "Hotel A", "rating": 4.5, "price": "$100/night"},
                {"name": "Hotel B", "rating": 4.7, "price": "$150/night"},
                {"name": "Hotel C", "rating": 4.8, "price": "$200/night"},
            ]),
        ),
    };
    payload[key] = section;
    payload
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// One cached file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheItem {
    pub name: String,
    pub size_kb: f64,
    pub modified: Option<String>,
}

/// Snapshot of a user's cache directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStatus {
    pub user_id: String,
    pub total_size_mb: f64,
    pub items_count: usize,
    pub items: Vec<CacheItem>,
    /// `"not_synced"` when the user has never downloaded anything.
    pub sync_status: &'static str,
}

/// Result of writing a bundle to the cache.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadReceipt {
    pub status: &'static str,
    pub message: String,
    pub destination_id: DbId,
    pub data_type: DataType,
    pub file_name: String,
    #[serde(skip)]
    pub file_path: PathBuf,
    #[serde(skip)]
    pub file_size_bytes: u64,
    pub file_size_kb: f64,
    pub downloaded_at: String,
}

/// Outcome of a sync request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SyncOutcome {
    Synced {
        message: &'static str,
        files_synced: usize,
        synced_at: String,
    },
    Error {
        message: &'static str,
    },
}

/// Storage usage against the per-user allowance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageInfo {
    pub max_storage_mb: u64,
    pub used_mb: f64,
    pub available_mb: f64,
    pub usage_percentage: f64,
}

impl StorageInfo {
    /// Derive storage figures from the rounded usage in MiB.
    pub fn from_used_mb(max_storage_mb: u64, used_mb: f64) -> Self {
        let max = max_storage_mb as f64;
        let usage_percentage = if max_storage_mb == 0 {
            0.0
        } else {
            round2(used_mb / max * 100.0)
        };
        Self {
            max_storage_mb,
            used_mb,
            available_mb: max - used_mb,
            usage_percentage,
        }
    }
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

/// Filesystem-backed offline cache rooted at a single directory.
#[derive(Debug, Clone)]
pub struct OfflineCache {
    root: PathBuf,
    max_storage_mb: u64,
}

impl OfflineCache {
    pub fn new(root: impl Into<PathBuf>, max_storage_mb: u64) -> Self {
        Self {
            root: root.into(),
            max_storage_mb,
        }
    }

    /// Directory for a user, after validating the id is a safe path segment.
    pub fn user_dir(&self, user_id: &str) -> Result<PathBuf, CoreError> {
        validate_user_id(user_id)?;
        Ok(self.root.join(user_id))
    }

    /// List the user's cached files.
    pub async fn status(&self, user_id: &str) -> Result<CacheStatus, CoreError> {
        let dir = self.user_dir(user_id)?;
        if !tokio::fs::try_exists(&dir).await? {
            return Ok(CacheStatus {
                user_id: user_id.to_string(),
                total_size_mb: 0.0,
                items_count: 0,
                items: Vec::new(),
                sync_status: "not_synced",
            });
        }

        let (items, total_bytes) = list_files(&dir).await?;
        Ok(CacheStatus {
            user_id: user_id.to_string(),
            total_size_mb: round2(total_bytes as f64 / BYTES_PER_MB),
            items_count: items.len(),
            items,
            sync_status: "synced",
        })
    }

    /// Write a destination bundle into the user's cache.
    ///
    /// Overwrites an existing bundle of the same kind. Fails with
    /// [`CoreError::Conflict`] when the write would exceed the allowance.
    pub async fn download(
        &self,
        user_id: &str,
        destination_id: DbId,
        data_type: DataType,
    ) -> Result<DownloadReceipt, CoreError> {
        let dir = self.user_dir(user_id)?;
        tokio::fs::create_dir_all(&dir).await?;

        let now = Utc::now();
        let payload = build_payload(destination_id, data_type, now);
        let body = serde_json::to_vec_pretty(&payload)
            .map_err(|e| CoreError::Internal(format!("Failed to encode payload: {e}")))?;

        let file_name = cache_file_name(destination_id, data_type);
        let path = dir.join(&file_name);

        let (_, used_bytes) = list_files(&dir).await?;
        let replaced_bytes = match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => meta.len(),
            _ => 0,
        };
        let projected = used_bytes.saturating_sub(replaced_bytes) + body.len() as u64;
        if projected as f64 > self.max_storage_mb as f64 * BYTES_PER_MB {
            return Err(CoreError::Conflict(format!(
                "Offline storage limit of {} MB would be exceeded",
                self.max_storage_mb
            )));
        }

        tokio::fs::write(&path, &body).await?;
        let size = tokio::fs::metadata(&path).await?.len();

        tracing::debug!(user_id, destination_id, file = %file_name, size, "Offline bundle written");

        Ok(DownloadReceipt {
            status: "success",
            message: format!("Downloaded {} data for offline", data_type.name()),
            destination_id,
            data_type,
            file_name,
            file_path: path,
            file_size_bytes: size,
            file_size_kb: round2(size as f64 / BYTES_PER_KB),
            downloaded_at: now.to_rfc3339(),
        })
    }

    /// Count the user's JSON bundles as synced.
    pub async fn sync(&self, user_id: &str) -> Result<SyncOutcome, CoreError> {
        let dir = self.user_dir(user_id)?;
        if !tokio::fs::try_exists(&dir).await? {
            return Ok(SyncOutcome::Error {
                message: "No offline data found",
            });
        }

        let (items, _) = list_files(&dir).await?;
        let files_synced = items.iter().filter(|i| i.name.ends_with(".json")).count();

        Ok(SyncOutcome::Synced {
            message: "All offline data synced",
            files_synced,
            synced_at: Utc::now().to_rfc3339(),
        })
    }

    /// Usage against the allowance.
    pub async fn storage_info(&self, user_id: &str) -> Result<StorageInfo, CoreError> {
        let status = self.status(user_id).await?;
        Ok(StorageInfo::from_used_mb(
            self.max_storage_mb,
            status.total_size_mb,
        ))
    }
}

/// Regular files in `dir` sorted by name, plus their total size in bytes.
async fn list_files(dir: &Path) -> Result<(Vec<CacheItem>, u64), CoreError> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut items = Vec::new();
    let mut total = 0u64;

    while let Some(entry) = entries.next_entry().await? {
        let meta = entry.metadata().await?;
        if !meta.is_file() {
            continue;
        }
        let size = meta.len();
        total += size;
        items.push(CacheItem {
            name: entry.file_name().to_string_lossy().into_owned(),
            size_kb: round2(size as f64 / BYTES_PER_KB),
            modified: meta
                .modified()
                .ok()
                .map(|t| DateTime::<Utc>::from(t).to_rfc3339()),
        });
    }

    items.sort_by(|a, b| a.name.cmp(&b.name));
    Ok((items, total))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn data_type_parsing() {
        assert_eq!(DataType::from_name("map").unwrap(), DataType::Map);
        assert_eq!(DataType::from_name("hotels").unwrap(), DataType::Hotels);
        assert!(DataType::from_name("Map").is_err());
        assert!(DataType::from_name("flights").is_err());
        assert_eq!(DataType::default(), DataType::Map);
    }

    #[test]
    fn file_name_format() {
        assert_eq!(
            cache_file_name(7, DataType::Itinerary),
            "destination_7_itinerary.json"
        );
    }

    #[test]
    fn payload_sections_per_type() {
        let now = Utc::now();
        let map = build_payload(1, DataType::Map, now);
        assert_eq!(map["type"], "map");
        assert_eq!(map["map_tiles"].as_array().unwrap().len(), 4);
        assert_eq!(map["zoom_levels"][4], 20);

        let guide = build_payload(1, DataType::Guide, now);
        assert_eq!(guide["guides"][0]["name"], "local_guide.pdf");

        let itinerary = build_payload(2, DataType::Itinerary, now);
        assert_eq!(itinerary["destination_id"], 2);
        assert_eq!(itinerary["itinerary"][2]["day"], 3);

        let hotels = build_payload(3, DataType::Hotels, now);
        assert_eq!(hotels["hotels"][1]["price"], "$150/night");
        assert!(hotels.get("map_tiles").is_none());
    }

    #[test]
    fn storage_info_adds_up() {
        for used in [0.0, 0.01, 0.1, 12.34, 499.99, 500.0] {
            let info = StorageInfo::from_used_mb(500, used);
            assert!(
                (info.used_mb + info.available_mb - info.max_storage_mb as f64).abs() < 1e-9,
                "used {used} does not add up"
            );
        }
        let info = StorageInfo::from_used_mb(500, 125.0);
        assert_eq!(info.usage_percentage, 25.0);
        assert_eq!(StorageInfo::from_used_mb(0, 0.0).usage_percentage, 0.0);
    }

    #[tokio::test]
    async fn status_for_unknown_user_is_not_synced() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = OfflineCache::new(tmp.path(), DEFAULT_MAX_STORAGE_MB);

        let status = cache.status("alice").await.unwrap();
        assert_eq!(status.sync_status, "not_synced");
        assert_eq!(status.items_count, 0);
        assert_eq!(status.total_size_mb, 0.0);
    }

    #[tokio::test]
    async fn download_then_status_lists_file() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = OfflineCache::new(tmp.path(), DEFAULT_MAX_STORAGE_MB);

        let receipt = cache.download("alice", 3, DataType::Guide).await.unwrap();
        assert_eq!(receipt.file_name, "destination_3_guide.json");
        assert!(receipt.file_size_bytes > 0);
        assert!(receipt.file_path.exists());

        cache.download("alice", 3, DataType::Map).await.unwrap();
        // Re-downloading replaces the file instead of adding a new one.
        cache.download("alice", 3, DataType::Map).await.unwrap();

        let status = cache.status("alice").await.unwrap();
        assert_eq!(status.sync_status, "synced");
        assert_eq!(status.items_count, 2);
        assert_eq!(status.items[0].name, "destination_3_guide.json");
        assert_eq!(status.items[1].name, "destination_3_map.json");

        let written: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&receipt.file_path).unwrap()).unwrap();
        assert_eq!(written["type"], "guide");
    }

    #[tokio::test]
    async fn sync_counts_json_files() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = OfflineCache::new(tmp.path(), DEFAULT_MAX_STORAGE_MB);

        assert_matches!(cache.sync("bob").await.unwrap(), SyncOutcome::Error { .. });

        cache.download("bob", 1, DataType::Map).await.unwrap();
        cache.download("bob", 2, DataType::Hotels).await.unwrap();
        std::fs::write(tmp.path().join("bob").join("notes.txt"), b"x").unwrap();

        assert_matches!(
            cache.sync("bob").await.unwrap(),
            SyncOutcome::Synced { files_synced: 2, .. }
        );
    }

    #[tokio::test]
    async fn storage_info_reflects_usage() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = OfflineCache::new(tmp.path(), 500);
        cache.download("carol", 1, DataType::Itinerary).await.unwrap();

        let info = cache.storage_info("carol").await.unwrap();
        assert_eq!(info.max_storage_mb, 500);
        assert!((info.used_mb + info.available_mb - 500.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn download_rejected_when_over_allowance() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = OfflineCache::new(tmp.path(), 0);

        let err = cache.download("dave", 1, DataType::Map).await.unwrap_err();
        assert_matches!(err, CoreError::Conflict(_));
    }

    #[tokio::test]
    async fn directory_at_bundle_path_fails_without_panicking() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = OfflineCache::new(tmp.path(), DEFAULT_MAX_STORAGE_MB);
        std::fs::create_dir_all(tmp.path().join("erin").join("destination_1_map.json")).unwrap();

        let err = cache.download("erin", 1, DataType::Map).await.unwrap_err();
        assert_matches!(err, CoreError::Io(_));
    }

    #[tokio::test]
    async fn unsafe_user_ids_are_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = OfflineCache::new(tmp.path(), DEFAULT_MAX_STORAGE_MB);

        assert_matches!(
            cache.download("../etc", 1, DataType::Map).await,
            Err(CoreError::Validation(_))
        );
        assert_matches!(cache.status("a/b").await, Err(CoreError::Validation(_)));
    }
}
