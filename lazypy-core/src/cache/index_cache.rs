//! `src/cache/index_cache.rs`
//! ============================================================================
//! # Remote Index Snapshot Cache
//!
//! Persists the remote package name list as one JSON document:
//!
//! ```json
//! { "packages": ["requests", "flask"], "timestamp": "2026-10-14T09:12:00Z" }
//! ```
//!
//! - A snapshot is fresh iff `now - timestamp <= 24h`.
//! - Missing, unreadable, unparseable and expired snapshots all read as
//!   "no cache". Loading never fails the startup path.
//! - Saving replaces the whole file (written to a sibling temp file and
//!   renamed into place).

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use tokio::fs as TokioFs;
use tracing::{debug, info, instrument, warn};

use crate::{config::Config, error::AppError};

pub const CACHE_FILE_NAME: &str = "pypi_packages_cache.json";

/// Freshness window of a snapshot.
pub const CACHE_MAX_AGE: Duration = Duration::hours(24);

/// On-disk representation of a cached index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSnapshot {
    #[serde(rename = "packages")]
    pub names: Vec<CompactString>,

    #[serde(rename = "timestamp")]
    pub captured_at: DateTime<Utc>,
}

impl CacheSnapshot {
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.captured_at) <= CACHE_MAX_AGE
    }
}

/// Result of [`IndexCache::load_at`]. `names` is empty whenever `valid` is false.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheLoad {
    pub names: Vec<CompactString>,
    pub valid: bool,
}

impl CacheLoad {
    fn miss() -> Self {
        Self::default()
    }
}

/// Handle to the snapshot file.
#[derive(Debug, Clone)]
pub struct IndexCache {
    path: PathBuf,
}

impl IndexCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Snapshot file inside the OS cache directory for this app.
    pub fn default_location() -> Result<Self, AppError> {
        let dirs = Config::project_dirs().map_err(|e| AppError::Cache(e.to_string()))?;
        Ok(Self::new(dirs.cache_dir().join(CACHE_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> CacheLoad {
        self.load_at(Utc::now()).await
    }

    /// Read the snapshot and judge its freshness against `now`.
    #[instrument(level = "debug", skip(self), fields(path = %self.path.display()))]
    pub async fn load_at(&self, now: DateTime<Utc>) -> CacheLoad {
        let bytes = match TokioFs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!("No usable index cache: {}", e);
                return CacheLoad::miss();
            }
        };

        let snapshot: CacheSnapshot = match serde_json::from_slice(&bytes) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Ignoring unparseable index cache: {}", e);
                return CacheLoad::miss();
            }
        };

        if !snapshot.is_fresh_at(now) {
            info!(
                "Index cache expired (captured at {})",
                snapshot.captured_at.to_rfc3339()
            );
            return CacheLoad::miss();
        }

        info!("Loaded {} names from index cache", snapshot.names.len());
        CacheLoad {
            names: snapshot.names,
            valid: true,
        }
    }

    pub async fn save(&self, names: &[CompactString]) -> Result<(), AppError> {
        self.save_at(names, Utc::now()).await
    }

    /// Replace the snapshot with `names` captured at `now`.
    #[instrument(level = "debug", skip(self, names), fields(count = names.len()))]
    pub async fn save_at(&self, names: &[CompactString], now: DateTime<Utc>) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            TokioFs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::path_io(parent, e))?;
        }

        let snapshot = CacheSnapshot {
            names: names.to_vec(),
            captured_at: now,
        };
        let data = serde_json::to_vec(&snapshot)?;

        let tmp = self.path.with_extension("json.tmp");
        TokioFs::write(&tmp, data)
            .await
            .map_err(|e| AppError::path_io(&tmp, e))?;
        TokioFs::rename(&tmp, &self.path)
            .await
            .map_err(|e| AppError::path_io(&self.path, e))?;

        info!("Saved {} names to index cache", names.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn names(list: &[&str]) -> Vec<CompactString> {
        list.iter().map(|s| CompactString::from(*s)).collect()
    }

    fn cache_in(dir: &TempDir) -> IndexCache {
        IndexCache::new(dir.path().join("nested").join(CACHE_FILE_NAME))
    }

    #[tokio::test]
    async fn test_roundtrip_within_window() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);
        let now = Utc::now();
        let list = names(&["requests", "flask", "numpy"]);

        cache.save_at(&list, now).await.unwrap();
        let loaded = cache.load_at(now + Duration::hours(23)).await;

        assert!(loaded.valid);
        assert_eq!(loaded.names, list);
    }

    #[tokio::test]
    async fn test_expired_after_window() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);
        let now = Utc::now();

        cache.save_at(&names(&["requests"]), now - Duration::hours(25)).await.unwrap();
        let loaded = cache.load_at(now).await;

        assert!(!loaded.valid);
        assert!(loaded.names.is_empty());
    }

    #[tokio::test]
    async fn test_missing_and_corrupt_files_read_as_miss() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);
        assert_eq!(cache.load().await, CacheLoad::default());

        std::fs::create_dir_all(cache.path().parent().unwrap()).unwrap();
        std::fs::write(cache.path(), b"{ not json").unwrap();
        assert!(!cache.load().await.valid);
    }

    #[tokio::test]
    async fn test_save_replaces_previous_snapshot() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);
        let now = Utc::now();

        cache.save_at(&names(&["a", "b", "c"]), now).await.unwrap();
        cache.save_at(&names(&["z"]), now).await.unwrap();

        assert_eq!(cache.load_at(now).await.names, names(&["z"]));
    }

    #[tokio::test]
    async fn test_wire_format_uses_rfc3339_timestamp() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir);
        let now = Utc::now();
        cache.save_at(&names(&["flask"]), now).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(cache.path()).unwrap()).unwrap();
        assert_eq!(raw["packages"][0], "flask");
        let ts = raw["timestamp"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(ts).is_ok());
    }
}
