//! On-disk response cache
//!
//! One JSON file per request, named by the SHA-256 of the request arguments.
//! Entries older than the TTL are deleted the next time they are read.
//!
//! Layers:
//!
//! - [`ResponseCache`] (17lands and Scryfall responses)
//! - `analysis::TrophyCacheStore` (aggregated trophy statistics)
//!
//! Both implement [`CacheLayer`] and are cleared through [`CacheCoordinator`].

pub mod paths;
pub mod traits;

pub use paths::{ensure_cache_dir, get_cache_dir, get_responses_dir, get_trophy_cache_path};
pub use traits::{CacheCoordinator, CacheLayer};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Default time-to-live of a cached response
pub const DEFAULT_TTL_HOURS: i64 = 24;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cache serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Stored form of one response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub timestamp: DateTime<Utc>,
    pub key_args: Vec<String>,
    pub data: Value,
}

/// Summary for `draftmeta cache stats`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub total_bytes: u64,
    pub expired: usize,
}

/// TTL-bounded JSON file cache
#[derive(Debug, Clone)]
pub struct ResponseCache {
    dir: PathBuf,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(dir: impl Into<PathBuf>, ttl_hours: i64) -> Self {
        Self {
            dir: dir.into(),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Cache under the default user cache directory
    pub fn default_location(ttl_hours: i64) -> Self {
        Self::new(get_responses_dir(&get_cache_dir()), ttl_hours)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Hex SHA-256 of the arguments joined with `|`
    pub fn key(args: &[&str]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(args.join("|").as_bytes());
        format!("{:x}", hasher.finalize())
    }

    fn entry_path(&self, args: &[&str]) -> PathBuf {
        self.dir.join(format!("{}.json", Self::key(args)))
    }

    fn is_expired(&self, entry: &CacheEntry) -> bool {
        Utc::now() - entry.timestamp > self.ttl
    }

    /// Cached data, or `None` when missing, expired or unreadable
    pub fn get(&self, args: &[&str]) -> Option<Value> {
        let path = self.entry_path(args);
        let raw = std::fs::read_to_string(&path).ok()?;

        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Dropping unreadable cache entry {}: {}", path.display(), e);
                let _ = std::fs::remove_file(&path);
                return None;
            }
        };

        if self.is_expired(&entry) {
            debug!("Cache entry expired: {}", args.join(" "));
            let _ = std::fs::remove_file(&path);
            return None;
        }

        debug!("Cache hit: {}", args.join(" "));
        Some(entry.data)
    }

    pub fn set(&self, args: &[&str], data: &Value) -> Result<(), CacheError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| CacheError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let entry = CacheEntry {
            timestamp: Utc::now(),
            key_args: args.iter().map(|s| s.to_string()).collect(),
            data: data.clone(),
        };
        let path = self.entry_path(args);
        let json = serde_json::to_string(&entry)?;
        std::fs::write(&path, json).map_err(|source| CacheError::Io { path, source })
    }

    /// Remove one entry; true if something was deleted
    pub fn invalidate(&self, args: &[&str]) -> bool {
        std::fs::remove_file(self.entry_path(args)).is_ok()
    }

    fn entry_files(&self) -> Vec<PathBuf> {
        let Ok(read_dir) = std::fs::read_dir(&self.dir) else {
            return Vec::new();
        };
        read_dir
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("json"))
            .collect()
    }

    /// Delete every entry, returning how many were removed
    pub fn clear_all(&self) -> usize {
        self.entry_files()
            .into_iter()
            .filter(|p| std::fs::remove_file(p).is_ok())
            .count()
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = CacheStats::default();
        for path in self.entry_files() {
            stats.entries += 1;
            stats.total_bytes += std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);

            let expired = std::fs::read_to_string(&path)
                .ok()
                .and_then(|raw| serde_json::from_str::<CacheEntry>(&raw).ok())
                .map(|entry| self.is_expired(&entry))
                .unwrap_or(true);
            if expired {
                stats.expired += 1;
            }
        }
        stats
    }
}

impl CacheLayer for ResponseCache {
    fn name(&self) -> &str {
        "responses"
    }

    fn is_populated(&self) -> bool {
        !self.entry_files().is_empty()
    }

    fn invalidate_all(&mut self) -> usize {
        self.clear_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_is_stable_and_distinct() {
        let a = ResponseCache::key(&["card_ratings", "FDN", "PremierDraft"]);
        let b = ResponseCache::key(&["card_ratings", "FDN", "PremierDraft"]);
        let c = ResponseCache::key(&["card_ratings", "FDN", "QuickDraft"]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_set_get_invalidate() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(tmp.path(), DEFAULT_TTL_HOURS);
        let args = ["color_ratings", "FDN", "PremierDraft"];

        assert!(cache.get(&args).is_none());
        cache.set(&args, &json!([{"color_name": "WU"}])).unwrap();
        assert_eq!(cache.get(&args), Some(json!([{"color_name": "WU"}])));

        assert!(cache.invalidate(&args));
        assert!(cache.get(&args).is_none());
        assert!(!cache.invalidate(&args));
    }

    #[test]
    fn test_expired_entry_is_removed() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(tmp.path(), 0);
        let args = ["card_ratings", "DSK"];
        cache.set(&args, &json!({"x": 1})).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));

        assert_eq!(cache.stats().expired, 1);
        assert!(cache.get(&args).is_none());
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn test_corrupt_entry_is_dropped() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = ResponseCache::new(tmp.path(), DEFAULT_TTL_HOURS);
        let args = ["broken"];
        std::fs::write(tmp.path().join(format!("{}.json", ResponseCache::key(&args))), "{nope").unwrap();
        assert!(cache.get(&args).is_none());
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn test_clear_all_and_stats() {
        let tmp = tempfile::tempdir().unwrap();
        let mut cache = ResponseCache::new(tmp.path(), DEFAULT_TTL_HOURS);
        cache.set(&["a"], &json!(1)).unwrap();
        cache.set(&["b"], &json!(2)).unwrap();

        let stats = cache.stats();
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.expired, 0);
        assert!(stats.total_bytes > 0);
        assert!(cache.is_populated());

        assert_eq!(cache.invalidate_all(), 2);
        assert!(!cache.is_populated());
    }
}
