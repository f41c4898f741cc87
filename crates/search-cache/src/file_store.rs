//! File-backed `CacheStore`: one JSON file per query
//!
//! Entries survive restarts. Each write goes to its own uniquely named
//! temporary file that is then renamed over the target, so readers never see
//! a half-written entry and concurrent writers for one key never share a
//! temporary file. The last rename wins.

use crate::store::{CacheEntry, CacheStore, Result, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Readable prefix length of a cache file name
const SLUG_LEN: usize = 30;

/// Stores cache entries as JSON files in a directory.
#[derive(Debug, Clone)]
pub struct FileCacheStore {
    cache_dir: PathBuf,
}

impl FileCacheStore {
    /// Open (creating if needed) a cache directory
    pub async fn open(cache_dir: impl Into<PathBuf>) -> Result<Self> {
        let cache_dir = cache_dir.into();
        tokio::fs::create_dir_all(&cache_dir).await?;
        info!("Search cache directory: {}", cache_dir.display());
        Ok(Self { cache_dir })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// File name for a query key: readable slug plus a hash of the full key
    fn file_name(query_key: &str) -> String {
        let slug: String = query_key
            .chars()
            .take(SLUG_LEN)
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();

        let mut hasher = DefaultHasher::new();
        query_key.hash(&mut hasher);

        format!("{}_{:016x}.json", slug, hasher.finish())
    }

    fn entry_path(&self, query_key: &str) -> PathBuf {
        self.cache_dir.join(Self::file_name(query_key))
    }

    async fn read_entry(path: &Path) -> Result<Option<CacheEntry>> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| StoreError::Corrupt {
                key: path.display().to_string(),
                reason: e.to_string(),
            })
    }

    /// Write `bytes` to a fresh temp file in `dir`, then rename it onto `target`
    fn write_replacing(dir: &Path, target: &Path, bytes: &[u8]) -> std::io::Result<()> {
        let mut tmp = tempfile::Builder::new()
            .prefix(".entry-")
            .suffix(".tmp")
            .tempfile_in(dir)?;
        tmp.write_all(bytes)?;
        tmp.persist(target).map_err(|e| e.error)?;
        Ok(())
    }

    async fn remove_if_present(path: &Path) -> Result<bool> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl CacheStore for FileCacheStore {
    async fn get(&self, query_key: &str) -> Result<Option<CacheEntry>> {
        let entry = Self::read_entry(&self.entry_path(query_key)).await?;

        // Guard against two keys hashing to the same file
        Ok(entry.filter(|e| e.query_key == query_key))
    }

    async fn upsert(&self, entry: CacheEntry) -> Result<()> {
        let path = self.entry_path(&entry.query_key);
        let json = serde_json::to_vec_pretty(&entry)?;

        let dir = self.cache_dir.clone();
        let target = path.clone();
        tokio::task::spawn_blocking(move || Self::write_replacing(&dir, &target, &json))
            .await
            .map_err(std::io::Error::other)??;

        debug!(
            "Stored {} videos for '{}' in {}",
            entry.videos.len(),
            entry.query_key,
            path.display()
        );
        Ok(())
    }

    async fn delete(&self, query_key: &str) -> Result<bool> {
        let path = self.entry_path(query_key);
        match Self::read_entry(&path).await {
            Ok(Some(entry)) if entry.query_key != query_key => return Ok(false),
            Ok(None) => return Ok(false),
            _ => {}
        }
        Self::remove_if_present(&path).await
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut removed = 0;
        let mut entries = tokio::fs::read_dir(&self.cache_dir).await?;

        while let Some(dir_entry) = entries.next_entry().await? {
            let path = dir_entry.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }

            match Self::read_entry(&path).await {
                Ok(Some(entry)) if !entry.is_fresh(now) => {
                    if Self::remove_if_present(&path).await? {
                        removed += 1;
                        debug!("Removed expired cache entry: {}", path.display());
                    }
                }
                Ok(_) => {}
                Err(e) => warn!("Skipping unreadable cache file {}: {}", path.display(), e),
            }
        }

        if removed > 0 {
            info!("Cleaned up {} expired search cache entries", removed);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use data_loader::Video;
    use tempfile::TempDir;

    fn entry(key: &str, expires_in_minutes: i64) -> CacheEntry {
        let now = Utc::now();
        CacheEntry {
            query_key: key.to_string(),
            videos: vec![Video::new("v1", "Cached", "UC1", now - Duration::days(1))],
            fetched_at: now - Duration::hours(2),
            expires_at: now + Duration::minutes(expires_in_minutes),
        }
    }

    #[test]
    fn test_file_name_is_filesystem_safe() {
        let name = FileCacheStore::file_name("rust / async? *tutorial*");
        assert!(name.ends_with(".json"));
        assert!(name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.'));
        assert_ne!(name, FileCacheStore::file_name("rust / async? *tutorial"));
    }

    #[tokio::test]
    async fn test_round_trip_and_replace() {
        let dir = TempDir::new().unwrap();
        let store = FileCacheStore::open(dir.path()).await.unwrap();

        assert!(store.get("unity tutorial").await.unwrap().is_none());

        let first = entry("unity tutorial", 30);
        store.upsert(first.clone()).await.unwrap();
        assert_eq!(store.get("unity tutorial").await.unwrap(), Some(first));

        let second = entry("unity tutorial", 60);
        store.upsert(second.clone()).await.unwrap();
        assert_eq!(store.get("unity tutorial").await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn test_entries_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let e = entry("godot", 30);
        FileCacheStore::open(dir.path()).await.unwrap().upsert(e.clone()).await.unwrap();

        let reopened = FileCacheStore::open(dir.path()).await.unwrap();
        assert_eq!(reopened.get("godot").await.unwrap(), Some(e));
    }

    #[tokio::test]
    async fn test_delete_and_delete_expired() {
        let dir = TempDir::new().unwrap();
        let store = FileCacheStore::open(dir.path()).await.unwrap();

        store.upsert(entry("expired1", -30)).await.unwrap();
        store.upsert(entry("expired2", -10)).await.unwrap();
        store.upsert(entry("valid", 60)).await.unwrap();
        store.upsert(entry("doomed", 60)).await.unwrap();

        assert!(store.delete("doomed").await.unwrap());
        assert!(!store.delete("doomed").await.unwrap());

        assert_eq!(store.delete_expired(Utc::now()).await.unwrap(), 2);
        assert!(store.get("valid").await.unwrap().is_some());
        assert!(store.get("expired1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_upserts_to_one_key() {
        let dir = TempDir::new().unwrap();
        let store = FileCacheStore::open(dir.path()).await.unwrap();

        for _ in 0..10 {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let store = store.clone();
                    tokio::spawn(async move { store.upsert(entry("same", 30 + i)).await })
                })
                .collect();

            for handle in handles {
                handle.await.unwrap().unwrap();
            }
        }

        let stored = store.get("same").await.unwrap().unwrap();
        assert_eq!(stored.query_key, "same");

        // No temp files are left behind
        let mut files = std::fs::read_dir(dir.path()).unwrap();
        let only = files.next().unwrap().unwrap();
        assert_eq!(only.file_name().to_string_lossy(), FileCacheStore::file_name("same"));
        assert!(files.next().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = FileCacheStore::open(dir.path()).await.unwrap();
        let path = store.entry_path("broken");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let err = store.get("broken").await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));

        // Cleanup skips it rather than failing
        assert_eq!(store.delete_expired(Utc::now()).await.unwrap(), 0);
    }
}
