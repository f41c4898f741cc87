//! Persistent storage contract for cached search results
//!
//! A `CacheStore` is a key-value store keyed by the normalised query. Upsert
//! replaces any existing entry for the key, so two concurrent misses for the
//! same query simply overwrite each other.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use data_loader::Video;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors raised by a `CacheStore` backend
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Cache store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to (de)serialise cache entry: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cache entry for '{key}' is corrupt: {reason}")]
    Corrupt { key: String, reason: String },
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// One cached search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// Normalised query; unique per store
    pub query_key: String,
    pub videos: Vec<Video>,
    pub fetched_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(
        query_key: impl Into<String>,
        videos: Vec<Video>,
        fetched_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            query_key: query_key.into(),
            videos,
            fetched_at,
            expires_at: fetched_at + ttl,
        }
    }

    /// An entry is fresh strictly before its expiry instant
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Key-value storage for `CacheEntry` values.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Look up the entry for a key, fresh or stale
    async fn get(&self, query_key: &str) -> Result<Option<CacheEntry>>;

    /// Insert the entry, replacing any existing entry with the same key
    async fn upsert(&self, entry: CacheEntry) -> Result<()>;

    /// Delete the entry for a key; returns whether one existed
    async fn delete(&self, query_key: &str) -> Result<bool>;

    /// Delete every entry with `expires_at <= now`; returns how many were removed
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize>;
}

/// Process-local `CacheStore` backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct InMemoryCacheStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(&self, query_key: &str) -> Result<Option<CacheEntry>> {
        Ok(self.entries.read().await.get(query_key).cloned())
    }

    async fn upsert(&self, entry: CacheEntry) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(entry.query_key.clone(), entry);
        Ok(())
    }

    async fn delete(&self, query_key: &str) -> Result<bool> {
        Ok(self.entries.write().await.remove(query_key).is_some())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_fresh(now));
        Ok(before - entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str, expires_in_minutes: i64) -> CacheEntry {
        let now = Utc::now();
        CacheEntry {
            query_key: key.to_string(),
            videos: vec![Video::new("v1", "Test", "UC1", now)],
            fetched_at: now - Duration::hours(1),
            expires_at: now + Duration::minutes(expires_in_minutes),
        }
    }

    #[test]
    fn test_entry_freshness_boundary() {
        let now = Utc::now();
        let e = CacheEntry::new("q", Vec::new(), now, Duration::hours(1));
        assert!(e.is_fresh(now));
        assert!(!e.is_fresh(now + Duration::hours(1)));
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing_key() {
        let store = InMemoryCacheStore::new();
        store.upsert(entry("q", 30)).await.unwrap();

        let mut replacement = entry("q", 60);
        replacement.videos.clear();
        store.upsert(replacement.clone()).await.unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(store.get("q").await.unwrap(), Some(replacement));
    }

    #[tokio::test]
    async fn test_delete() {
        let store = InMemoryCacheStore::new();
        store.upsert(entry("q", 30)).await.unwrap();

        assert!(store.delete("q").await.unwrap());
        assert!(!store.delete("q").await.unwrap());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_delete_expired_keeps_fresh_entries() {
        let store = InMemoryCacheStore::new();
        store.upsert(entry("expired1", -30)).await.unwrap();
        store.upsert(entry("expired2", -10)).await.unwrap();
        store.upsert(entry("valid", 60)).await.unwrap();

        let removed = store.delete_expired(Utc::now()).await.unwrap();

        assert_eq!(removed, 2);
        assert!(store.get("valid").await.unwrap().is_some());
        assert!(store.get("expired1").await.unwrap().is_none());
    }
}
