//! SearchCache - TTL cache between a query and the search provider
//!
//! ## Algorithm
//! 1. Blank query → `InvalidQuery`, provider never contacted
//! 2. Fresh entry for the normalised query → serve it
//! 3. Otherwise ask the provider (with a timeout)
//! 4. Success → upsert with a new TTL and return fresh data
//! 5. Transient failure (`QuotaExceeded`, `NetworkError`) → serve the stale
//!    entry if there is one, with the error attached
//! 6. Any other failure → empty list plus the error
//!
//! Store failures never fail a lookup: a failed read counts as a miss and a
//! failed write still returns the fresh data.

use crate::store::{CacheEntry, CacheStore, Result};
use chrono::{DateTime, Duration, Utc};
use data_loader::Video;
use sources::{ProviderError, SearchProvider};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Default entry lifetime: one hour
pub const DEFAULT_TTL_SECS: i64 = 60 * 60;

/// Default cap on videos requested from the provider
pub const DEFAULT_MAX_RESULTS: usize = 50;

/// Default provider call timeout
pub const DEFAULT_FETCH_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Result of `SearchCache::get_or_fetch`.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub videos: Vec<Video>,
    /// True when `videos` came from the store, fresh or stale
    pub from_cache: bool,
    pub expires_at: Option<DateTime<Utc>>,
    /// Provider failure, present alongside stale data or an empty list
    pub error: Option<ProviderError>,
}

impl SearchOutcome {
    fn failed(error: ProviderError) -> Self {
        Self {
            videos: Vec::new(),
            from_cache: false,
            expires_at: None,
            error: Some(error),
        }
    }

    fn cached(entry: CacheEntry, error: Option<ProviderError>) -> Self {
        Self {
            videos: entry.videos,
            from_cache: true,
            expires_at: Some(entry.expires_at),
            error,
        }
    }

    /// Stale data served because the provider failed transiently
    pub fn is_stale(&self) -> bool {
        self.from_cache && self.error.is_some()
    }
}

/// Trim, collapse internal whitespace and lower-case a query.
///
/// Queries differing only in case or spacing share one cache entry.
pub fn normalize_query(query: &str) -> String {
    query
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Cache-with-fallback in front of a `SearchProvider`.
pub struct SearchCache {
    provider: Arc<dyn SearchProvider>,
    store: Arc<dyn CacheStore>,
    ttl: Duration,
    fetch_timeout: std::time::Duration,
    max_results: usize,
}

impl SearchCache {
    pub fn new(provider: Arc<dyn SearchProvider>, store: Arc<dyn CacheStore>) -> Self {
        Self {
            provider,
            store,
            ttl: Duration::seconds(DEFAULT_TTL_SECS),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Return the best available video list for `query`.
    ///
    /// Never fails: provider errors are reported in `SearchOutcome::error`.
    #[instrument(skip(self), fields(provider = self.provider.name()))]
    pub async fn get_or_fetch(&self, query: &str) -> SearchOutcome {
        let key = normalize_query(query);
        if key.is_empty() {
            return SearchOutcome::failed(ProviderError::invalid_query());
        }

        let now = Utc::now();
        let cached = match self.store.get(&key).await {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Cache read failed for '{}', treating as miss: {}", key, e);
                None
            }
        };

        if let Some(entry) = cached.as_ref().filter(|e| e.is_fresh(now)) {
            debug!("Cache hit for '{}' ({} videos)", key, entry.videos.len());
            return SearchOutcome::cached(entry.clone(), None);
        }

        match self.fetch(query.trim()).await {
            Ok(videos) => self.store_fresh(key, videos).await,
            Err(error) if error.kind.is_transient() => match cached {
                Some(stale) => {
                    warn!(
                        "Provider failed transiently for '{}', serving stale entry: {}",
                        key, error
                    );
                    SearchOutcome::cached(stale, Some(error))
                }
                None => {
                    warn!("Provider failed transiently for '{}', nothing cached: {}", key, error);
                    SearchOutcome::failed(error)
                }
            },
            Err(error) => {
                warn!("Provider failed for '{}': {}", key, error);
                SearchOutcome::failed(error)
            }
        }
    }

    async fn fetch(&self, query: &str) -> std::result::Result<Vec<Video>, ProviderError> {
        match tokio::time::timeout(
            self.fetch_timeout,
            self.provider.search(query, self.max_results),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(ProviderError::network(format!(
                "provider did not answer within {:?}",
                self.fetch_timeout
            ))),
        }
    }

    async fn store_fresh(&self, key: String, videos: Vec<Video>) -> SearchOutcome {
        // Discovery annotations belong to a single run
        let videos: Vec<Video> = videos.iter().map(Video::without_reason).collect();
        let entry = CacheEntry::new(key, videos, Utc::now(), self.ttl);
        let expires_at = entry.expires_at;

        debug!("Fetched {} videos for '{}'", entry.videos.len(), entry.query_key);
        let videos = entry.videos.clone();
        if let Err(e) = self.store.upsert(entry).await {
            warn!("Cache write failed, returning fresh data uncached: {}", e);
        }

        SearchOutcome {
            videos,
            from_cache: false,
            expires_at: Some(expires_at),
            error: None,
        }
    }

    /// Drop the cached entry for `query`, if any
    #[instrument(skip(self))]
    pub async fn invalidate(&self, query: &str) -> Result<bool> {
        let key = normalize_query(query);
        if key.is_empty() {
            return Ok(false);
        }
        let removed = self.store.delete(&key).await?;
        if removed {
            info!("Invalidated cache entry for '{}'", key);
        }
        Ok(removed)
    }

    /// Delete every expired entry; returns how many were removed
    #[instrument(skip(self))]
    pub async fn cleanup_expired(&self) -> Result<usize> {
        let removed = self.store.delete_expired(Utc::now()).await?;
        info!("Removed {} expired cache entries", removed);
        Ok(removed)
    }
}
