//! # Curation Orchestrator
//!
//! This module coordinates the entire curation pipeline for one playlist:
//! 1. Resolve raw candidates for the playlist's query (search cache)
//! 2. Drop videos already delivered for the playlist
//! 3. Apply the playlist's filter criteria
//! 4. Select with discovery, or rank and truncate
//! 5. Return the videos with cache metadata and any provider warning
//!
//! Provider failures are not errors here: stale or empty results come back
//! with the failure attached in `CurationResult::error`.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use data_loader::Video;
use pipeline::{DiscoveryBlender, FilterPipeline};
use search_cache::{CacheStore, FileCacheStore, InMemoryCacheStore, SearchCache};
use sources::{
    PlaylistContext, ProviderError, ProviderErrorKind, RelatedVideoCache, RelatedVideoSource,
    SearchProvider,
};

use crate::config::CuratorConfig;

/// A provider failure as shown to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(rename = "type")]
    pub kind: ProviderErrorKind,
    pub message: String,
}

impl From<ProviderError> for ErrorDetail {
    fn from(error: ProviderError) -> Self {
        Self {
            kind: error.kind,
            message: error.message,
        }
    }
}

/// Outcome of one curation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurationResult {
    pub videos: Vec<Video>,
    pub from_cache: bool,
    pub cache_expires_utc: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

impl CurationResult {
    /// Cached data served in place of a failed fetch
    pub fn is_stale(&self) -> bool {
        self.from_cache && self.error.is_some()
    }
}

/// Main orchestrator that coordinates the curation pipeline
#[derive(Clone)]
pub struct CurationOrchestrator {
    search_cache: Arc<SearchCache>,
    filter_pipeline: Arc<FilterPipeline>,
    blender: Arc<DiscoveryBlender>,
}

impl CurationOrchestrator {
    /// Assemble an orchestrator from ready-made components
    ///
    /// # Arguments
    /// * `search_cache` - Cache in front of the content provider
    /// * `related` - Source of wildcard candidates
    pub fn new(search_cache: SearchCache, related: Arc<dyn RelatedVideoSource>) -> Self {
        Self {
            search_cache: Arc::new(search_cache),
            filter_pipeline: Arc::new(FilterPipeline::standard()),
            blender: Arc::new(DiscoveryBlender::new(related)),
        }
    }

    /// Build every component from configuration
    ///
    /// 1. Open the file cache store when `cache_dir` is set, in-memory otherwise
    /// 2. Wrap the provider in a `SearchCache` with the configured TTL, timeout and cap
    /// 3. Wrap the related source in a bounded, expiring cache
    pub async fn from_config<R>(
        provider: Arc<dyn SearchProvider>,
        related: R,
        config: &CuratorConfig,
    ) -> Result<Self>
    where
        R: RelatedVideoSource + 'static,
    {
        let store: Arc<dyn CacheStore> = match &config.cache_dir {
            Some(dir) => Arc::new(
                FileCacheStore::open(dir)
                    .await
                    .with_context(|| format!("Failed to open cache dir {}", dir.display()))?,
            ),
            None => Arc::new(InMemoryCacheStore::new()),
        };

        let search_cache = SearchCache::new(provider, store)
            .with_ttl(config.cache_ttl())
            .with_fetch_timeout(config.provider_timeout())
            .with_max_results(config.provider_max_results);

        let related = RelatedVideoCache::with_limits(
            related,
            config.related_ttl(),
            config.related_cache_capacity,
        );

        info!("Curator configured: {}", config.summary());
        Ok(Self::new(search_cache, Arc::new(related)))
    }

    /// Main entry point: curate videos for a playlist
    ///
    /// # Returns
    /// The selected videos, at most `context.desired_count`, plus cache
    /// metadata. Fails only if a filter fails.
    #[instrument(skip(self, context), fields(playlist = %context.playlist_id))]
    pub async fn curate(&self, context: &PlaylistContext) -> Result<CurationResult> {
        let start_time = Instant::now();

        let outcome = self.search_cache.get_or_fetch(&context.search_query).await;
        info!(
            "Resolved {} candidates (from_cache={})",
            outcome.videos.len(),
            outcome.from_cache
        );
        if let Some(error) = &outcome.error {
            warn!("Search for '{}' reported {}", context.search_query, error);
        }

        let filtered = self
            .filter_pipeline
            .apply(outcome.videos, context)
            .context("Failed to filter candidates")?;
        info!("Applied filters, candidates remaining: {}", filtered.len());

        let videos = self
            .blender
            .select_with_discovery(
                filtered,
                context.discovery.as_ref(),
                context.sort_strategy,
                context.desired_count,
            )
            .await;

        info!(
            "Selected {} videos for playlist {} in {:.2?}",
            videos.len(),
            context.playlist_id,
            start_time.elapsed()
        );

        Ok(CurationResult {
            videos,
            from_cache: outcome.from_cache,
            cache_expires_utc: outcome.expires_at,
            error: outcome.error.map(ErrorDetail::from),
        })
    }

    /// Drop the cached search for `query`
    pub async fn invalidate(&self, query: &str) -> Result<bool> {
        self.search_cache
            .invalidate(query)
            .await
            .context("Failed to invalidate cache entry")
    }

    /// Remove every expired cached search
    pub async fn cleanup_expired(&self) -> Result<usize> {
        self.search_cache
            .cleanup_expired()
            .await
            .context("Failed to clean up expired cache entries")
    }

    /// Why a video was selected
    pub fn explain(video: &Video) -> &str {
        DiscoveryBlender::selection_explanation(video)
    }
}
