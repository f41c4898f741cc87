//! Related Videos - wildcard candidates for discovery mode
//!
//! ## Components
//! - `RelatedVideoSource`: best-effort lookup of videos related to a seed
//! - `CatalogRelatedSource`: related videos from the local catalogue
//! - `EmptyRelatedSource`: a source that never finds anything
//! - `RelatedVideoCache`: bounded LRU + TTL cache in front of any source
//!
//! The cache is process-local and ephemeral: entries expire 24 hours after
//! they are written and a restart clears them all.

use async_trait::async_trait;
use data_loader::{Video, VideoCatalog};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Default lifetime of a cached related-video list
pub const DEFAULT_RELATED_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Default number of seeds kept in the related-video cache
pub const DEFAULT_RELATED_CAPACITY: u64 = 1_000;

/// Best-effort source of videos related to a seed video.
///
/// Implementations never fail: internal errors produce an empty list.
#[async_trait]
pub trait RelatedVideoSource: Send + Sync {
    async fn get_related(&self, seed_video_id: &str, max_results: usize) -> Vec<Video>;
}

/// Source that never returns related videos.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyRelatedSource;

#[async_trait]
impl RelatedVideoSource for EmptyRelatedSource {
    async fn get_related(&self, _seed_video_id: &str, _max_results: usize) -> Vec<Video> {
        Vec::new()
    }
}

/// Minimum length of a title term shared with the seed to count as related
const MIN_SHARED_TERM_LEN: usize = 4;

/// Finds related videos in a `VideoCatalog`.
///
/// ## Algorithm
/// 1. Look up the seed; unknown seeds have no related videos
/// 2. Other videos from the seed's channel come first
/// 3. Then videos sharing title terms with the seed, most shared terms first
/// 4. Cap at `max_results`
#[derive(Clone)]
pub struct CatalogRelatedSource {
    catalog: Arc<VideoCatalog>,
}

impl CatalogRelatedSource {
    pub fn new(catalog: Arc<VideoCatalog>) -> Self {
        Self { catalog }
    }

    fn title_terms(title: &str) -> HashSet<String> {
        title
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| t.chars().count() >= MIN_SHARED_TERM_LEN)
            .map(str::to_lowercase)
            .collect()
    }
}

#[async_trait]
impl RelatedVideoSource for CatalogRelatedSource {
    #[instrument(skip(self))]
    async fn get_related(&self, seed_video_id: &str, max_results: usize) -> Vec<Video> {
        let Some(seed) = self.catalog.get_video(seed_video_id) else {
            debug!("Seed video {} not in catalogue", seed_video_id);
            return Vec::new();
        };

        // Strategy 1: same channel
        let mut related: Vec<Video> = self
            .catalog
            .videos_by_channel(&seed.channel_id)
            .into_iter()
            .filter(|v| v.video_id != seed.video_id)
            .cloned()
            .collect();
        let mut taken: HashSet<&str> = related.iter().map(|v| v.video_id.as_str()).collect();
        taken.insert(seed.video_id.as_str());

        // Strategy 2: shared title terms
        let seed_terms = Self::title_terms(&seed.title);
        let mut shared: HashMap<&str, usize> = HashMap::new();
        for video in self.catalog.iter() {
            if taken.contains(video.video_id.as_str()) {
                continue;
            }
            let count = Self::title_terms(&video.title)
                .intersection(&seed_terms)
                .count();
            if count > 0 {
                shared.insert(video.video_id.as_str(), count);
            }
        }

        let mut by_terms: Vec<&Video> = self
            .catalog
            .iter()
            .filter(|v| shared.contains_key(v.video_id.as_str()))
            .collect();
        // Stable: ties keep catalogue order
        by_terms.sort_by(|a, b| shared[b.video_id.as_str()].cmp(&shared[a.video_id.as_str()]));
        related.extend(by_terms.into_iter().cloned());

        related.truncate(max_results);
        debug!("Found {} related videos for {}", related.len(), seed_video_id);
        related
    }
}

/// Bounded, expiring cache in front of a `RelatedVideoSource`.
///
/// Backed by a `moka` cache, which is internally synchronised: concurrent
/// readers only ever observe fully written entries.
pub struct RelatedVideoCache<S> {
    inner: S,
    entries: moka::sync::Cache<String, Arc<Vec<Video>>>,
}

impl<S: RelatedVideoSource> RelatedVideoCache<S> {
    /// Wrap `inner` with the default TTL (24h) and capacity (1,000 seeds)
    pub fn new(inner: S) -> Self {
        Self::with_limits(inner, DEFAULT_RELATED_TTL, DEFAULT_RELATED_CAPACITY)
    }

    /// Wrap `inner` with a custom TTL and maximum number of cached seeds
    pub fn with_limits(inner: S, ttl: Duration, capacity: u64) -> Self {
        Self {
            inner,
            entries: moka::sync::Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Drop the cached list for one seed
    pub fn invalidate(&self, seed_video_id: &str) {
        self.entries.invalidate(seed_video_id);
    }

    /// Number of cached seeds
    pub fn len(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl<S: RelatedVideoSource> RelatedVideoSource for RelatedVideoCache<S> {
    async fn get_related(&self, seed_video_id: &str, max_results: usize) -> Vec<Video> {
        if seed_video_id.trim().is_empty() {
            return Vec::new();
        }

        if let Some(cached) = self.entries.get(seed_video_id) {
            debug!("Related-video cache hit for {}", seed_video_id);
            return cached.iter().take(max_results).cloned().collect();
        }

        let videos = self.inner.get_related(seed_video_id, max_results).await;
        self.entries
            .insert(seed_video_id.to_string(), Arc::new(videos.clone()));
        videos
    }
}
