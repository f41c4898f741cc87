//! DiscoveryBlender: mixes strict, relaxed and wildcard picks.
//!
//! ## Algorithm
//! Without a discovery config the candidates are ranked and truncated.
//! Otherwise, for `desired` results:
//! 1. Pool = first `desired × 3` candidates, in the order received
//! 2. `strictCount = ceil(desired × strict%)`, `relaxedCount = ceil(desired × relaxed%)`,
//!    `wildCount = desired - strictCount - relaxedCount`
//! 3. Strict: first `floor(pool × strict%)` pool items, at most `strictCount`
//! 4. Relaxed: the next `floor(pool × relaxed%)` items, at most `relaxedCount`
//! 5. Wild: if `wildCount > 0`, wildcards are enabled and a category is
//!    configured, ask the related source for `wildCount` videos around the
//!    first pool item and classify each against it
//! 6. Rank the union and keep the first `desired`
//!
//! Every returned video carries a discovery reason.

use crate::ranking::RankingEngine;
use data_loader::{
    DiscoveryConfig, SortStrategy, Video, WILDCARD_LOW_POP_HIGH_QUALITY, WILDCARD_OTHER_FORMAT,
    WILDCARD_OTHER_LANGUAGE,
};
use sources::RelatedVideoSource;
use std::sync::Arc;
use tracing::{debug, info, instrument};

pub const STRICT_REASON: &str = "Strict match - all criteria met";
pub const RELAXED_REASON: &str = "Relaxed match - one criterion relaxed";
pub const DEFAULT_EXPLANATION: &str = "Selected video";

/// Like ratio a lower-view wildcard needs to count as high quality
const HIGH_QUALITY_LIKE_RATIO: f64 = 0.05;

/// How a discovery run split its result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SliceCounts {
    strict: usize,
    relaxed: usize,
    /// Negative when strict and relaxed percentages exceed 100
    wild: i64,
}

impl SliceCounts {
    fn new(desired: usize, config: &DiscoveryConfig) -> Self {
        let share = |pct: u32| (desired as f64 * f64::from(pct) / 100.0).ceil() as usize;
        let strict = share(config.strict);
        let relaxed = share(config.relaxed);
        Self {
            strict,
            relaxed,
            wild: desired as i64 - strict as i64 - relaxed as i64,
        }
    }
}

/// Number of pool items a percentage covers, rounded down
fn pool_share(pool_size: usize, pct: u32) -> usize {
    (pool_size as f64 * f64::from(pct) / 100.0).floor() as usize
}

/// Selects and annotates a bounded, ranked result set.
pub struct DiscoveryBlender {
    related: Arc<dyn RelatedVideoSource>,
    ranking: RankingEngine,
}

impl DiscoveryBlender {
    pub fn new(related: Arc<dyn RelatedVideoSource>) -> Self {
        Self {
            related,
            ranking: RankingEngine::new(),
        }
    }

    /// Pick up to `desired_count` videos from `candidates`.
    ///
    /// # Arguments
    /// * `candidates` - Filtered candidates, in provider order
    /// * `config` - Discovery mix; `None` disables discovery
    /// * `strategy` - Final ordering
    /// * `desired_count` - Maximum number of results
    #[instrument(skip(self, candidates, config), fields(candidates = candidates.len()))]
    pub async fn select_with_discovery(
        &self,
        candidates: Vec<Video>,
        config: Option<&DiscoveryConfig>,
        strategy: SortStrategy,
        desired_count: usize,
    ) -> Vec<Video> {
        if candidates.is_empty() {
            return Vec::new();
        }

        let Some(config) = config else {
            debug!("Discovery disabled, ranking {} candidates", candidates.len());
            return self.ranking.top(candidates, strategy, desired_count);
        };

        let mut pool = candidates;
        pool.truncate(desired_count.saturating_mul(3));
        let Some(seed) = pool.first().cloned() else {
            return Vec::new();
        };
        let counts = SliceCounts::new(desired_count, config);

        let strict_slice = pool_share(pool.len(), config.strict).min(pool.len());
        let relaxed_end = (strict_slice + pool_share(pool.len(), config.relaxed)).min(pool.len());

        let strict = pool[..strict_slice]
            .iter()
            .take(counts.strict)
            .map(|v| annotate(v, STRICT_REASON));
        let relaxed = pool[strict_slice..relaxed_end]
            .iter()
            .take(counts.relaxed)
            .map(|v| annotate(v, RELAXED_REASON));
        let mut selected: Vec<Video> = strict.chain(relaxed).collect();
        let strict_picked = strict_slice.min(counts.strict);
        let relaxed_picked = selected.len() - strict_picked;

        let wildcards = self.pick_wildcards(&seed, config, counts.wild).await;
        let wild_picked = wildcards.len();
        selected.extend(wildcards);

        info!(
            "Discovery picked {} strict, {} relaxed, {} wildcard from a pool of {}",
            strict_picked,
            relaxed_picked,
            wild_picked,
            pool.len()
        );

        for video in selected.iter_mut().filter(|v| v.discovery_reason.is_none()) {
            video.discovery_reason = Some(STRICT_REASON.to_string());
        }

        self.ranking.top(selected, strategy, desired_count)
    }

    async fn pick_wildcards(
        &self,
        seed: &Video,
        config: &DiscoveryConfig,
        wild_count: i64,
    ) -> Vec<Video> {
        if wild_count <= 0 || !config.enable_wildcards || config.wildcard_types.is_empty() {
            return Vec::new();
        }
        let wild_count = wild_count as usize;

        let related = self.related.get_related(&seed.video_id, wild_count).await;

        // Related videos may repeat strict or relaxed picks; both copies are kept
        related
            .into_iter()
            .take(wild_count)
            .map(|video| {
                let category = wildcard_category(&video, seed, config);
                let reason = format!("Wildcard - {}", category);
                Video {
                    discovery_reason: Some(reason),
                    ..video
                }
            })
            .collect()
    }

    /// Why a video was selected
    pub fn selection_explanation(video: &Video) -> &str {
        video
            .discovery_reason
            .as_deref()
            .unwrap_or(DEFAULT_EXPLANATION)
    }
}

fn annotate(video: &Video, reason: &str) -> Video {
    Video {
        discovery_reason: Some(reason.to_string()),
        ..video.clone()
    }
}

/// Heuristic wildcard category of `video` relative to the seed.
///
/// A category only applies when its key is configured. Falls back to the
/// first configured label.
fn wildcard_category<'a>(video: &Video, seed: &Video, config: &'a DiscoveryConfig) -> &'a str {
    let Some(first) = config.wildcard_types.first() else {
        return "related content";
    };

    if video.language != seed.language && config.has_wildcard_type(WILDCARD_OTHER_LANGUAGE) {
        return "same theme, other language";
    }

    if video.channel_id == seed.channel_id
        && video.content_type != seed.content_type
        && config.has_wildcard_type(WILDCARD_OTHER_FORMAT)
    {
        return "same channel, other format";
    }

    if video.view_count < seed.view_count
        && video.like_count > 0
        && config.has_wildcard_type(WILDCARD_LOW_POP_HIGH_QUALITY)
        && video.like_ratio() > HIGH_QUALITY_LIKE_RATIO
    {
        return "low popularity, high quality";
    }

    first.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use data_loader::ContentType;
    use sources::EmptyRelatedSource;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns a fixed list and records the requests it received
    struct MockRelated {
        videos: Vec<Video>,
        calls: AtomicUsize,
        requests: Mutex<Vec<(String, usize)>>,
    }

    impl MockRelated {
        fn new(videos: Vec<Video>) -> Arc<Self> {
            Arc::new(Self {
                videos,
                calls: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl RelatedVideoSource for MockRelated {
        async fn get_related(&self, seed_video_id: &str, max_results: usize) -> Vec<Video> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests
                .lock()
                .unwrap()
                .push((seed_video_id.to_string(), max_results));
            self.videos.iter().take(max_results).cloned().collect()
        }
    }

    fn create_candidates(n: usize) -> Vec<Video> {
        let now = Utc::now();
        (0..n)
            .map(|i| {
                let mut v = Video::new(
                    format!("c{}", i),
                    format!("Candidate {}", i),
                    "UCseed",
                    now - Duration::hours(i as i64),
                );
                v.view_count = 10_000;
                v.like_count = 100;
                v
            })
            .collect()
    }

    fn config(strict: u32, relaxed: u32, wild: u32, wildcards: bool) -> DiscoveryConfig {
        DiscoveryConfig {
            strict,
            relaxed,
            wild,
            enable_wildcards: wildcards,
            ..Default::default()
        }
    }

    fn count_with_prefix(videos: &[Video], prefix: &str) -> usize {
        videos
            .iter()
            .filter(|v| v.discovery_reason.as_deref().is_some_and(|r| r.starts_with(prefix)))
            .count()
    }

    #[tokio::test]
    async fn test_discovery_literal_case() {
        let blender = DiscoveryBlender::new(Arc::new(EmptyRelatedSource));
        let cfg = config(70, 20, 10, false);

        let result = blender
            .select_with_discovery(create_candidates(30), Some(&cfg), SortStrategy::NewestFirst, 10)
            .await;

        assert!(result.len() <= 10);
        assert!(!result.is_empty());
        for video in &result {
            let reason = video.discovery_reason.as_deref().unwrap_or_default();
            assert!(reason.starts_with("Strict") || reason.starts_with("Relaxed"), "{}", reason);
        }
        // strict: min(floor(30 × 0.7), ceil(7)) = 7, relaxed: min(6, 2) = 2
        assert_eq!(count_with_prefix(&result, "Strict"), 7);
        assert_eq!(count_with_prefix(&result, "Relaxed"), 2);
    }

    #[tokio::test]
    async fn test_no_config_ranks_and_truncates() {
        let related = MockRelated::new(Vec::new());
        let blender = DiscoveryBlender::new(related.clone());
        let mut candidates = create_candidates(5);
        candidates.reverse();

        let result = blender
            .select_with_discovery(candidates, None, SortStrategy::NewestFirst, 3)
            .await;

        let ids: Vec<_> = result.iter().map(|v| v.video_id.as_str()).collect();
        assert_eq!(ids, vec!["c0", "c1", "c2"]);
        assert!(result.iter().all(|v| v.discovery_reason.is_none()));
        assert_eq!(related.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_candidates_short_circuit() {
        let related = MockRelated::new(create_candidates(3));
        let blender = DiscoveryBlender::new(related.clone());
        let cfg = DiscoveryConfig::default();

        let result = blender
            .select_with_discovery(Vec::new(), Some(&cfg), SortStrategy::NewestFirst, 10)
            .await;

        assert!(result.is_empty());
        assert_eq!(related.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_wildcards_requested_around_first_pool_item() {
        let now = Utc::now();
        let mut other_language = Video::new("w1", "Tutorial de Unity", "UCother", now);
        other_language.language = "es".to_string();
        let mut other_format = Video::new("w2", "Unity short", "UCseed", now);
        other_format.content_type = ContentType::Short;

        let related = MockRelated::new(vec![other_language, other_format]);
        let blender = DiscoveryBlender::new(related.clone());
        let cfg = config(50, 30, 20, true);

        let result = blender
            .select_with_discovery(create_candidates(30), Some(&cfg), SortStrategy::NewestFirst, 10)
            .await;

        // strict 5, relaxed 3, wild 2
        assert_eq!(result.len(), 10);
        assert_eq!(*related.requests.lock().unwrap(), vec![("c0".to_string(), 2)]);

        let reason_of = |id: &str| {
            result
                .iter()
                .find(|v| v.video_id == id)
                .and_then(|v| v.discovery_reason.clone())
        };
        assert_eq!(reason_of("w1").as_deref(), Some("Wildcard - same theme, other language"));
        assert_eq!(reason_of("w2").as_deref(), Some("Wildcard - same channel, other format"));
        assert_eq!(count_with_prefix(&result, "Strict"), 5);
        assert_eq!(count_with_prefix(&result, "Relaxed"), 3);
    }

    #[tokio::test]
    async fn test_wildcards_skipped_when_disabled_or_no_room() {
        let related = MockRelated::new(create_candidates(3));
        let blender = DiscoveryBlender::new(related.clone());

        let disabled = config(50, 30, 20, false);
        blender
            .select_with_discovery(create_candidates(30), Some(&disabled), SortStrategy::NewestFirst, 10)
            .await;

        let no_categories = DiscoveryConfig {
            wildcard_types: Vec::new(),
            ..config(50, 30, 20, true)
        };
        blender
            .select_with_discovery(create_candidates(30), Some(&no_categories), SortStrategy::NewestFirst, 10)
            .await;

        // Percentages over 100 leave a negative wild count
        let crowded = config(90, 40, 0, true);
        let result = blender
            .select_with_discovery(create_candidates(30), Some(&crowded), SortStrategy::NewestFirst, 10)
            .await;

        assert_eq!(related.calls.load(Ordering::SeqCst), 0);
        assert_eq!(count_with_prefix(&result, "Wildcard"), 0);
        assert_eq!(result.len(), 10);
    }

    #[tokio::test]
    async fn test_small_pool_keeps_related_duplicates() {
        // The first related video repeats the strict pick
        let related = MockRelated::new(create_candidates(2));
        let blender = DiscoveryBlender::new(related);
        let cfg = config(50, 0, 50, true);

        let result = blender
            .select_with_discovery(create_candidates(2), Some(&cfg), SortStrategy::NewestFirst, 4)
            .await;

        // strict slice floor(2 × 0.5) = 1, wild = 4 - 2 - 0 = 2
        let ids: Vec<_> = result.iter().map(|v| v.video_id.as_str()).collect();
        assert_eq!(ids, vec!["c0", "c0", "c1"]);
        assert_eq!(result[0].discovery_reason.as_deref(), Some(STRICT_REASON));
        assert!(result[1].discovery_reason.as_deref().is_some_and(|r| r.starts_with("Wildcard - ")));
        assert_eq!(count_with_prefix(&result, "Strict"), 1);
        assert_eq!(count_with_prefix(&result, "Wildcard"), 2);
    }

    #[test]
    fn test_wildcard_category_gating() {
        let now = Utc::now();
        let mut seed = Video::new("seed", "Seed", "UC1", now);
        seed.view_count = 100_000;

        let mut quiet_gem = Video::new("gem", "Gem", "UC2", now);
        quiet_gem.view_count = 1_000;
        quiet_gem.like_count = 100;

        let mut quiet_dud = quiet_gem.clone();
        quiet_dud.like_count = 10;

        let all = DiscoveryConfig::default();
        assert_eq!(wildcard_category(&quiet_gem, &seed, &all), "low popularity, high quality");
        assert_eq!(wildcard_category(&quiet_dud, &seed, &all), "sametheme_otherlanguage");

        let mut spanish = quiet_gem.clone();
        spanish.language = "es".to_string();
        let related_only = DiscoveryConfig {
            wildcard_types: vec!["relatedchannels".to_string()],
            ..Default::default()
        };
        assert_eq!(wildcard_category(&spanish, &seed, &related_only), "relatedchannels");

        let none = DiscoveryConfig {
            wildcard_types: Vec::new(),
            ..Default::default()
        };
        assert_eq!(wildcard_category(&spanish, &seed, &none), "related content");
    }

    #[test]
    fn test_selection_explanation() {
        let mut video = Video::new("v", "Video", "UC1", Utc::now());
        assert_eq!(DiscoveryBlender::selection_explanation(&video), "Selected video");

        video.discovery_reason = Some(RELAXED_REASON.to_string());
        assert_eq!(DiscoveryBlender::selection_explanation(&video), RELAXED_REASON);
    }

    #[test]
    fn test_slice_counts() {
        let counts = SliceCounts::new(10, &config(70, 20, 10, true));
        assert_eq!(counts, SliceCounts { strict: 7, relaxed: 2, wild: 1 });

        let counts = SliceCounts::new(3, &config(70, 20, 10, true));
        // ceil(2.1) = 3, ceil(0.6) = 1
        assert_eq!(counts, SliceCounts { strict: 3, relaxed: 1, wild: -1 });
        assert_eq!(pool_share(9, 70), 6);
    }
}
