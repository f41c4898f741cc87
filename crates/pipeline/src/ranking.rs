//! RankingEngine: orders videos by a `SortStrategy`.
//!
//! ## Algorithm
//! 1. Sample `now` once for the whole call
//! 2. Compute every video's features (parallel)
//! 3. Stable sort by the strategy's key, largest first
//!
//! Ties keep their input order, so sorting an already sorted list is a no-op.

use crate::features::FeatureExtractor;
use chrono::{DateTime, Utc};
use data_loader::{SortStrategy, Video};
use tracing::debug;

/// Orders video collections by a sort strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct RankingEngine;

impl RankingEngine {
    pub fn new() -> Self {
        Self
    }

    /// Sort `videos` by `strategy` using the current time
    pub fn sort(&self, videos: Vec<Video>, strategy: SortStrategy) -> Vec<Video> {
        self.sort_at(videos, strategy, Utc::now())
    }

    /// Sort with an explicit reference time for age-based strategies
    pub fn sort_at(
        &self,
        videos: Vec<Video>,
        strategy: SortStrategy,
        now: DateTime<Utc>,
    ) -> Vec<Video> {
        if videos.len() < 2 {
            return videos;
        }

        let features = FeatureExtractor::new(now).compute_features(&videos);
        let mut keyed: Vec<(f64, Video)> = features
            .iter()
            .map(|f| f.sort_key(strategy))
            .zip(videos)
            .collect();

        // slice::sort_by is stable
        keyed.sort_by(|(a, _), (b, _)| b.total_cmp(a));

        debug!("Sorted {} videos by {}", keyed.len(), strategy);
        keyed.into_iter().map(|(_, video)| video).collect()
    }

    /// Sort, then keep the first `limit` videos
    pub fn top(&self, videos: Vec<Video>, strategy: SortStrategy, limit: usize) -> Vec<Video> {
        let mut sorted = self.sort(videos, strategy);
        sorted.truncate(limit);
        sorted
    }
}
