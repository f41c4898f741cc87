//! Feature extraction for ranking.
//!
//! Every ranking strategy orders videos by one number. This module computes
//! those numbers for a batch of videos against a single reference time.

use chrono::{DateTime, Utc};
use data_loader::{SortStrategy, Video};
use rayon::prelude::*;

/// Views per day above which relative popularity saturates
const RELATIVE_POPULARITY_SCALE: f64 = 10_000.0;
/// Views above which relevance saturates
const RELEVANCE_VIEW_SCALE: f64 = 1_000_000.0;
/// Age in days at which recency reaches zero
const RECENCY_HORIZON_DAYS: f64 = 365.0;

/// Ranking signals computed for one video.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFeatures {
    /// Publication time as Unix milliseconds
    pub published_millis: i64,
    pub age_days: f64,
    pub view_count: f64,
    pub duration_seconds: f64,
    /// likes / views, 0 without views
    pub like_ratio: f64,
    /// views × like ratio
    pub relevance: f64,
    /// views per day, or raw views when younger than a day
    pub views_per_day: f64,
    /// Blend of relevance, quality, relative popularity and recency
    pub weighted_score: f64,
}

impl VideoFeatures {
    /// Compute every feature of `video` relative to `now`.
    ///
    /// ## WeightedScore
    /// `0.3·relevance + 0.25·quality + 0.25·relativePopularity + 0.2·recency`
    /// - relevance = `min(views/1e6, 1) × likeRatio`
    /// - quality = likeRatio
    /// - relativePopularity = `min(viewsPerDay/1e4, 1)`
    /// - recency = `max(1 - ageDays/365, 0)`
    pub fn compute(video: &Video, now: DateTime<Utc>) -> Self {
        let views = video.view_count as f64;
        let like_ratio = video.like_ratio();
        let age_days = video.age_in_days(now);

        let views_per_day = if age_days < 1.0 {
            views
        } else {
            views / age_days
        };

        let relevance_score = (views / RELEVANCE_VIEW_SCALE).min(1.0) * like_ratio;
        let relative_popularity = (views_per_day / RELATIVE_POPULARITY_SCALE).min(1.0);
        let recency = (1.0 - age_days / RECENCY_HORIZON_DAYS).max(0.0);

        let weighted_score = relevance_score * 0.3
            + like_ratio * 0.25
            + relative_popularity * 0.25
            + recency * 0.2;

        Self {
            published_millis: video.published_at.timestamp_millis(),
            age_days,
            view_count: views,
            duration_seconds: video.duration_seconds as f64,
            like_ratio,
            relevance: views * like_ratio,
            views_per_day,
            weighted_score,
        }
    }

    /// The number a strategy orders by. Larger ranks first.
    pub fn sort_key(&self, strategy: SortStrategy) -> f64 {
        match strategy {
            SortStrategy::NewestFirst => self.published_millis as f64,
            SortStrategy::MostRelevant => self.relevance,
            SortStrategy::MostPopular | SortStrategy::ChannelAuthority => self.view_count,
            SortStrategy::MostPopularRelative => self.views_per_day,
            SortStrategy::HighestQuality => self.like_ratio,
            SortStrategy::LengthShort => -self.duration_seconds,
            SortStrategy::LengthLong => self.duration_seconds,
            SortStrategy::WeightedScore => self.weighted_score,
        }
    }
}

/// Computes features for batches of videos in parallel.
///
/// ## Performance Note
/// Uses Rayon; results come back in input order.
#[derive(Debug, Clone, Copy)]
pub struct FeatureExtractor {
    now: DateTime<Utc>,
}

impl FeatureExtractor {
    /// Extractor whose relative features use `now` as the reference time
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// Compute features for all videos, one per video, in the same order
    pub fn compute_features(&self, videos: &[Video]) -> Vec<VideoFeatures> {
        videos
            .par_iter()
            .map(|video| VideoFeatures::compute(video, self.now))
            .collect()
    }
}
