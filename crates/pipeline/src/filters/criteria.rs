//! Filter applying the playlist's `FilterSpec` through the `FilterEngine`.

use crate::engine::FilterEngine;
use crate::traits::Filter;
use anyhow::Result;
use chrono::{DateTime, Utc};
use data_loader::Video;
use sources::PlaylistContext;

/// Keeps videos that satisfy every criteria group of the playlist.
///
/// ## Algorithm
/// 1. Normalise each video (language lower-cased)
/// 2. Evaluate against `context.filters` with one reference time for the batch
pub struct CriteriaFilter {
    engine: FilterEngine,
    /// Fixed reference time; `None` samples the clock per batch
    now: Option<DateTime<Utc>>,
}

impl CriteriaFilter {
    pub fn new() -> Self {
        Self {
            engine: FilterEngine::new(),
            now: None,
        }
    }

    /// Evaluate relative date rules against a fixed time
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            engine: FilterEngine::new(),
            now: Some(now),
        }
    }
}

impl Default for CriteriaFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Filter for CriteriaFilter {
    fn name(&self) -> &str {
        "CriteriaFilter"
    }

    fn apply(&self, videos: Vec<Video>, context: &PlaylistContext) -> Result<Vec<Video>> {
        if context.filters.is_empty() {
            return Ok(videos);
        }

        let now = self.now.unwrap_or_else(Utc::now);
        let filtered: Vec<Video> = videos
            .into_iter()
            .map(|video| self.engine.normalize(video))
            .filter(|video| self.engine.evaluate_at(video, &context.filters, now))
            .collect();
        Ok(filtered)
    }
}
