//! The FilterPipeline orchestrates multiple filters.
//!
//! This module provides the main FilterPipeline struct that chains
//! multiple filters together using the builder pattern.

use crate::filters::{AlreadySeenFilter, CriteriaFilter};
use crate::traits::Filter;
use anyhow::Result;
use data_loader::Video;
use sources::PlaylistContext;

/// Chains multiple filters together into a processing pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(AlreadySeenFilter)
///     .add_filter(CriteriaFilter::new());
///
/// let filtered = pipeline.apply(videos, &context)?;
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    /// Create a new empty FilterPipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Seen-video deduplication followed by the playlist criteria
    pub fn standard() -> Self {
        Self::new()
            .add_filter(AlreadySeenFilter)
            .add_filter(CriteriaFilter::new())
    }

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Apply all filters in sequence to the videos.
    ///
    /// ## Algorithm
    /// 1. Start with the input videos
    /// 2. For each filter in order:
    ///    a. Log filter name and input count
    ///    b. Apply the filter
    ///    c. Log output count
    /// 3. Return final filtered set
    ///
    /// # Returns
    /// * `Ok(Vec<Video>)` - The videos after all filters
    /// * `Err` - If any filter fails
    pub fn apply(&self, videos: Vec<Video>, context: &PlaylistContext) -> Result<Vec<Video>> {
        let mut current = videos;
        for filter in &self.filters {
            tracing::debug!(
                "Applying filter: {} (input count: {})",
                filter.name(),
                current.len()
            );
            current = filter.apply(current, context)?;
            tracing::debug!(
                "Filter applied: {} (output count: {})",
                filter.name(),
                current.len()
            );
        }
        Ok(current)
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use data_loader::FilterSpec;

    fn create_test_videos() -> Vec<Video> {
        let now = Utc::now();
        vec![
            Video::new("1", "Godot tutorial", "UC1", now),
            Video::new("2", "Unity tutorial", "UC1", now),
            Video::new("3", "Unity devlog", "UC2", now),
        ]
    }

    #[test]
    fn test_empty_pipeline() {
        let pipeline = FilterPipeline::new();
        let context = PlaylistContext::new("pl", "tutorial");

        let filtered = pipeline.apply(create_test_videos(), &context).unwrap();
        assert_eq!(filtered.len(), 3);
        assert!(pipeline.is_empty());
    }

    #[test]
    fn test_single_filter() {
        let context = PlaylistContext::new("pl", "tutorial").with_seen(vec!["1".to_string()]);
        let pipeline = FilterPipeline::new().add_filter(AlreadySeenFilter);

        let filtered = pipeline.apply(create_test_videos(), &context).unwrap();
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].video_id, "2");
    }

    #[test]
    fn test_standard_pipeline_chains_filters() {
        let context = PlaylistContext::new("pl", "unity")
            .with_seen(vec!["2".to_string()])
            .with_filters(FilterSpec {
                include_keywords: vec!["unity".to_string()],
                ..Default::default()
            });

        let pipeline = FilterPipeline::standard();
        let filtered = pipeline.apply(create_test_videos(), &context).unwrap();

        assert_eq!(pipeline.len(), 2);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].video_id, "3");
    }
}
