//! Core traits for the filtering pipeline.
//!
//! This module defines the Filter trait that allows composable,
//! extensible filters to be applied to candidate videos.

use anyhow::Result;
use data_loader::Video;
use sources::PlaylistContext;

/// Core trait for filtering candidate videos.
///
/// All filters must implement this trait to be used in the FilterPipeline.
/// Filters take ownership of the candidates and return the survivors in
/// their original order.
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Apply this filter to a set of videos.
    ///
    /// # Arguments
    /// * `videos` - The candidates to filter (takes ownership)
    /// * `context` - The playlist being curated
    ///
    /// # Returns
    /// * `Ok(Vec<Video>)` - The videos that passed
    /// * `Err` - If filtering fails
    fn apply(&self, videos: Vec<Video>, context: &PlaylistContext) -> Result<Vec<Video>>;
}
