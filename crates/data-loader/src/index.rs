//! In-memory video catalogue with id and channel indices.
//!
//! The catalogue backs the local search provider and related-video source.
//! Videos keep their insertion order; the indices store positions into the
//! primary vector so lookups never clone.

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::{Video, VideoId};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Indexed collection of videos.
#[derive(Debug, Default)]
pub struct VideoCatalog {
    pub(crate) videos: Vec<Video>,
    /// Position of each video in `videos`
    pub(crate) by_id: HashMap<VideoId, usize>,
    /// Positions of each channel's videos, keyed by lower-cased channel id
    pub(crate) by_channel: HashMap<String, Vec<usize>>,
}

impl VideoCatalog {
    /// Creates a new, empty catalogue
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and index a catalogue file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let videos = parser::parse_videos(path)?;
        let catalog = Self::from_videos(videos)?;
        info!(
            "Loaded catalogue from {}: {} videos across {} channels",
            path.display(),
            catalog.len(),
            catalog.channel_count()
        );
        Ok(catalog)
    }

    /// Index an already-parsed list of videos.
    pub fn from_videos(videos: Vec<Video>) -> Result<Self> {
        let mut catalog = Self::new();
        for video in videos {
            catalog.insert_video(video)?;
        }
        Ok(catalog)
    }

    /// Insert a video, rejecting duplicate ids.
    pub fn insert_video(&mut self, video: Video) -> Result<()> {
        if video.video_id.trim().is_empty() {
            return Err(DataLoadError::ValidationError(format!(
                "video titled '{}' has an empty id",
                video.title
            )));
        }
        if self.by_id.contains_key(&video.video_id) {
            return Err(DataLoadError::DuplicateVideo(video.video_id));
        }

        let position = self.videos.len();
        self.by_id.insert(video.video_id.clone(), position);
        self.by_channel
            .entry(video.channel_id.to_lowercase())
            .or_default()
            .push(position);
        self.videos.push(video);
        Ok(())
    }

    pub fn get_video(&self, video_id: &str) -> Option<&Video> {
        self.by_id.get(video_id).map(|&i| &self.videos[i])
    }

    /// All videos of a channel (case-insensitive id), in insertion order
    pub fn videos_by_channel(&self, channel_id: &str) -> Vec<&Video> {
        self.by_channel
            .get(&channel_id.to_lowercase())
            .map(|positions| positions.iter().map(|&i| &self.videos[i]).collect())
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Video> {
        self.videos.iter()
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    pub fn channel_count(&self) -> usize {
        self.by_channel.len()
    }
}
