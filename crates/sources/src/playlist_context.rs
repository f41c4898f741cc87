//! Build a `PlaylistContext` from a stored playlist record
//!
//! The host stores a playlist's criteria as opaque text. This module parses
//! that text once, up front, into the typed structures the pipeline consumes.
//! Unparseable filters become an empty spec, an unparseable discovery profile
//! becomes "no discovery", an unknown sort name becomes `NewestFirst`.

use anyhow::{Result, anyhow};
use data_loader::{DiscoveryConfig, FilterSpec, SortStrategy, VideoId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Default number of videos returned per curation run
pub const DEFAULT_DESIRED_COUNT: usize = 20;

/// A playlist as persisted by the host, criteria still in text form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredPlaylist {
    pub id: String,
    pub name: String,
    pub search_query: Option<String>,
    /// JSON-encoded `FilterSpec`
    pub filters: Option<String>,
    /// Discovery profile JSON, or the marker text `enabled`
    pub discovery_profile: Option<String>,
    /// Strategy name or ordinal
    pub sort_strategy: Option<String>,
}

/// Everything the pipeline needs to curate one playlist.
#[derive(Debug, Clone)]
pub struct PlaylistContext {
    pub playlist_id: String,
    pub search_query: String,
    pub filters: FilterSpec,
    pub sort_strategy: SortStrategy,
    /// `None` disables discovery mode
    pub discovery: Option<DiscoveryConfig>,
    /// Videos already shown for this playlist
    pub seen_video_ids: HashSet<VideoId>,
    pub desired_count: usize,
}

impl PlaylistContext {
    pub fn new(playlist_id: impl Into<String>, search_query: impl Into<String>) -> Self {
        Self {
            playlist_id: playlist_id.into(),
            search_query: search_query.into(),
            filters: FilterSpec::default(),
            sort_strategy: SortStrategy::default(),
            discovery: None,
            seen_video_ids: HashSet::new(),
            desired_count: DEFAULT_DESIRED_COUNT,
        }
    }

    pub fn with_filters(mut self, filters: FilterSpec) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_sort(mut self, strategy: SortStrategy) -> Self {
        self.sort_strategy = strategy;
        self
    }

    pub fn with_discovery(mut self, discovery: Option<DiscoveryConfig>) -> Self {
        self.discovery = discovery;
        self
    }

    pub fn with_seen<I>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = VideoId>,
    {
        self.seen_video_ids.extend(ids);
        self
    }

    pub fn with_desired_count(mut self, count: usize) -> Self {
        self.desired_count = count;
        self
    }

    pub fn has_seen(&self, video_id: &str) -> bool {
        self.seen_video_ids.contains(video_id)
    }
}

/// Build a `PlaylistContext` from a stored playlist and its seen-video ids.
///
/// # Arguments
/// * `stored` - The playlist record as persisted by the host
/// * `seen` - Ids of videos already delivered for this playlist
///
/// # Errors
/// Fails only when the playlist has no search query; every other field
/// falls back to its permissive default.
pub fn build_playlist_context<I>(stored: &StoredPlaylist, seen: I) -> Result<PlaylistContext>
where
    I: IntoIterator<Item = VideoId>,
{
    let query = stored
        .search_query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| anyhow!("Playlist {} has no search query", stored.id))?;

    let context = PlaylistContext::new(stored.id.clone(), query)
        .with_filters(FilterSpec::from_json_lenient(stored.filters.as_deref()))
        .with_sort(SortStrategy::parse_or_default(stored.sort_strategy.as_deref()))
        .with_discovery(DiscoveryConfig::from_profile_text(
            stored.discovery_profile.as_deref(),
        ))
        .with_seen(seen);

    Ok(context)
}
