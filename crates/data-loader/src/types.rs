//! Core domain types for curated video listings.
//!
//! This module defines the fundamental data structures used throughout the system:
//! - `Video`, the unit every pipeline stage works on
//! - `ContentType`, the fixed set of video formats
//!
//! Field names serialize in camelCase so that cached result lists and catalogue
//! files use the same JSON shape as the host application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DataLoadError;

// =============================================================================
// Type Aliases
// =============================================================================

/// Stable external identifier of a video (e.g. "dQw4w9WgXcQ")
pub type VideoId = String;

// =============================================================================
// Content Type
// =============================================================================

/// Classification of a video's format.
///
/// Parsing is case-insensitive, so "Short", "SHORT" and "short" all map to
/// `ContentType::Short`. Serialization always produces the lower-case name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Video,
    Livestream,
    Short,
}

impl ContentType {
    /// Lower-case canonical name
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Video => "video",
            ContentType::Livestream => "livestream",
            ContentType::Short => "short",
        }
    }
}

impl FromStr for ContentType {
    type Err = DataLoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "video" => Ok(ContentType::Video),
            "livestream" => Ok(ContentType::Livestream),
            "short" => Ok(ContentType::Short),
            _ => Err(DataLoadError::InvalidValue {
                field: "contentType".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

impl<'de> Deserialize<'de> for ContentType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Video
// =============================================================================

fn default_language() -> String {
    "en".to_string()
}

/// A single video listing as returned by the content provider.
///
/// Every field except `discovery_reason` is fixed once the provider hands the
/// video over. `discovery_reason` is attached by the discovery blender during a
/// single pipeline run and is never written to the search cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub video_id: VideoId,
    pub title: String,
    pub channel_name: String,
    pub channel_id: String,
    #[serde(default)]
    pub thumbnail_url: String,
    /// Length of the video in whole seconds
    #[serde(default)]
    pub duration_seconds: u64,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub like_count: u64,
    /// Language code, either bare ("en") or region-qualified ("en-US")
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub content_type: ContentType,
    #[serde(default)]
    pub has_captions: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovery_reason: Option<String>,
}

impl Video {
    /// Create a video with the required identity fields; counters start at zero.
    pub fn new(
        video_id: impl Into<VideoId>,
        title: impl Into<String>,
        channel_id: impl Into<String>,
        published_at: DateTime<Utc>,
    ) -> Self {
        let channel_id = channel_id.into();
        Self {
            video_id: video_id.into(),
            title: title.into(),
            channel_name: channel_id.clone(),
            channel_id,
            thumbnail_url: String::new(),
            duration_seconds: 0,
            published_at,
            view_count: 0,
            like_count: 0,
            language: default_language(),
            content_type: ContentType::Video,
            has_captions: false,
            discovery_reason: None,
        }
    }

    /// likeCount / viewCount, or 0.0 when the video has no views
    pub fn like_ratio(&self) -> f64 {
        if self.view_count == 0 {
            0.0
        } else {
            self.like_count as f64 / self.view_count as f64
        }
    }

    /// Age of the video in fractional days relative to `now`.
    ///
    /// Videos published "in the future" (clock skew) report a negative age.
    pub fn age_in_days(&self, now: DateTime<Utc>) -> f64 {
        (now - self.published_at).num_milliseconds() as f64 / 86_400_000.0
    }

    /// Copy of this video without a discovery annotation
    pub fn without_reason(&self) -> Self {
        Self {
            discovery_reason: None,
            ..self.clone()
        }
    }
}
