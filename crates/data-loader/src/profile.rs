//! Playlist profile types: filter criteria, discovery mix and sort strategy.
//!
//! These are stored by the host application as opaque text next to each
//! playlist. Parsing here is deliberately forgiving: text that cannot be
//! understood resolves to "no criteria" / "no discovery" / the default sort,
//! never to an error the caller has to handle.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::debug;

// =============================================================================
// Filter groups
// =============================================================================

/// Inclusive duration window in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationRange {
    #[serde(default)]
    pub min_seconds: u64,
    #[serde(default = "DurationRange::unbounded")]
    pub max_seconds: u64,
}

impl DurationRange {
    fn unbounded() -> u64 {
        u64::MAX
    }
}

impl Default for DurationRange {
    fn default() -> Self {
        Self {
            min_seconds: 0,
            max_seconds: u64::MAX,
        }
    }
}

fn default_lookback_days() -> i64 {
    3650
}

/// Publication time rule, discriminated by its `type` tag.
///
/// A missing `type` means `relative`. An unknown one is rejected, which drops
/// the group and leaves publication time unrestricted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", try_from = "RawPublishedTime")]
pub enum PublishedTimeRule {
    /// Published within the last `days` days
    Relative {
        #[serde(default = "default_lookback_days")]
        days: i64,
    },
    /// Published within `[start_date, end_date]`; a missing bound is open
    Absolute {
        #[serde(default, rename = "startDate")]
        start_date: Option<DateTime<Utc>>,
        #[serde(default, rename = "endDate")]
        end_date: Option<DateTime<Utc>>,
    },
}

fn default_rule_type() -> String {
    "relative".to_string()
}

/// Wire shape of a publication time rule, before the `type` is resolved.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPublishedTime {
    #[serde(default = "default_rule_type", rename = "type")]
    kind: String,
    #[serde(default = "default_lookback_days")]
    days: i64,
    #[serde(default)]
    start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    end_date: Option<DateTime<Utc>>,
}

impl TryFrom<RawPublishedTime> for PublishedTimeRule {
    type Error = String;

    fn try_from(raw: RawPublishedTime) -> Result<Self, Self::Error> {
        match raw.kind.as_str() {
            "relative" => Ok(Self::Relative { days: raw.days }),
            "absolute" => Ok(Self::Absolute {
                start_date: raw.start_date,
                end_date: raw.end_date,
            }),
            other => Err(format!("unknown publishedTime type '{}'", other)),
        }
    }
}

/// Preferred language, matched as a case-insensitive prefix of the video language.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguagePreference {
    #[serde(default)]
    pub preferred: String,
    /// Accepted and stored, but not used for matching
    #[serde(default)]
    pub region: String,
}

fn enabled() -> bool {
    true
}

/// Which content types are allowed through.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentTypeMask {
    #[serde(default = "enabled")]
    pub videos: bool,
    #[serde(default)]
    pub livestreams: bool,
    #[serde(default)]
    pub shorts: bool,
}

impl Default for ContentTypeMask {
    fn default() -> Self {
        Self {
            videos: true,
            livestreams: false,
            shorts: false,
        }
    }
}

/// Minimum engagement a video needs. Negative minimums never reject.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularityThreshold {
    #[serde(default)]
    pub min_views: i64,
    #[serde(default)]
    pub min_likes: i64,
    /// likes / views; only checked when greater than zero
    #[serde(default)]
    pub min_like_ratio: f64,
}

/// Channel allow/block lists. The block list always wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelRule {
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

// =============================================================================
// FilterSpec
// =============================================================================

/// The full set of user-defined filter criteria for a playlist.
///
/// Every group is optional and an absent or empty group never rejects a video,
/// so `FilterSpec::default()` lets everything through.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    /// Any one must appear in the title or channel name
    #[serde(default)]
    pub themes: Vec<String>,
    /// All must appear in the title
    #[serde(default)]
    pub include_keywords: Vec<String>,
    /// None may appear in the title
    #[serde(default)]
    pub exclude_keywords: Vec<String>,
    #[serde(default)]
    pub duration: Option<DurationRange>,
    #[serde(default)]
    pub published_time: Option<PublishedTimeRule>,
    #[serde(default)]
    pub language: Option<LanguagePreference>,
    #[serde(default)]
    pub content_type: Option<ContentTypeMask>,
    #[serde(default)]
    pub popularity: Option<PopularityThreshold>,
    #[serde(default)]
    pub channels: Option<ChannelRule>,
}

impl FilterSpec {
    /// Parse filter criteria stored as JSON text.
    ///
    /// Blank, malformed or non-object text yields the empty (pass-through)
    /// spec. Each group is parsed on its own: a group that cannot be read is
    /// dropped and the others are kept.
    pub fn from_json_lenient(text: Option<&str>) -> Self {
        let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
            return Self::default();
        };

        let groups = match serde_json::from_str(text) {
            Ok(Value::Object(groups)) => groups,
            Ok(_) => {
                debug!("Ignoring filter spec that is not a JSON object");
                return Self::default();
            }
            Err(e) => {
                debug!("Ignoring unparseable filter spec: {}", e);
                return Self::default();
            }
        };

        Self {
            themes: lenient_group(&groups, "themes").unwrap_or_default(),
            include_keywords: lenient_group(&groups, "includeKeywords").unwrap_or_default(),
            exclude_keywords: lenient_group(&groups, "excludeKeywords").unwrap_or_default(),
            duration: lenient_group(&groups, "duration"),
            published_time: lenient_group(&groups, "publishedTime"),
            language: lenient_group(&groups, "language"),
            content_type: lenient_group(&groups, "contentType"),
            popularity: lenient_group(&groups, "popularity"),
            channels: lenient_group(&groups, "channels"),
        }
    }

    /// True when no group carries any criteria
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Parse one filter group; absent, null or unreadable groups are `None`
fn lenient_group<T: DeserializeOwned>(groups: &Map<String, Value>, key: &str) -> Option<T> {
    let value = groups.get(key).filter(|v| !v.is_null())?;
    match T::deserialize(value) {
        Ok(group) => Some(group),
        Err(e) => {
            debug!("Ignoring unparseable filter group '{}': {}", key, e);
            None
        }
    }
}

// =============================================================================
// DiscoveryConfig
// =============================================================================

/// Wildcard category: related video in a different language
pub const WILDCARD_OTHER_LANGUAGE: &str = "sametheme_otherlanguage";
/// Wildcard category: same channel, different content type
pub const WILDCARD_OTHER_FORMAT: &str = "samechannel_otherformat";
/// Wildcard category: fewer views than the seed but a high like ratio
pub const WILDCARD_LOW_POP_HIGH_QUALITY: &str = "lowpop_highquality";
/// Wildcard category: videos from related channels
pub const WILDCARD_RELATED_CHANNELS: &str = "relatedchannels";

/// Text the host stores when discovery is switched on without a custom mix.
const ENABLED_MARKER: &str = "enabled";

fn default_strict() -> u32 {
    70
}

fn default_relaxed() -> u32 {
    20
}

fn default_wild() -> u32 {
    10
}

fn default_wildcard_types() -> Vec<String> {
    [
        WILDCARD_OTHER_LANGUAGE,
        WILDCARD_OTHER_FORMAT,
        WILDCARD_LOW_POP_HIGH_QUALITY,
        WILDCARD_RELATED_CHANNELS,
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Strict / relaxed / wild mix for discovery mode.
///
/// The three percentages are not required to sum to 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryConfig {
    #[serde(default = "default_strict")]
    pub strict: u32,
    #[serde(default = "default_relaxed")]
    pub relaxed: u32,
    #[serde(default = "default_wild")]
    pub wild: u32,
    #[serde(default = "enabled")]
    pub enable_wildcards: bool,
    #[serde(default = "default_wildcard_types")]
    pub wildcard_types: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            strict: default_strict(),
            relaxed: default_relaxed(),
            wild: default_wild(),
            enable_wildcards: true,
            wildcard_types: default_wildcard_types(),
        }
    }
}

impl DiscoveryConfig {
    /// Parse a stored discovery profile.
    ///
    /// Returns `None` (discovery disabled) for blank text, malformed JSON or a
    /// non-object value. Percentages are not range checked: oversized ones
    /// leave no room for wildcards. The bare marker `enabled` yields the
    /// default mix.
    pub fn from_profile_text(text: Option<&str>) -> Option<Self> {
        let text = text.map(str::trim).filter(|t| !t.is_empty())?;

        if text.eq_ignore_ascii_case(ENABLED_MARKER) {
            return Some(Self::default());
        }

        // Only a JSON object is a valid profile; serde would also accept a bare array.
        let value: serde_json::Value = serde_json::from_str(text).ok()?;
        if !value.is_object() {
            debug!("Discovery profile is not a JSON object, treating as disabled");
            return None;
        }

        match serde_json::from_value(value) {
            Ok(config) => Some(config),
            Err(e) => {
                debug!("Discovery profile rejected, treating as disabled: {}", e);
                None
            }
        }
    }

    /// Whether a wildcard category key is configured
    pub fn has_wildcard_type(&self, key: &str) -> bool {
        self.wildcard_types.iter().any(|t| t == key)
    }
}

// =============================================================================
// SortStrategy
// =============================================================================

/// Ordering applied to the final video list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortStrategy {
    #[default]
    NewestFirst,
    MostRelevant,
    MostPopular,
    MostPopularRelative,
    HighestQuality,
    LengthShort,
    LengthLong,
    ChannelAuthority,
    WeightedScore,
}

impl SortStrategy {
    pub const ALL: [SortStrategy; 9] = [
        SortStrategy::NewestFirst,
        SortStrategy::MostRelevant,
        SortStrategy::MostPopular,
        SortStrategy::MostPopularRelative,
        SortStrategy::HighestQuality,
        SortStrategy::LengthShort,
        SortStrategy::LengthLong,
        SortStrategy::ChannelAuthority,
        SortStrategy::WeightedScore,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SortStrategy::NewestFirst => "NewestFirst",
            SortStrategy::MostRelevant => "MostRelevant",
            SortStrategy::MostPopular => "MostPopular",
            SortStrategy::MostPopularRelative => "MostPopularRelative",
            SortStrategy::HighestQuality => "HighestQuality",
            SortStrategy::LengthShort => "LengthShort",
            SortStrategy::LengthLong => "LengthLong",
            SortStrategy::ChannelAuthority => "ChannelAuthority",
            SortStrategy::WeightedScore => "WeightedScore",
        }
    }

    /// Parse a stored strategy name or ordinal (0-8).
    ///
    /// Blank or unknown values fall back to `NewestFirst`.
    pub fn parse_or_default(text: Option<&str>) -> Self {
        let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
            return Self::default();
        };

        if let Ok(ordinal) = text.parse::<usize>() {
            return Self::ALL.get(ordinal).copied().unwrap_or_default();
        }

        Self::ALL
            .iter()
            .copied()
            .find(|s| s.name() == text)
            .unwrap_or_default()
    }
}

impl fmt::Display for SortStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_spec_defaults_inside_present_group() {
        let spec = FilterSpec::from_json_lenient(Some(
            r#"{"duration": {"minSeconds": 60}, "contentType": {"shorts": true}}"#,
        ));

        let duration = spec.duration.unwrap();
        assert_eq!(duration.min_seconds, 60);
        assert_eq!(duration.max_seconds, u64::MAX);

        let mask = spec.content_type.unwrap();
        assert!(mask.videos);
        assert!(!mask.livestreams);
        assert!(mask.shorts);
    }

    #[test]
    fn test_filter_spec_published_time_tags() {
        let spec = FilterSpec::from_json_lenient(Some(
            r#"{"publishedTime": {"type": "relative", "days": 7}}"#,
        ));
        assert_eq!(spec.published_time, Some(PublishedTimeRule::Relative { days: 7 }));

        let spec = FilterSpec::from_json_lenient(Some(
            r#"{"publishedTime": {"type": "absolute", "startDate": "2024-01-01T00:00:00Z"}}"#,
        ));
        match spec.published_time {
            Some(PublishedTimeRule::Absolute { start_date, end_date }) => {
                assert!(start_date.is_some());
                assert!(end_date.is_none());
            }
            other => panic!("unexpected rule: {:?}", other),
        }
    }

    #[test]
    fn test_published_time_without_type_is_relative() {
        let spec = FilterSpec::from_json_lenient(Some(
            r#"{"includeKeywords": ["godot"], "publishedTime": {"days": 7}}"#,
        ));
        assert_eq!(spec.include_keywords, vec!["godot".to_string()]);
        assert_eq!(spec.published_time, Some(PublishedTimeRule::Relative { days: 7 }));

        let spec = FilterSpec::from_json_lenient(Some(r#"{"publishedTime": {}}"#));
        assert_eq!(spec.published_time, Some(PublishedTimeRule::Relative { days: 3650 }));
    }

    #[test]
    fn test_unreadable_group_keeps_the_others() {
        let spec = FilterSpec::from_json_lenient(Some(
            r#"{"excludeKeywords": ["spam"], "publishedTime": {"type": "rolling"}, "duration": {"minSeconds": "long"}}"#,
        ));
        assert_eq!(spec.exclude_keywords, vec!["spam".to_string()]);
        assert!(spec.published_time.is_none());
        assert!(spec.duration.is_none());

        let spec = FilterSpec::from_json_lenient(Some(
            r#"{"themes": "not a list", "channels": {"exclude": ["UCspam"]}}"#,
        ));
        assert!(spec.themes.is_empty());
        assert_eq!(spec.channels.unwrap().exclude, vec!["UCspam".to_string()]);
    }

    #[test]
    fn test_negative_popularity_is_accepted() {
        let spec = FilterSpec::from_json_lenient(Some(
            r#"{"excludeKeywords": ["spam"], "popularity": {"minViews": -1}}"#,
        ));
        assert_eq!(spec.exclude_keywords, vec!["spam".to_string()]);
        let popularity = spec.popularity.unwrap();
        assert_eq!(popularity.min_views, -1);
        assert_eq!(popularity.min_likes, 0);
    }

    #[test]
    fn test_malformed_filter_spec_is_empty() {
        assert!(FilterSpec::from_json_lenient(Some("{not json")).is_empty());
        assert!(FilterSpec::from_json_lenient(Some("   ")).is_empty());
        assert!(FilterSpec::from_json_lenient(Some("[1, 2]")).is_empty());
        assert!(FilterSpec::from_json_lenient(None).is_empty());
    }

    #[test]
    fn test_discovery_profile_parsing() {
        let config = DiscoveryConfig::from_profile_text(Some(
            r#"{"strict": 50, "relaxed": 30, "wild": 20, "enableWildcards": false}"#,
        ))
        .unwrap();
        assert_eq!(config.strict, 50);
        assert_eq!(config.relaxed, 30);
        assert_eq!(config.wild, 20);
        assert!(!config.enable_wildcards);
        assert_eq!(config.wildcard_types.len(), 4);
    }

    #[test]
    fn test_discovery_profile_marker_and_garbage() {
        assert_eq!(
            DiscoveryConfig::from_profile_text(Some("enabled")),
            Some(DiscoveryConfig::default())
        );
        assert!(DiscoveryConfig::from_profile_text(None).is_none());
        assert!(DiscoveryConfig::from_profile_text(Some("")).is_none());
        assert!(DiscoveryConfig::from_profile_text(Some("{\"strict\": \"lots\"}")).is_none());
        assert!(DiscoveryConfig::from_profile_text(Some("[1, 2, 3]")).is_none());
        assert!(DiscoveryConfig::from_profile_text(Some("{\"strict\": -5}")).is_none());
    }

    #[test]
    fn test_discovery_percentages_above_hundred_are_kept() {
        let config =
            DiscoveryConfig::from_profile_text(Some(r#"{"strict": 120, "relaxed": 20}"#)).unwrap();
        assert_eq!(config.strict, 120);
        assert_eq!(config.relaxed, 20);
        assert_eq!(config.wild, 10);

        let config = DiscoveryConfig::from_profile_text(Some(r#"{"strict": 150}"#)).unwrap();
        assert_eq!(config.strict, 150);
    }

    #[test]
    fn test_discovery_percentages_may_exceed_hundred_in_total() {
        let config =
            DiscoveryConfig::from_profile_text(Some(r#"{"strict": 80, "relaxed": 60}"#)).unwrap();
        assert_eq!(config.strict + config.relaxed + config.wild, 150);
    }

    #[test]
    fn test_sort_strategy_parsing() {
        assert_eq!(SortStrategy::parse_or_default(Some("WeightedScore")), SortStrategy::WeightedScore);
        assert_eq!(SortStrategy::parse_or_default(Some("4")), SortStrategy::HighestQuality);
        assert_eq!(SortStrategy::parse_or_default(Some("42")), SortStrategy::NewestFirst);
        assert_eq!(SortStrategy::parse_or_default(Some("Shuffle")), SortStrategy::NewestFirst);
        assert_eq!(SortStrategy::parse_or_default(None), SortStrategy::NewestFirst);
    }
}
