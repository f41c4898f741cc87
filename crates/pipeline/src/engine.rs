//! FilterEngine: evaluates a playlist's `FilterSpec` against one video.
//!
//! ## Algorithm
//! The eight groups are checked in order and combined with AND. Every group
//! passes when it carries no criteria, so the empty spec accepts everything.
//!
//! | Group | Passes when |
//! |---|---|
//! | themes | any theme is a substring of title or channel name |
//! | include keywords | every keyword is a substring of the title |
//! | exclude keywords | no keyword is a substring of the title |
//! | duration | `min <= duration <= max` |
//! | published time | within the lookback window, or inside `[start, end]` |
//! | language | video language starts with the preferred code |
//! | content type | the video's type is enabled in the mask |
//! | popularity | views, likes and like ratio meet the thresholds |
//! | channels | not blocked, and allowed when an allow list exists |
//!
//! All text comparisons are case-insensitive.

use chrono::{DateTime, Duration, Utc};
use data_loader::{
    ChannelRule, ContentType, ContentTypeMask, DurationRange, FilterSpec, LanguagePreference,
    PopularityThreshold, PublishedTimeRule, Video,
};

/// Stateless evaluator for `FilterSpec` criteria.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterEngine;

impl FilterEngine {
    pub fn new() -> Self {
        Self
    }

    /// Whether `video` satisfies every group of `spec`, relative to the current time
    pub fn evaluate(&self, video: &Video, spec: &FilterSpec) -> bool {
        self.evaluate_at(video, spec, Utc::now())
    }

    /// Like `evaluate`, but a missing video or spec is never rejected
    pub fn evaluate_optional(&self, video: Option<&Video>, spec: Option<&FilterSpec>) -> bool {
        match (video, spec) {
            (Some(video), Some(spec)) => self.evaluate(video, spec),
            _ => true,
        }
    }

    /// Evaluate with an explicit reference time for relative date rules
    pub fn evaluate_at(&self, video: &Video, spec: &FilterSpec, now: DateTime<Utc>) -> bool {
        matches_themes(video, &spec.themes)
            && contains_all_keywords(video, &spec.include_keywords)
            && contains_no_keywords(video, &spec.exclude_keywords)
            && spec.duration.is_none_or(|d| within_duration(video, &d))
            && spec
                .published_time
                .as_ref()
                .is_none_or(|rule| published_within(video, rule, now))
            && spec
                .language
                .as_ref()
                .is_none_or(|lang| matches_language(video, lang))
            && spec.content_type.is_none_or(|mask| allows_content_type(video, &mask))
            && spec
                .popularity
                .is_none_or(|threshold| meets_popularity(video, &threshold))
            && spec
                .channels
                .as_ref()
                .is_none_or(|rule| allows_channel(video, rule))
    }

    /// Lower-case the language code. Idempotent.
    pub fn normalize(&self, mut video: Video) -> Video {
        video.language = video.language.to_lowercase();
        video
    }
}

fn matches_themes(video: &Video, themes: &[String]) -> bool {
    if themes.is_empty() {
        return true;
    }
    let title = video.title.to_lowercase();
    let channel = video.channel_name.to_lowercase();
    themes.iter().any(|theme| {
        let theme = theme.to_lowercase();
        title.contains(&theme) || channel.contains(&theme)
    })
}

fn contains_all_keywords(video: &Video, keywords: &[String]) -> bool {
    let title = video.title.to_lowercase();
    keywords
        .iter()
        .all(|keyword| title.contains(&keyword.to_lowercase()))
}

fn contains_no_keywords(video: &Video, keywords: &[String]) -> bool {
    let title = video.title.to_lowercase();
    !keywords
        .iter()
        .any(|keyword| title.contains(&keyword.to_lowercase()))
}

fn within_duration(video: &Video, range: &DurationRange) -> bool {
    (range.min_seconds..=range.max_seconds).contains(&video.duration_seconds)
}

fn published_within(video: &Video, rule: &PublishedTimeRule, now: DateTime<Utc>) -> bool {
    match rule {
        PublishedTimeRule::Relative { days } => {
            // A lookback too large to represent has no lower bound
            match Duration::try_days(*days).and_then(|d| now.checked_sub_signed(d)) {
                Some(cutoff) => video.published_at >= cutoff,
                None => true,
            }
        }
        PublishedTimeRule::Absolute {
            start_date,
            end_date,
        } => {
            start_date.is_none_or(|start| video.published_at >= start)
                && end_date.is_none_or(|end| video.published_at <= end)
        }
    }
}

fn matches_language(video: &Video, preference: &LanguagePreference) -> bool {
    let preferred = preference.preferred.trim();
    if preferred.is_empty() {
        return true;
    }
    video
        .language
        .to_lowercase()
        .starts_with(&preferred.to_lowercase())
}

fn allows_content_type(video: &Video, mask: &ContentTypeMask) -> bool {
    match video.content_type {
        ContentType::Video => mask.videos,
        ContentType::Livestream => mask.livestreams,
        ContentType::Short => mask.shorts,
    }
}

/// Whether `actual` falls short of `min`; a negative minimum never does
fn below_minimum(actual: u64, min: i64) -> bool {
    u64::try_from(min).is_ok_and(|min| actual < min)
}

fn meets_popularity(video: &Video, threshold: &PopularityThreshold) -> bool {
    if below_minimum(video.view_count, threshold.min_views)
        || below_minimum(video.like_count, threshold.min_likes)
    {
        return false;
    }
    if threshold.min_like_ratio > 0.0 && video.view_count > 0 {
        return video.like_ratio() >= threshold.min_like_ratio;
    }
    true
}

fn allows_channel(video: &Video, rule: &ChannelRule) -> bool {
    let listed = |list: &[String]| {
        list.iter()
            .any(|channel| channel.eq_ignore_ascii_case(&video.channel_id))
    };

    if listed(&rule.exclude) {
        return false;
    }
    rule.include.is_empty() || listed(&rule.include)
}
