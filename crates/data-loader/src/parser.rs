//! Parser for video catalogue files.
//!
//! A catalogue is a JSON array of video records. Records follow the `Video`
//! JSON shape with two conveniences for hand-written or exported data:
//! - `duration` may be given as an ISO-8601 string ("PT1H2M30S") instead of
//!   `durationSeconds`
//! - when `contentType` is missing, videos of 60 seconds or less are treated
//!   as shorts

use crate::error::{DataLoadError, Result};
use crate::types::*;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Longest duration, in seconds, still inferred as a short.
pub const SHORT_MAX_SECONDS: u64 = 60;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogueRecord {
    video_id: VideoId,
    title: String,
    #[serde(default)]
    channel_name: Option<String>,
    channel_id: String,
    #[serde(default)]
    thumbnail_url: String,
    #[serde(default)]
    duration_seconds: Option<u64>,
    #[serde(default)]
    duration: Option<String>,
    published_at: DateTime<Utc>,
    #[serde(default)]
    view_count: u64,
    #[serde(default)]
    like_count: u64,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    content_type: Option<ContentType>,
    #[serde(default)]
    has_captions: bool,
}

impl CatalogueRecord {
    fn into_video(self) -> Video {
        let duration_seconds = self
            .duration_seconds
            .or_else(|| self.duration.as_deref().and_then(parse_iso8601_duration))
            .unwrap_or(0);

        let content_type = self.content_type.unwrap_or(if duration_seconds <= SHORT_MAX_SECONDS {
            ContentType::Short
        } else {
            ContentType::Video
        });

        Video {
            channel_name: self.channel_name.unwrap_or_else(|| self.channel_id.clone()),
            video_id: self.video_id,
            title: self.title,
            channel_id: self.channel_id,
            thumbnail_url: self.thumbnail_url,
            duration_seconds,
            published_at: self.published_at,
            view_count: self.view_count,
            like_count: self.like_count,
            language: self
                .language
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(|| "en".to_string()),
            content_type,
            has_captions: self.has_captions,
            discovery_reason: None,
        }
    }
}

/// Parse an ISO-8601 duration such as "PT1H2M30S" or "P1DT2H" into seconds.
///
/// Returns `None` for anything that is not a well-formed day/time duration.
pub fn parse_iso8601_duration(s: &str) -> Option<u64> {
    let rest = s.trim().strip_prefix('P')?;
    if rest.is_empty() {
        return None;
    }

    let (date_part, time_part) = match rest.split_once('T') {
        Some((d, t)) if !t.is_empty() => (d, Some(t)),
        Some(_) => return None,
        None => (rest, None),
    };

    let mut total = 0u64;
    total += sum_components(date_part, &[('W', 604_800), ('D', 86_400)])?;
    if let Some(time) = time_part {
        total += sum_components(time, &[('H', 3_600), ('M', 60), ('S', 1)])?;
    }
    Some(total)
}

/// Sum "<number><unit>" components, accepting units only in the given order.
fn sum_components(part: &str, units: &[(char, u64)]) -> Option<u64> {
    let mut total = 0u64;
    let mut digits = String::new();
    let mut next_unit = 0;

    for c in part.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let offset = units[next_unit..].iter().position(|(u, _)| *u == c)?;
        let (_, factor) = units[next_unit + offset];
        let value: u64 = digits.parse().ok()?;
        total = total.checked_add(value.checked_mul(factor)?)?;
        digits.clear();
        next_unit += offset + 1;
    }

    if digits.is_empty() { Some(total) } else { None }
}

/// Parse catalogue JSON text into videos.
///
/// # Arguments
/// * `content` - JSON array of catalogue records
/// * `source` - Name used in error messages (usually the file name)
pub fn parse_videos_str(content: &str, source: &str) -> Result<Vec<Video>> {
    let records: Vec<CatalogueRecord> =
        serde_json::from_str(content).map_err(|e| DataLoadError::ParseError {
            file: source.to_string(),
            reason: e.to_string(),
        })?;

    let videos: Vec<Video> = records.into_iter().map(CatalogueRecord::into_video).collect();
    debug!("Parsed {} videos from {}", videos.len(), source);
    Ok(videos)
}

/// Parse a catalogue file from disk
pub fn parse_videos(path: &Path) -> Result<Vec<Video>> {
    if !path.exists() {
        return Err(DataLoadError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    parse_videos_str(&content, &path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_iso8601_duration() {
        assert_eq!(parse_iso8601_duration("PT1H2M30S"), Some(3750));
        assert_eq!(parse_iso8601_duration("PT45S"), Some(45));
        assert_eq!(parse_iso8601_duration("P1DT1M"), Some(86_460));
        assert_eq!(parse_iso8601_duration("P2W"), Some(1_209_600));
        assert_eq!(parse_iso8601_duration("PT"), None);
        assert_eq!(parse_iso8601_duration("P"), None);
        assert_eq!(parse_iso8601_duration("PT1S1H"), None);
        assert_eq!(parse_iso8601_duration("1H"), None);
        assert_eq!(parse_iso8601_duration("PT12"), None);
    }

    #[test]
    fn test_parse_videos_infers_shorts() {
        let json = r#"[
            {"videoId": "a", "title": "Quick tip", "channelId": "UC1",
             "duration": "PT45S", "publishedAt": "2024-03-01T12:00:00Z"},
            {"videoId": "b", "title": "Deep dive", "channelId": "UC1", "channelName": "Chan",
             "durationSeconds": 1800, "publishedAt": "2024-03-02T12:00:00Z"},
            {"videoId": "c", "title": "Live now", "channelId": "UC2", "contentType": "Livestream",
             "durationSeconds": 30, "publishedAt": "2024-03-03T12:00:00Z", "language": "de"}
        ]"#;

        let videos = parse_videos_str(json, "inline").unwrap();
        assert_eq!(videos.len(), 3);

        assert_eq!(videos[0].content_type, ContentType::Short);
        assert_eq!(videos[0].duration_seconds, 45);
        assert_eq!(videos[0].channel_name, "UC1");
        assert_eq!(videos[0].language, "en");

        assert_eq!(videos[1].content_type, ContentType::Video);
        assert_eq!(videos[1].channel_name, "Chan");

        assert_eq!(videos[2].content_type, ContentType::Livestream);
        assert_eq!(videos[2].language, "de");
    }

    #[test]
    fn test_parse_videos_reports_source() {
        let err = parse_videos_str("{", "broken.json").unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_parse_missing_file() {
        let err = parse_videos(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, DataLoadError::FileNotFound { .. }));
    }

    #[test]
    fn test_parse_videos_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalogue.json");
        std::fs::write(
            &path,
            r#"[{"videoId": "x", "title": "T", "channelId": "C", "publishedAt": "2024-01-01T00:00:00Z"}]"#,
        )
        .unwrap();

        let videos = parse_videos(&path).unwrap();
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].video_id, "x");
    }
}
