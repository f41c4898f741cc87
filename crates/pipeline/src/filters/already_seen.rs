//! Filter to remove videos already delivered for this playlist.
//!
//! Runs first, ahead of the criteria check.

use crate::traits::Filter;
use anyhow::Result;
use data_loader::Video;
use sources::PlaylistContext;

/// Removes candidates whose id is in `PlaylistContext::seen_video_ids`.
///
/// Also drops repeated ids within the candidate list, keeping the first.
pub struct AlreadySeenFilter;

impl Filter for AlreadySeenFilter {
    fn name(&self) -> &str {
        "AlreadySeenFilter"
    }

    fn apply(&self, videos: Vec<Video>, context: &PlaylistContext) -> Result<Vec<Video>> {
        let mut kept = std::collections::HashSet::new();
        let filtered: Vec<Video> = videos
            .into_iter()
            .filter(|video| !context.has_seen(&video.video_id))
            .filter(|video| kept.insert(video.video_id.clone()))
            .collect();
        Ok(filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_already_seen_filter() {
        let context = PlaylistContext::new("pl", "rust")
            .with_seen(vec!["100".to_string(), "200".to_string()]);

        let now = Utc::now();
        let videos = vec![
            Video::new("100", "a", "UC1", now),
            Video::new("101", "b", "UC1", now),
            Video::new("200", "c", "UC1", now),
            Video::new("300", "d", "UC1", now),
            Video::new("101", "b again", "UC1", now),
        ];

        let filtered = AlreadySeenFilter.apply(videos, &context).unwrap();

        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].video_id, "101");
        assert_eq!(filtered[0].title, "b");
        assert_eq!(filtered[1].video_id, "300");
    }
}
