//! # Sources Crate
//!
//! Collaborators that feed the curation pipeline with candidate videos.
//!
//! ## Components
//!
//! ### Search Provider
//! The external content provider behind the `SearchProvider` trait:
//! - Failures are classified as `ProviderErrorKind` values, never panics
//! - `QuotaExceeded` and `NetworkError` are transient
//! - `CatalogSearchProvider` answers searches from a local catalogue
//!
//! ### Related Videos
//! Wildcard candidates for discovery mode:
//! - `RelatedVideoSource` is best-effort and never fails
//! - `RelatedVideoCache` bounds memory with LRU eviction and a 24h TTL
//! - `CatalogRelatedSource` finds same-channel and similar-title videos
//!
//! ### Playlist Context
//! Parses a stored playlist's text criteria once into typed structures.
//!
//! ## Example Usage
//!
//! ```ignore
//! use sources::{CatalogSearchProvider, CatalogRelatedSource, RelatedVideoCache};
//! use data_loader::VideoCatalog;
//! use std::sync::Arc;
//!
//! let catalog = Arc::new(VideoCatalog::load_from_file(path)?);
//! let provider = CatalogSearchProvider::new(catalog.clone());
//! let related = RelatedVideoCache::new(CatalogRelatedSource::new(catalog));
//!
//! let videos = provider.search("unity tutorial", 50).await?;
//! let wildcards = related.get_related(&videos[0].video_id, 2).await;
//! ```

// Public modules
pub mod catalog_search;
pub mod playlist_context;
pub mod provider;
pub mod related;

// Re-export commonly used types
pub use catalog_search::CatalogSearchProvider;
pub use playlist_context::{
    DEFAULT_DESIRED_COUNT, PlaylistContext, StoredPlaylist, build_playlist_context,
};
pub use provider::{ProviderError, ProviderErrorKind, SearchProvider};
pub use related::{
    CatalogRelatedSource, DEFAULT_RELATED_CAPACITY, DEFAULT_RELATED_TTL, EmptyRelatedSource,
    RelatedVideoCache, RelatedVideoSource,
};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use data_loader::{Video, VideoCatalog};
    use std::sync::Arc;

    fn create_test_catalog() -> Arc<VideoCatalog> {
        let catalog = VideoCatalog::from_videos(vec![
            Video::new("a", "Unity tutorial part 1", "UC1", Utc::now()),
            Video::new("b", "Unity tutorial part 2", "UC1", Utc::now()),
        ])
        .unwrap();
        Arc::new(catalog)
    }

    #[tokio::test]
    async fn test_search_then_related() {
        let catalog = create_test_catalog();
        let provider = CatalogSearchProvider::new(catalog.clone());
        let related = RelatedVideoCache::new(CatalogRelatedSource::new(catalog));

        let videos = provider.search("unity", 50).await.unwrap();
        assert_eq!(videos.len(), 2);

        let wildcards = related.get_related(&videos[0].video_id, 5).await;
        assert_eq!(wildcards.len(), 1);
        assert_ne!(wildcards[0].video_id, videos[0].video_id);
    }

    #[tokio::test]
    async fn test_empty_related_source() {
        assert!(EmptyRelatedSource.get_related("a", 5).await.is_empty());
    }
}
