//! # Data Loader Crate
//!
//! Domain types and loading for the video curation pipeline.
//!
//! ## Main Components
//!
//! - **types**: `Video` and `ContentType`
//! - **profile**: playlist criteria (`FilterSpec`), discovery mix
//!   (`DiscoveryConfig`) and `SortStrategy`, with forgiving text parsing
//! - **parser**: parse JSON video catalogues
//! - **index**: `VideoCatalog`, an indexed in-memory catalogue
//! - **error**: error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{DiscoveryConfig, FilterSpec, SortStrategy, VideoCatalog};
//! use std::path::Path;
//!
//! let catalog = VideoCatalog::load_from_file(Path::new("data/catalogue.json"))?;
//! let filters = FilterSpec::from_json_lenient(playlist.filters.as_deref());
//! let discovery = DiscoveryConfig::from_profile_text(playlist.discovery_profile.as_deref());
//! let sort = SortStrategy::parse_or_default(playlist.sort_strategy.as_deref());
//! ```

// Public modules
pub mod error;
pub mod index;
pub mod parser;
pub mod profile;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, Result};
pub use index::VideoCatalog;
pub use profile::{
    ChannelRule, ContentTypeMask, DiscoveryConfig, DurationRange, FilterSpec,
    LanguagePreference, PopularityThreshold, PublishedTimeRule, SortStrategy,
    WILDCARD_LOW_POP_HIGH_QUALITY, WILDCARD_OTHER_FORMAT, WILDCARD_OTHER_LANGUAGE,
    WILDCARD_RELATED_CHANNELS,
};
pub use types::{ContentType, Video, VideoId};
