//! Filtering, ranking and discovery blending of candidate videos.
//!
//! This crate provides:
//! - `FilterEngine`, the eight-group criteria evaluator
//! - Filter trait, implementations and `FilterPipeline` for composing them
//! - `FeatureExtractor` for the per-video ranking signals
//! - `RankingEngine`, the stable multi-strategy sort
//! - `DiscoveryBlender` for strict / relaxed / wildcard selection
//!
//! ## Architecture
//! Candidates flow through the stages in order:
//! 1. Filters remove seen videos and those failing the playlist criteria
//! 2. The discovery blender selects and annotates a bounded result set, or
//!    the ranking engine sorts and truncates when discovery is off
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{DiscoveryBlender, FilterPipeline};
//!
//! let filtered = FilterPipeline::standard().apply(videos, &context)?;
//! let blender = DiscoveryBlender::new(related.clone());
//! let selected = blender
//!     .select_with_discovery(
//!         filtered,
//!         context.discovery.as_ref(),
//!         context.sort_strategy,
//!         context.desired_count,
//!     )
//!     .await;
//! ```

pub mod discovery;
pub mod engine;
pub mod features;
pub mod filter_pipeline;
pub mod filters;
pub mod ranking;
pub mod traits;

// Re-export main types
pub use discovery::{DEFAULT_EXPLANATION, DiscoveryBlender, RELAXED_REASON, STRICT_REASON};
pub use engine::FilterEngine;
pub use features::{FeatureExtractor, VideoFeatures};
pub use filter_pipeline::FilterPipeline;
pub use ranking::RankingEngine;
pub use traits::Filter;
