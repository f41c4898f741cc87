//! Filter implementations for the curation pipeline.
//!
//! This module contains the concrete filters that can be composed into a
//! FilterPipeline.

pub mod already_seen;
pub mod criteria;

// Re-export for convenience
pub use already_seen::AlreadySeenFilter;
pub use criteria::CriteriaFilter;
