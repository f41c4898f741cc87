//! Server crate for the video curator.
//!
//! This crate contains the orchestrator that coordinates all components
//! of the curation pipeline, and its configuration.

pub mod config;
pub mod orchestrator;

pub use config::CuratorConfig;
pub use orchestrator::{CurationOrchestrator, CurationResult, ErrorDetail};
