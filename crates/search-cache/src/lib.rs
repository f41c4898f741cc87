//! # Search Cache Crate
//!
//! Keeps provider calls to a minimum and degrades gracefully when the
//! provider is unavailable.
//!
//! ## Main Components
//!
//! - **cache**: `SearchCache`, the TTL cache with stale fallback
//! - **store**: `CacheStore` trait, `CacheEntry`, `InMemoryCacheStore`
//! - **file_store**: `FileCacheStore`, JSON files that survive restarts
//!
//! ## Example Usage
//!
//! ```ignore
//! use search_cache::{FileCacheStore, SearchCache};
//! use std::sync::Arc;
//!
//! let store = Arc::new(FileCacheStore::open("cache/search").await?);
//! let cache = SearchCache::new(provider, store);
//!
//! let outcome = cache.get_or_fetch("unity tutorial").await;
//! if let Some(error) = &outcome.error {
//!     eprintln!("warning: {}", error.message);
//! }
//! ```

pub mod cache;
pub mod file_store;
pub mod store;

pub use cache::{
    DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_RESULTS, DEFAULT_TTL_SECS, SearchCache, SearchOutcome,
    normalize_query,
};
pub use file_store::FileCacheStore;
pub use store::{CacheEntry, CacheStore, InMemoryCacheStore, Result, StoreError};
