//! Catalogue Search - local `SearchProvider` backed by a `VideoCatalog`
//!
//! Stands in for the remote content provider when running from a catalogue
//! file (CLI, test harness, benchmarks).
//!
//! ## Algorithm
//! 1. Reject blank queries with `InvalidQuery`
//! 2. Split the query into lower-cased terms
//! 3. Keep videos whose title or channel name contains every term
//! 4. Order newest first and cap at `max_results`
//!
//! An optional call quota mimics the provider's daily limit: once used up,
//! every search fails with `QuotaExceeded`.

use crate::provider::{ProviderError, SearchProvider};
use async_trait::async_trait;
use data_loader::{Video, VideoCatalog};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, instrument};

/// Searches an in-memory catalogue.
pub struct CatalogSearchProvider {
    catalog: Arc<VideoCatalog>,
    /// Remaining searches before `QuotaExceeded`; `None` means unlimited
    remaining_quota: Option<AtomicUsize>,
}

impl CatalogSearchProvider {
    /// Create a provider with no call quota
    pub fn new(catalog: Arc<VideoCatalog>) -> Self {
        Self {
            catalog,
            remaining_quota: None,
        }
    }

    /// Limit the number of searches this provider will answer
    pub fn with_quota(mut self, calls: usize) -> Self {
        self.remaining_quota = Some(AtomicUsize::new(calls));
        self
    }

    fn take_quota(&self) -> bool {
        match &self.remaining_quota {
            None => true,
            Some(remaining) => remaining
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok(),
        }
    }
}

/// Whether every term appears in the video's title or channel name
fn matches_terms(video: &Video, terms: &[String]) -> bool {
    let title = video.title.to_lowercase();
    let channel = video.channel_name.to_lowercase();
    terms
        .iter()
        .all(|term| title.contains(term.as_str()) || channel.contains(term.as_str()))
}

#[async_trait]
impl SearchProvider for CatalogSearchProvider {
    fn name(&self) -> &str {
        "CatalogSearchProvider"
    }

    #[instrument(skip(self), fields(catalog_size = self.catalog.len()))]
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Video>, ProviderError> {
        if query.trim().is_empty() {
            return Err(ProviderError::invalid_query());
        }
        if !self.take_quota() {
            return Err(ProviderError::quota_exceeded());
        }

        let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();

        let mut results: Vec<Video> = self
            .catalog
            .iter()
            .filter(|video| matches_terms(video, &terms))
            .cloned()
            .collect();

        // Stable sort keeps catalogue order among equal timestamps
        results.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        results.truncate(max_results);

        debug!("Catalogue search for '{}' returned {} videos", query, results.len());
        Ok(results)
    }
}
