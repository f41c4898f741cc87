//! Contract for the external content provider.
//!
//! The provider's own API binding lives outside this workspace; the pipeline
//! only sees the `SearchProvider` trait and the classified `ProviderError`.

use async_trait::async_trait;
use data_loader::Video;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Classification of a failed provider call.
///
/// `QuotaExceeded` and `NetworkError` are transient: the search cache may
/// answer them with stale data. The others are not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderErrorKind {
    /// Blank or otherwise unusable query; the provider was never contacted
    InvalidQuery,
    /// Daily quota used up
    QuotaExceeded,
    /// Connection failure or timeout
    NetworkError,
    /// The provider answered with an API error
    UpstreamApiError,
    /// Anything else
    GenericError,
}

impl ProviderErrorKind {
    /// Whether stale cached data may stand in for a failed fetch
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderErrorKind::QuotaExceeded | ProviderErrorKind::NetworkError)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderErrorKind::InvalidQuery => "InvalidQuery",
            ProviderErrorKind::QuotaExceeded => "QuotaExceeded",
            ProviderErrorKind::NetworkError => "NetworkError",
            ProviderErrorKind::UpstreamApiError => "UpstreamApiError",
            ProviderErrorKind::GenericError => "GenericError",
        }
    }
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed provider call: its kind plus a user-facing message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_query() -> Self {
        Self::new(ProviderErrorKind::InvalidQuery, "query is empty")
    }

    pub fn quota_exceeded() -> Self {
        Self::new(
            ProviderErrorKind::QuotaExceeded,
            "The provider quota is used up for today. Try again tomorrow.",
        )
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::NetworkError, message)
    }
}

/// Searches the external content provider.
///
/// Implementations classify every failure into a `ProviderError` instead of
/// panicking. An empty `Ok` list means "no results", not a failure.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Returns the name of this provider (for logging/debugging)
    fn name(&self) -> &str;

    /// Search for up to `max_results` videos matching `query`.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Video>, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_kinds() {
        assert!(ProviderErrorKind::QuotaExceeded.is_transient());
        assert!(ProviderErrorKind::NetworkError.is_transient());
        assert!(!ProviderErrorKind::InvalidQuery.is_transient());
        assert!(!ProviderErrorKind::UpstreamApiError.is_transient());
        assert!(!ProviderErrorKind::GenericError.is_transient());
    }

    #[test]
    fn test_error_display() {
        let err = ProviderError::network("connection reset");
        assert_eq!(err.to_string(), "NetworkError: connection reset");
        assert_eq!(ProviderError::invalid_query().message, "query is empty");
    }
}
