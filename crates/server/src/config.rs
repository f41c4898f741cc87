//! Curator configuration, loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working in-memory setup.

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CuratorConfig {
    /// Lifetime of a cached search result
    pub cache_ttl_secs: u64,
    /// Lifetime of a cached related-video list
    pub related_ttl_secs: u64,
    /// Seeds kept in the related-video cache
    pub related_cache_capacity: u64,
    /// Videos requested per provider search
    pub provider_max_results: usize,
    pub provider_timeout_secs: u64,
    /// Videos returned per curation run unless the caller asks otherwise
    pub desired_count: usize,
    /// Directory for the persistent search cache; in-memory when unset
    pub cache_dir: Option<PathBuf>,
}

impl Default for CuratorConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 3_600,
            related_ttl_secs: 86_400,
            related_cache_capacity: 1_000,
            provider_max_results: 50,
            provider_timeout_secs: 10,
            desired_count: 20,
            cache_dir: None,
        }
    }
}

impl CuratorConfig {
    /// Load from a TOML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::from_toml_str(&text)
            .with_context(|| format!("Invalid config {}", path.display()))?;

        tracing::info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Load from `path` when given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cache_ttl_secs == 0 {
            return Err(anyhow!("cache_ttl_secs must be greater than 0"));
        }
        if self.provider_max_results == 0 {
            return Err(anyhow!("provider_max_results must be greater than 0"));
        }
        if self.provider_timeout_secs == 0 {
            return Err(anyhow!("provider_timeout_secs must be greater than 0"));
        }
        if self.desired_count == 0 {
            return Err(anyhow!("desired_count must be greater than 0"));
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.cache_ttl_secs.min(i64::MAX as u64) as i64)
    }

    pub fn related_ttl(&self) -> Duration {
        Duration::from_secs(self.related_ttl_secs)
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }

    /// One-line summary for startup logs
    pub fn summary(&self) -> String {
        format!(
            "cache ttl {}s, related ttl {}s (capacity {}), provider max {} results / {}s timeout, {} videos per run, cache {}",
            self.cache_ttl_secs,
            self.related_ttl_secs,
            self.related_cache_capacity,
            self.provider_max_results,
            self.provider_timeout_secs,
            self.desired_count,
            self.cache_dir
                .as_ref()
                .map(|d| d.display().to_string())
                .unwrap_or_else(|| "in memory".to_string())
        )
    }
}
