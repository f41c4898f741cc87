//! Simple test harness for the curation orchestrator.
//!
//! Curates one query against a local catalogue and prints the result.
//!
//! Usage: `server [catalogue.json] [query] [config.toml]`

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use data_loader::{DiscoveryConfig, VideoCatalog};
use server::{CurationOrchestrator, CuratorConfig};
use sources::{CatalogRelatedSource, CatalogSearchProvider, PlaylistContext};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,server=debug,pipeline=debug")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let catalog_path = PathBuf::from(args.next().unwrap_or_else(|| "data/catalogue.json".into()));
    let query = args.next().unwrap_or_else(|| "rust tutorial".into());
    let config_path = args.next().map(PathBuf::from);

    info!("Starting curator test harness");
    let config = CuratorConfig::load_or_default(config_path.as_deref())?;

    info!("Loading catalogue from {}", catalog_path.display());
    let catalog = Arc::new(
        VideoCatalog::load_from_file(Path::new(&catalog_path))
            .with_context(|| format!("Failed to load {}", catalog_path.display()))?,
    );
    info!(
        "Catalogue loaded: {} videos from {} channels",
        catalog.len(),
        catalog.channel_count()
    );

    let orchestrator = CurationOrchestrator::from_config(
        Arc::new(CatalogSearchProvider::new(catalog.clone())),
        CatalogRelatedSource::new(catalog),
        &config,
    )
    .await?;

    let context = PlaylistContext::new("harness", query)
        .with_discovery(Some(DiscoveryConfig::default()))
        .with_desired_count(config.desired_count);

    let result = orchestrator.curate(&context).await?;
    if let Some(error) = &result.error {
        warn!("Warning: {} ({})", error.message, error.kind);
    }

    info!(
        "Received {} videos (from cache: {}):",
        result.videos.len(),
        result.from_cache
    );
    for (i, video) in result.videos.iter().enumerate() {
        info!(
            "{}. {} - {} [{} views]",
            i + 1,
            video.title,
            video.channel_name,
            video.view_count
        );
        info!("   {}", CurationOrchestrator::explain(video));
    }

    Ok(())
}
