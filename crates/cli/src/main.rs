use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use data_loader::{DiscoveryConfig, FilterSpec, SortStrategy, VideoCatalog, VideoId};
use server::{CurationOrchestrator, CurationResult, CuratorConfig};
use sources::{
    CatalogRelatedSource, CatalogSearchProvider, PlaylistContext, StoredPlaylist,
    build_playlist_context,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

/// Curator - video playlist curation engine
#[derive(Parser)]
#[command(name = "curator")]
#[command(about = "Curates video playlists from a local catalogue", long_about = None)]
struct Cli {
    /// Path to the JSON video catalogue
    #[arg(short, long, default_value = "data/catalogue.json")]
    catalog: PathBuf,

    /// Optional TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Inputs shared by `curate` and `explain`
#[derive(Args)]
struct CurateArgs {
    /// Search query
    #[arg(long)]
    query: String,

    /// Filter criteria: JSON text or a path to a JSON file
    #[arg(long)]
    filters: Option<String>,

    /// Discovery profile: "enabled", JSON text or a path to a JSON file
    #[arg(long)]
    discovery: Option<String>,

    /// Sort strategy name or ordinal, e.g. NewestFirst
    #[arg(long)]
    sort: Option<String>,

    /// Comma-separated video IDs already delivered
    #[arg(long, value_delimiter = ',')]
    seen: Vec<VideoId>,

    /// Number of videos to return
    #[arg(long)]
    limit: Option<usize>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

impl CurateArgs {
    fn into_context(self, default_count: usize) -> Result<PlaylistContext> {
        let filters = read_text_or_file(self.filters)?;
        let discovery = read_text_or_file(self.discovery)?;

        Ok(PlaylistContext::new("cli", self.query)
            .with_filters(FilterSpec::from_json_lenient(filters.as_deref()))
            .with_discovery(DiscoveryConfig::from_profile_text(discovery.as_deref()))
            .with_sort(SortStrategy::parse_or_default(self.sort.as_deref()))
            .with_seen(self.seen)
            .with_desired_count(self.limit.unwrap_or(default_count)))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Curate videos for an ad-hoc query
    Curate(CurateArgs),

    /// Curate and show why each video was selected
    Explain(CurateArgs),

    /// Curate videos for a stored playlist JSON file
    Playlist {
        /// Path to the stored playlist
        #[arg(long)]
        file: PathBuf,

        /// Comma-separated video IDs already delivered
        #[arg(long, value_delimiter = ',')]
        seen: Vec<VideoId>,

        /// Show why each video was selected
        #[arg(long)]
        explain: bool,
    },

    /// Manage cached searches
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,

        /// Comma-separated queries to pick from at random
        #[arg(long, value_delimiter = ',', default_value = "rust tutorial,game engine,cooking basics")]
        queries: Vec<String>,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Drop the cached result for one query
    Invalidate {
        #[arg(long)]
        query: String,
    },
    /// Remove every expired entry
    Cleanup,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = CuratorConfig::load_or_default(cli.config.as_deref())?;

    // Progress goes to stderr so `--json` output stays parseable
    eprintln!("Loading catalogue from {}...", cli.catalog.display());
    let start = Instant::now();
    let catalog = Arc::new(
        VideoCatalog::load_from_file(&cli.catalog).context("Failed to load video catalogue")?,
    );
    eprintln!(
        "{} Loaded {} videos in {:?}",
        "✓".green(),
        catalog.len(),
        start.elapsed()
    );

    let orchestrator = CurationOrchestrator::from_config(
        Arc::new(CatalogSearchProvider::new(catalog.clone())),
        CatalogRelatedSource::new(catalog),
        &config,
    )
    .await?;

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Curate(args) => {
            let json = args.json;
            let context = args.into_context(config.desired_count)?;
            handle_curate(&orchestrator, &context, false, json).await?
        }
        Commands::Explain(args) => {
            let json = args.json;
            let context = args.into_context(config.desired_count)?;
            handle_curate(&orchestrator, &context, true, json).await?
        }
        Commands::Playlist {
            file,
            seen,
            explain,
        } => handle_playlist(&orchestrator, file, seen, explain).await?,
        Commands::Cache { action } => handle_cache(&orchestrator, &config, action).await?,
        Commands::Benchmark {
            requests,
            concurrent,
            queries,
        } => {
            handle_benchmark(orchestrator, config.desired_count, requests, concurrent, queries)
                .await?
        }
    }

    Ok(())
}

/// Handle the 'curate' command
async fn handle_curate(
    orchestrator: &CurationOrchestrator,
    context: &PlaylistContext,
    explain: bool,
    json: bool,
) -> Result<()> {
    let result = orchestrator.curate(context).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&context.search_query, &result, explain);
    }
    Ok(())
}

/// Treat `value` as a file path when one exists, as literal text otherwise
fn read_text_or_file(value: Option<String>) -> Result<Option<String>> {
    match value {
        Some(v) if Path::new(&v).is_file() => std::fs::read_to_string(&v)
            .map(Some)
            .with_context(|| format!("Failed to read {}", v)),
        other => Ok(other),
    }
}

/// Handle the 'playlist' command
async fn handle_playlist(
    orchestrator: &CurationOrchestrator,
    file: PathBuf,
    seen: Vec<VideoId>,
    explain: bool,
) -> Result<()> {
    let text = std::fs::read_to_string(&file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let stored: StoredPlaylist = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse playlist {}", file.display()))?;

    println!("{}", format!("Playlist: {}", stored.name).bold());
    let context = build_playlist_context(&stored, seen)?;
    handle_curate(orchestrator, &context, explain, false).await
}

/// Handle the 'cache' command
async fn handle_cache(
    orchestrator: &CurationOrchestrator,
    config: &CuratorConfig,
    action: CacheAction,
) -> Result<()> {
    if config.cache_dir.is_none() {
        println!(
            "{} No cache_dir configured; the cache lives only for this process",
            "!".yellow()
        );
    }

    match action {
        CacheAction::Invalidate { query } => {
            if orchestrator.invalidate(&query).await? {
                println!("{} Invalidated '{}'", "✓".green(), query);
            } else {
                println!("Nothing cached for '{}'", query);
            }
        }
        CacheAction::Cleanup => {
            let removed = orchestrator.cleanup_expired().await?;
            println!("{} Removed {} expired entries", "✓".green(), removed);
        }
    }
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    orchestrator: CurationOrchestrator,
    desired_count: usize,
    requests: usize,
    concurrent: usize,
    queries: Vec<String>,
) -> Result<()> {
    if requests == 0 || concurrent == 0 {
        bail!("requests and concurrent must both be at least 1");
    }
    if queries.is_empty() {
        bail!("at least one benchmark query is required");
    }

    let limiter = Arc::new(Semaphore::new(concurrent));
    let start = Instant::now();

    let mut handles = Vec::with_capacity(requests);
    for i in 0..requests {
        let query = &queries[rand::random_range(0..queries.len())];
        let context = PlaylistContext::new(format!("bench-{}", i), query.as_str())
            .with_discovery(Some(DiscoveryConfig::default()))
            .with_desired_count(desired_count);
        let orchestrator = orchestrator.clone();
        let limiter = limiter.clone();

        handles.push(tokio::spawn(async move {
            let _permit = limiter.acquire_owned().await?;
            let started = Instant::now();
            orchestrator.curate(&context).await?;
            Ok::<_, anyhow::Error>(started.elapsed())
        }));
    }

    // Wait for all tasks to complete and collect timings
    let mut timings = Vec::with_capacity(requests);
    for handle in handles {
        timings.push(handle.await??);
    }
    let total_time = start.elapsed();

    timings.sort();
    let latency_sum: Duration = timings.iter().sum();
    let avg_latency = latency_sum / timings.len() as u32;
    let throughput = requests as f64 / total_time.as_secs_f64();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(&timings, 0.50));
    println!("P95 latency: {:?}", percentile(&timings, 0.95));
    println!("P99 latency: {:?}", percentile(&timings, 0.99));
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Value at fraction `p` of a sorted, non-empty sample
fn percentile(sorted: &[Duration], p: f64) -> Duration {
    let index = ((sorted.len() as f64 * p) as usize).min(sorted.len() - 1);
    sorted[index]
}

/// Helper function to format and print a curation result
fn print_result(query: &str, result: &CurationResult, explain: bool) {
    println!("{}", format!("Videos for '{}':", query).bold().blue());

    if let Some(error) = &result.error {
        let note = if result.is_stale() {
            "showing cached results"
        } else {
            "no results available"
        };
        println!(
            "{} {} ({}): {}",
            "!".yellow(),
            error.message,
            error.kind,
            note
        );
    }

    if result.videos.is_empty() {
        println!("No videos matched.");
    }

    for (i, video) in result.videos.iter().enumerate() {
        let minutes = video.duration_seconds / 60;
        let seconds = video.duration_seconds % 60;
        println!(
            "{}. {} - {} [{}:{:02}] {} views, {} likes",
            (i + 1).to_string().green(),
            video.title,
            video.channel_name,
            minutes,
            seconds,
            video.view_count,
            video.like_count
        );
        if explain {
            println!("   Reason: {}", CurationOrchestrator::explain(video));
        }
    }

    let source = if result.from_cache { "cache" } else { "provider" };
    match result.cache_expires_utc {
        Some(expires) => println!("Served from {} (expires {})", source, expires.to_rfc3339()),
        None => println!("Served from {}", source),
    }
}
