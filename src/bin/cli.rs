use clap::{Parser, Subcommand};

use aat_reconcile::cache::{ResponseCache, SqliteCache};
use aat_reconcile::providers::AatProvider;
use aat_reconcile::{Config, QueryResult, ReconcileEngine, ReconcileQuery};

#[derive(Parser)]
#[command(name = "reconcile-cli")]
#[command(about = "AAT reconciliation CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Cache database path (overrides RECONCILE_CACHE_PATH)
    #[arg(short, long)]
    cache: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile a label
    Search {
        /// Label to look up
        query: String,

        /// Maximum candidates (at most 10)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print the JSON the HTTP service would return
        #[arg(long)]
        json: bool,
    },

    /// Get cache statistics
    Stats,

    /// Clean up old cache entries
    Cleanup {
        /// Maximum age in hours
        #[arg(short, long, default_value = "24")]
        max_age_hours: i64,
    },

    /// Drop the cached response for a label
    Invalidate {
        /// Label whose lookup should be refetched
        query: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(cache) = cli.cache {
        config.cache_path = cache;
    }

    match cli.command {
        Commands::Search { query, limit, json } => {
            let engine = ReconcileEngine::from_config(&config).await?;

            let mut search_query = ReconcileQuery::new(query.clone());
            if let Some(limit) = limit {
                search_query = search_query.with_limit(limit);
            }

            let candidates = engine.search(&search_query).await;

            if json {
                let result = QueryResult::new(candidates);
                println!("{}", serde_json::to_string_pretty(&result)?);
                return Ok(());
            }

            println!("Searching AAT for: {}", query.trim());

            if candidates.is_empty() {
                println!("\nNo candidates");
            }

            for (i, candidate) in candidates.iter().enumerate() {
                println!(
                    "{:>2}. {:<40} {:>3}% {} {}",
                    i + 1,
                    candidate.name.trim(),
                    candidate.score,
                    if candidate.is_match { "match" } else { "     " },
                    candidate.id
                );
            }
        }

        Commands::Stats => {
            let engine = ReconcileEngine::from_config(&config).await?;
            let stats = engine.cache_stats().await?;

            println!("Cache Statistics ({}):", config.cache_path);
            println!("   Total entries: {}", stats.total_entries);
            println!("   Total hits: {}", stats.total_hits);
            println!("   Avg hits/entry: {:.2}", stats.avg_hit_count);

            if let Some(oldest) = stats.oldest_entry {
                println!("   Oldest entry: {}", oldest.format("%Y-%m-%d %H:%M:%S"));
            }

            if let Some(newest) = stats.newest_entry {
                println!("   Newest entry: {}", newest.format("%Y-%m-%d %H:%M:%S"));
            }
        }

        Commands::Cleanup { max_age_hours } => {
            println!("Cleaning up entries older than {} hours...", max_age_hours);

            let engine = ReconcileEngine::from_config(&config).await?;
            let deleted = engine.cleanup_cache(max_age_hours).await?;

            println!("Deleted {} entries", deleted);
        }

        Commands::Invalidate { query } => {
            let cache = SqliteCache::new(&config.cache_path, config.cache_ttl_chrono()).await?;
            let provider = AatProvider::new(config.http_timeout)?.with_endpoint(&config.aat_endpoint);

            let url = provider.request_url(&query)?;
            if cache.invalidate(url.as_str()).await? {
                println!("Invalidated {}", url);
            } else {
                println!("Nothing cached for {}", url);
            }
        }
    }

    Ok(())
}
