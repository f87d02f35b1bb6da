use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aat_reconcile::server::{create_router, AppState};
use aat_reconcile::{Config, ReconcileEngine};

#[derive(Parser)]
#[command(name = "reconcile-server")]
#[command(about = "OpenRefine reconciliation service for the Getty AAT", long_about = None)]
struct Args {
    /// Log at debug level (upstream URLs, per-candidate scores)
    #[arg(short, long)]
    debug: bool,

    /// Address to bind (overrides RECONCILE_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides RECONCILE_PORT)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_filter = if args.debug {
        "reconcile_server=debug,aat_reconcile=debug"
    } else {
        "reconcile_server=info,aat_reconcile=info"
    };

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::from_env()?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    tracing::info!("Starting AAT reconciliation service");
    tracing::info!("Cache: {} (ttl {:?})", config.cache_path, config.cache_ttl);
    tracing::info!("Upstream: {}", config.aat_endpoint);

    let engine = ReconcileEngine::from_config(&config).await?;
    let app = create_router(AppState::new(engine));

    let addr = config.bind_addr();
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
