//! Map layer catalog and NSPD search API service.
//!
//! Serves the layer catalog (store + static files + NSPD virtual layers),
//! resolves layer data by composite id, and proxies thematic search to the
//! NSPD geoportal with caching, retries, and graceful degradation.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use layers_api::catalog::LayerCatalog;
use layers_api::handlers;
use layers_api::state::AppState;
use layers_api::store::MemoryLayerStore;
use nspd_client::{NspdClient, NspdConfig};

#[derive(Parser, Debug)]
#[command(name = "layers-api")]
#[command(about = "Map layer catalog and NSPD thematic-search API")]
struct Args {
    /// Address to bind the HTTP server to
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8000")]
    bind: String,

    /// Candidate directories scanned for static *.geojson layers
    /// (first existing directory wins)
    #[arg(
        long = "static-dir",
        env = "STATIC_LAYER_DIRS",
        value_delimiter = ',',
        default_values = ["static/layers", "/app/static/layers"]
    )]
    static_dirs: Vec<PathBuf>,

    /// NSPD thematic-search endpoint
    #[arg(
        long,
        env = "NSPD_BASE_URL",
        default_value = "https://nspd.gov.ru/api/geoportal/v2/search/geoportal"
    )]
    nspd_base_url: String,

    /// Maximum results requested per thematic search
    #[arg(long, env = "NSPD_SEARCH_LIMIT", default_value = "200")]
    nspd_search_limit: u32,

    /// TTL in seconds for cached non-search upstream responses
    #[arg(long, env = "NSPD_CACHE_TTL_SECS", default_value = "3600")]
    nspd_cache_ttl_secs: u64,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting layers-api");

    let metrics = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install metrics recorder")?;

    let nspd_config = NspdConfig {
        base_url: args.nspd_base_url,
        search_limit: args.nspd_search_limit,
        cache_ttl: Duration::from_secs(args.nspd_cache_ttl_secs),
        ..NspdConfig::default()
    };
    let nspd = Arc::new(NspdClient::new(nspd_config).context("Failed to build NSPD client")?);

    let store = Arc::new(MemoryLayerStore::new());
    let catalog = Arc::new(LayerCatalog::new(store, nspd, args.static_dirs));

    let state = AppState::new(catalog, metrics);
    let app = handlers::router(state);

    let listener = tokio::net::TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;

    info!(addr = %args.bind, "layers-api listening");
    axum::serve(listener, app).await?;

    Ok(())
}
