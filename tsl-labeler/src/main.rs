//! tsl-labeler - Twitch chat sentiment labeling service
//!
//! Loads configuration, opens the configured label store, and serves the
//! labeling UI and JSON API until Ctrl+C / SIGTERM.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tsl_common::config::{
    default_config_path, resolve_data_path, write_toml_config, ConfigResolver, DatasetConfig,
    StoreConfig, TomlConfig,
};
use tsl_common::source::{HuggingFaceFetcher, TextFileFetcher};
use tsl_common::store::{CsvLabelStore, MemoryLabelStore, SheetsLabelStore};
use tsl_common::{AnnotationSession, LabelStore, MessageFetcher};
use tsl_labeler::{build_router, AppState};

/// Command-line arguments for tsl-labeler
#[derive(Parser, Debug)]
#[command(name = "tsl-labeler")]
#[command(about = "Label Twitch chat messages by sentiment")]
#[command(version)]
struct Args {
    /// Config file (overrides TSL_CONFIG and the user config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "TSL_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "TSL_PORT")]
    port: Option<u16>,

    /// Default annotator name
    #[arg(short, long, env = "TSL_LABELER")]
    labeler: Option<String>,

    /// Write labels to this CSV file instead of the configured store
    #[arg(long, conflicts_with = "memory")]
    labels: Option<PathBuf>,

    /// Keep labels in memory only (nothing is persisted)
    #[arg(long)]
    memory: bool,

    /// Write a config file with default values and exit
    #[arg(long)]
    write_default_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.write_default_config {
        let target = args
            .config
            .clone()
            .or_else(default_config_path)
            .context("No config directory available; pass --config")?;
        write_toml_config(&TomlConfig::default(), &target)?;
        println!("Wrote default config to {}", target.display());
        return Ok(());
    }

    let resolver = ConfigResolver::new(args.config.clone());
    let config_path = resolver.resolve_path();
    let mut config = resolver.load()?;
    apply_overrides(&mut config, &args);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{},tower_http=info", config.logging.level))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Build identification first, before any network delays
    info!(
        "Starting Twitch Sentiment Labeler (tsl-labeler) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &config_path {
        Some(path) if path.exists() => info!("Config file: {}", path.display()),
        Some(path) => warn!("Config file {} not found, using defaults", path.display()),
        None => info!("No config file, using defaults"),
    }

    let store = open_store(&config).await?;
    let fetcher = build_fetcher(&config.dataset)?;

    let state = AppState::new(AnnotationSession::new(config.session.target), store, fetcher)
        .with_labeler(config.session.labeler.clone())
        .with_recent_limit(config.session.recent_limit);

    if config.dataset.load_on_startup() {
        let mut source = state.source.write().await;
        match source.load(state.fetcher.as_ref()).await {
            Ok(count) => info!("Loaded {} messages from {}", count, state.fetcher.describe()),
            // Not fatal: the annotator can retry from the UI
            Err(e) => warn!("Initial dataset load failed: {}", e),
        }
    }

    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("tsl-labeler listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Command-line values win over the config file
fn apply_overrides(config: &mut TomlConfig, args: &Args) {
    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(labeler) = &args.labeler {
        config.session.labeler = labeler.clone();
    }
    if let Some(path) = &args.labels {
        config.store = StoreConfig::Csv { path: path.clone() };
    }
    if args.memory {
        config.store = StoreConfig::Memory;
    }
}

async fn open_store(config: &TomlConfig) -> Result<Arc<dyn LabelStore>> {
    let store: Arc<dyn LabelStore> = match &config.store {
        StoreConfig::Csv { path } => {
            let path = resolve_data_path(path);
            let store = CsvLabelStore::open(&path)
                .await
                .with_context(|| format!("Failed to open label file {}", path.display()))?;
            info!("Label store: CSV file {}", path.display());
            Arc::new(store)
        }
        StoreConfig::Sheets {
            endpoint,
            spreadsheet_id,
            sheet_name,
            ..
        } => {
            let token = config.sheets_access_token();
            if token.is_none() {
                warn!("No Sheets access token configured; requests will be unauthenticated");
            }
            let store = SheetsLabelStore::connect(
                endpoint,
                spreadsheet_id.clone(),
                sheet_name.clone(),
                token,
            )
            .await
            .with_context(|| format!("Failed to connect to spreadsheet {}", spreadsheet_id))?;
            info!("Label store: Google Sheets {} ({})", spreadsheet_id, sheet_name);
            Arc::new(store)
        }
        StoreConfig::Memory => {
            warn!("Label store: in-memory, labels are lost on exit");
            Arc::new(MemoryLabelStore::new())
        }
    };
    Ok(store)
}

fn build_fetcher(dataset: &DatasetConfig) -> Result<Arc<dyn MessageFetcher>> {
    let fetcher: Arc<dyn MessageFetcher> = match dataset {
        DatasetConfig::HuggingFace {
            endpoint,
            dataset,
            config,
            split,
            max_rows,
            ..
        } => Arc::new(HuggingFaceFetcher::new(
            endpoint.clone(),
            dataset.clone(),
            config.clone(),
            split.clone(),
            *max_rows,
        )?),
        DatasetConfig::File { path, .. } => Arc::new(TextFileFetcher::new(path.clone())),
    };
    info!("Message source: {}", fetcher.describe());
    Ok(fetcher)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
