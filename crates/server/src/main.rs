use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use marquee_core::{
    create_report_system, load_config, load_config_from_env, validate_config, Config,
    MovieCatalog, SqliteTrendingStore, TmdbClient, TrendingStore,
};
use marquee_server::api::create_router;
use marquee_server::state::AppState;

/// Default config file, used when `MARQUEE_CONFIG` is unset.
const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// How long to wait for queued search reports on shutdown.
const REPORT_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load()?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Database path: {:?}", config.database.path);
    info!("Search debounce: {}ms", config.search.debounce_ms);

    // Create TMDB client
    let catalog: Arc<dyn MovieCatalog> = Arc::new(
        TmdbClient::new(config.tmdb.clone()).context("Failed to create TMDB client")?,
    );
    info!("TMDB client initialized");

    // Create SQLite trending store
    let trending_store: Arc<dyn TrendingStore> = Arc::new(
        SqliteTrendingStore::new(&config.database.path)
            .context("Failed to create trending store")?,
    );
    info!("Trending store initialized");

    // Create reporting system and spawn the writer task
    let (reporter, report_writer) = create_report_system(
        Arc::clone(&trending_store),
        config.tmdb.image_base_url(),
        config.search.report_buffer,
    );
    let writer_handle = tokio::spawn(report_writer.run());

    // Create app state
    let state = Arc::new(AppState::new(
        config.clone(),
        catalog,
        trending_store,
        Some(reporter),
    ));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // The writer stops once every reporter clone is gone. Sessions on
    // upgraded connections may still hold one, so don't wait forever.
    info!("Server shutting down...");
    match tokio::time::timeout(REPORT_DRAIN_TIMEOUT, writer_handle).await {
        Ok(_) => info!("Report writer stopped"),
        Err(_) => warn!("Report writer did not drain in time"),
    }

    Ok(())
}

/// Load configuration from `MARQUEE_CONFIG`, the default file, or the
/// environment alone when neither exists.
fn load() -> Result<Config> {
    match std::env::var("MARQUEE_CONFIG") {
        Ok(path) => {
            let config_path = PathBuf::from(path);
            info!("Loading configuration from {:?}", config_path);
            load_config(&config_path)
                .with_context(|| format!("Failed to load config from {:?}", config_path))
        }
        Err(_) => {
            let config_path = PathBuf::from(DEFAULT_CONFIG_PATH);
            if config_path.exists() {
                info!("Loading configuration from {:?}", config_path);
                load_config(&config_path)
                    .with_context(|| format!("Failed to load config from {:?}", config_path))
            } else {
                info!("No config file found, using environment only");
                load_config_from_env().context("Failed to load config from environment")
            }
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
