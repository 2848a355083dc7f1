//! mxp-ex (Export) - media metadata export service
//!
//! Serves the export HTTP API over a media snapshot. Startup order:
//! config, tracing, root folder, database (with stale job cleanup), media
//! source, then the HTTP server.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};

use mxp_common::config::{
    default_config_path, load_toml_config, CompiledDefaults, RootFolderInitializer,
    RootFolderResolver, TomlConfig,
};
use mxp_ex::artifacts::LocalArtifactStore;
use mxp_ex::db::{self, jobs};
use mxp_ex::source::JsonSnapshotSource;
use mxp_ex::{build_router, AppState, ExportRunner, RunnerSettings};

/// Command-line arguments for mxp-ex
#[derive(Parser, Debug)]
#[command(name = "mxp-ex")]
#[command(about = "Media metadata export service")]
#[command(version)]
struct Args {
    /// Root folder holding the database and export directory
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// TOML config file (default: ~/.config/mxp/mxp-ex.toml)
    #[arg(short, long, env = "MXP_CONFIG")]
    config: Option<PathBuf>,

    /// JSON media snapshot to export from
    #[arg(short, long, env = "MXP_SNAPSHOT")]
    snapshot: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "MXP_EX_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().or_else(|| default_config_path("mxp-ex"));
    let config = match &config_path {
        Some(path) => load_toml_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => TomlConfig::default(),
    };

    // RUST_LOG wins over the configured level
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .init();

    info!(
        "Starting MXP Export (mxp-ex) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    if let Some(path) = &config_path {
        info!("Config file: {}", path.display());
    }

    let root_folder = RootFolderResolver::new("mxp-ex")
        .with_cli_arg(args.root_folder.clone())
        .with_toml(&config)
        .resolve();
    let initializer = RootFolderInitializer::new(root_folder);
    initializer.ensure_directory_exists()?;
    info!("Root folder: {}", initializer.root_folder().display());

    let db_path = initializer.database_path();
    let pool = match db::init_database_pool(&db_path).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to open database {}: {}", db_path.display(), e);
            return Err(e.into());
        }
    };
    jobs::cleanup_stale_jobs(&pool).await?;

    let snapshot_path = args
        .snapshot
        .clone()
        .or_else(|| config.snapshot_path.clone())
        .context("No media snapshot configured (use --snapshot or snapshot_path)")?;
    let source = JsonSnapshotSource::load(&snapshot_path)
        .with_context(|| format!("Failed to load snapshot {}", snapshot_path.display()))?;
    info!("Media snapshot: {}", snapshot_path.display());

    let export_dir = initializer.export_dir();
    info!("Export directory: {}", export_dir.display());

    let settings = RunnerSettings::from(config.export);
    info!(
        workers = settings.worker_count,
        max_concurrent_jobs = settings.max_concurrent_jobs,
        max_queued_jobs = settings.max_queued_jobs,
        "Export runner configured"
    );
    let runner = ExportRunner::new(
        pool,
        Arc::new(source),
        Arc::new(LocalArtifactStore::new(export_dir)),
        settings,
    );

    let state = AppState::new(runner.clone(), config.export.page_size);
    let app = build_router(state);

    let port = args
        .port
        .or(config.port)
        .unwrap_or_else(|| CompiledDefaults::for_current_platform().port);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("mxp-ex listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Running jobs die with the process; record them as failed now
    match runner.cancel_all_pending().await {
        Ok(0) => {}
        Ok(count) => warn!(count, "Pending exports marked failed at shutdown"),
        Err(e) => error!(error = %e, "Failed to cancel pending exports at shutdown"),
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
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
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
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
