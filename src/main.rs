//! Racetrack captured-checkpoint service.
//!
//! Main entry point. Loads `.env` and configuration, connects to the store,
//! ensures the unique race index, then serves HTTP until interrupted.

use std::{str::FromStr, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use racetrack_api::{
    config::{load_env_file, usage, ENV_FILE},
    error::install_panic_hook,
    serve, shutdown_signal, AppState, Config, Readiness,
};
use racetrack_core::{RaceService, RaceStorage, Storage};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Tracks the checkpoints captured during each race.
#[derive(Debug, Parser)]
#[command(name = "racetrack", version, about, after_help = usage())]
struct Cli {}

#[tokio::main]
async fn main() -> Result<()> {
    let _cli = Cli::parse();

    let env_file_loaded = load_env_file(ENV_FILE)?;
    let config = Config::load()?;
    init_tracing(&config)?;
    install_panic_hook();

    if env_file_loaded {
        info!(path = ENV_FILE, "Loaded environment file");
    }

    info!(
        database_url = %config.database_url_masked(),
        database_name = %config.database_name,
        port = config.port,
        "Configuration loaded"
    );

    let pool = create_database_pool(&config).await?;
    let storage = Storage::new(pool.clone());
    storage.health_check().await.context("Failed to verify database connection")?;
    info!("Database connection pool established");

    storage.ensure_unique_index().await.context("Failed to ensure unique index on races")?;
    info!("Race index ensured");

    let addr = config.parse_server_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    let state = AppState::new(RaceService::new(Arc::new(storage)), Readiness::new());
    let shutdown = CancellationToken::new();
    let mut server =
        tokio::spawn(serve(listener, state, config.request_timeout(), shutdown.clone()));

    tokio::select! {
        () = shutdown_signal() => {},
        result = &mut server => {
            pool.close().await;
            return match result {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(e).context("HTTP server failed"),
                Err(e) => Err(e).context("HTTP server task aborted"),
            };
        },
    }

    shutdown.cancel();
    match tokio::time::timeout(config.graceful_timeout(), &mut server).await {
        Ok(Ok(Ok(()))) => info!("Server stopped"),
        Ok(Ok(Err(e))) => error!(error = %e, "Server failed during shutdown"),
        Ok(Err(e)) => error!(error = %e, "Server task aborted during shutdown"),
        Err(_) => {
            warn!(grace_secs = config.graceful_secs, "Shutdown grace period expired");
            server.abort();
        },
    }

    pool.close().await;
    info!("Database connections closed");

    info!("Racetrack shutdown complete");
    Ok(())
}

/// Initializes tracing. `RUST_LOG` wins over the configured level when set.
fn init_tracing(config: &Config) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::default().add_directive(config.level_filter()?.into()),
    };

    let fmt_layer = fmt::layer().with_target(true).with_thread_ids(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).try_init()?;
    Ok(())
}

/// Creates the database connection pool. Unreachable stores are fatal.
async fn create_database_pool(config: &Config) -> Result<sqlx::PgPool> {
    let options = PgConnectOptions::from_str(&config.database_url)
        .context("Invalid database URL")?
        .database(&config.database_name);

    PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
        .context("Failed to connect to database")
}
