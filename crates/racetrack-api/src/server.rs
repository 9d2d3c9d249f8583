//! HTTP server configuration and request routing.
//!
//! Requests flow through middleware in order:
//! 1. Request ID assignment
//! 2. Tracing span and per-request log line
//! 3. Timeout enforcement, answered with a JSON 408
//! 4. Panic recovery, answered with a JSON 500
//! 5. Handler execution
//!
//! # Graceful Shutdown
//!
//! The server stops accepting connections once its cancellation token fires
//! and then drains in-flight requests. Bounding that drain by a grace period
//! is the caller's job.

use std::{net::SocketAddr, time::Duration};

use axum::{error_handling::HandleErrorLayer, middleware, routing::get, BoxError, Router};
use racetrack_core::RaceService;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower::{timeout::error::Elapsed, ServiceBuilder};
use tower_http::{
    catch_panic::CatchPanicLayer,
    trace::{DefaultOnResponse, TraceLayer},
    LatencyUnit,
};
use tracing::{info, warn, Level};

use crate::{
    error::{panic_response, ApiError},
    handlers,
    middleware::{inject_request_id, request_span},
    readiness::Readiness,
};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Race operations.
    pub races: RaceService,
    /// Flag flipped once the listener is bound.
    pub readiness: Readiness,
}

impl AppState {
    /// Creates application state.
    pub fn new(races: RaceService, readiness: Readiness) -> Self {
        Self { races, readiness }
    }
}

/// Creates the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::{sync::Arc, time::Duration};
///
/// use racetrack_api::{create_router, AppState, Readiness};
/// use racetrack_core::{storage::mock::MockRaceStorage, RaceService};
///
/// let races = RaceService::new(Arc::new(MockRaceStorage::new()));
/// let app = create_router(AppState::new(races, Readiness::new()), Duration::from_secs(15));
/// // Serve the app...
/// ```
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    let health_routes = Router::new().route("/healthz", get(handlers::healthz));

    let race_routes = Router::new().route(
        "/races/{id}",
        get(handlers::get_race)
            .put(handlers::record_checkpoint)
            .post(handlers::create_race)
            .delete(handlers::delete_race),
    );

    Router::new()
        .merge(health_routes)
        .merge(race_routes)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_layer_error))
                .timeout(request_timeout),
        )
        .layer(
            TraceLayer::new_for_http().make_span_with(request_span).on_response(
                DefaultOnResponse::new().level(Level::INFO).latency_unit(LatencyUnit::Millis),
            ),
        )
        .layer(middleware::from_fn(inject_request_id))
        .with_state(state)
}

async fn handle_layer_error(err: BoxError) -> ApiError {
    if err.is::<Elapsed>() {
        ApiError::Timeout
    } else {
        ApiError::Internal(format!("unhandled middleware error: {err}"))
    }
}

/// Serves requests on an already bound listener until `shutdown` fires.
///
/// Marks the service ready before accepting the first connection.
///
/// # Errors
///
/// Returns `std::io::Error` if the listener fails.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    request_timeout: Duration,
    shutdown: CancellationToken,
) -> Result<(), std::io::Error> {
    let local_addr = listener.local_addr()?;
    let app = create_router(state.clone(), request_timeout);

    if state.readiness.mark_ready() {
        info!(addr = %local_addr, "HTTP server listening, service ready");
    }

    axum::serve(listener, app).with_graceful_shutdown(shutdown.cancelled_owned()).await?;

    info!("HTTP server stopped gracefully");
    Ok(())
}

/// Binds `addr` and serves requests until `shutdown` fires.
///
/// # Errors
///
/// Returns `std::io::Error` if:
/// - Port is already in use
/// - Network interface unavailable
pub async fn start_server(
    state: AppState,
    addr: SocketAddr,
    request_timeout: Duration,
    shutdown: CancellationToken,
) -> Result<(), std::io::Error> {
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    serve(listener, state, request_timeout, shutdown).await
}

/// Waits for shutdown signal (CTRL+C or SIGTERM).
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received CTRL+C, starting graceful shutdown");
        },
        () = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        },
    }

    warn!("Waiting for in-flight requests to complete");
}
