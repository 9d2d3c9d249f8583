//! Racetrack HTTP API.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod readiness;
pub mod server;

pub use config::Config;
pub use error::ApiError;
pub use readiness::Readiness;
pub use server::{create_router, serve, shutdown_signal, start_server, AppState};
