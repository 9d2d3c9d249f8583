//! HTTP request handlers for the racetrack API.
//!
//! Handlers follow one pattern: extract, delegate to the race service, and
//! return `Result<_, ApiError>` so every failure goes through the same error
//! boundary.
//!
//! - `races` - race lookup, creation, checkpoint recording and deletion
//! - `health` - readiness probe

pub mod health;
pub mod races;

pub use health::healthz;
pub use races::{create_race, delete_race, get_race, record_checkpoint};
