//! Core domain model, race service and storage adapter.
//!
//! Provides the race entity with its idempotent checkpoint set, the error
//! taxonomy shared with the HTTP layer, and the storage seam with both a
//! PostgreSQL implementation and an in-memory one for tests.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod models;
pub mod service;
pub mod storage;

pub use error::{CoreError, RaceError, Result};
pub use models::{CapturedCheckpoint, Checkpoints, Race, RaceId};
pub use service::{CreateOutcome, RaceService};
pub use storage::{RaceStorage, Storage};
