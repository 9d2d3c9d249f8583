//! Process-wide readiness flag for orchestration probes.
//!
//! Written once, after the listener is bound, and read by every health check.
//! A single atomic is enough: there is one writer and the flag never goes back
//! to false.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Shared handle to the readiness flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct Readiness {
    ready: Arc<AtomicBool>,
}

impl Readiness {
    /// Creates a flag in the not-ready state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the process ready to serve traffic.
    ///
    /// Returns `true` on the call that flipped the flag.
    pub fn mark_ready(&self) -> bool {
        !self.ready.swap(true, Ordering::AcqRel)
    }

    /// Returns whether the process is ready.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}
