//! Mock storage implementation for testing.
//!
//! Provides deterministic, in-memory storage for testing the race service
//! without database dependencies. Failures can be injected into the next
//! operation or pinned to one kind of operation, and writes are counted so
//! tests can assert on side effects.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use tokio::sync::RwLock;

use super::{RaceStorage, StorageFuture};
use crate::{
    error::CoreError,
    models::{Race, RaceId},
};

/// Storage operation a failure can be pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    /// `ensure_unique_index`
    EnsureUniqueIndex,
    /// `find`
    Find,
    /// `upsert`
    Upsert,
    /// `insert_if_absent`
    InsertIfAbsent,
    /// `delete`
    Delete,
}

/// Mock storage for testing race logic without a database.
///
/// Clones share the same underlying state.
#[derive(Clone, Default)]
pub struct MockRaceStorage {
    races: Arc<RwLock<HashMap<RaceId, Race>>>,
    next_error: Arc<RwLock<Option<String>>>,
    failing_ops: Arc<RwLock<HashMap<StoreOp, String>>>,
    writes: Arc<AtomicUsize>,
}

impl MockRaceStorage {
    /// Creates a new mock storage with empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a race directly, bypassing the write counter.
    pub async fn add_race(&self, race: Race) {
        self.races.write().await.insert(race.id.clone(), race);
    }

    /// Returns the stored race, if any.
    pub async fn stored(&self, id: &RaceId) -> Option<Race> {
        self.races.read().await.get(id).cloned()
    }

    /// Number of stored races.
    pub async fn len(&self) -> usize {
        self.races.read().await.len()
    }

    /// Returns `true` if no race is stored.
    pub async fn is_empty(&self) -> bool {
        self.races.read().await.is_empty()
    }

    /// Number of mutating operations that reached the store.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Makes the next operation fail with a database error.
    pub async fn inject_error(&self, message: impl Into<String>) {
        *self.next_error.write().await = Some(message.into());
    }

    /// Makes every call of `op` fail with a database error until cleared.
    ///
    /// Other operations keep working, so a test can let a lookup succeed and
    /// fail the write that follows it.
    pub async fn fail_on(&self, op: StoreOp, message: impl Into<String>) {
        self.failing_ops.write().await.insert(op, message.into());
    }

    /// Removes all failures registered with [`fail_on`](Self::fail_on).
    pub async fn clear_failures(&self) {
        self.failing_ops.write().await.clear();
    }

    async fn take_error(&self, op: StoreOp) -> Result<(), CoreError> {
        if let Some(message) = self.next_error.write().await.take() {
            return Err(CoreError::Database(message));
        }
        match self.failing_ops.read().await.get(&op) {
            Some(message) => Err(CoreError::Database(message.clone())),
            None => Ok(()),
        }
    }
}

impl RaceStorage for MockRaceStorage {
    fn ensure_unique_index(&self) -> StorageFuture<'_, ()> {
        Box::pin(async move { self.take_error(StoreOp::EnsureUniqueIndex).await })
    }

    fn find<'a>(&'a self, id: &'a RaceId) -> StorageFuture<'a, Option<Race>> {
        Box::pin(async move {
            self.take_error(StoreOp::Find).await?;
            Ok(self.races.read().await.get(id).cloned())
        })
    }

    fn upsert<'a>(&'a self, race: &'a Race) -> StorageFuture<'a, ()> {
        Box::pin(async move {
            self.take_error(StoreOp::Upsert).await?;
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.races.write().await.insert(race.id.clone(), race.clone());
            Ok(())
        })
    }

    fn insert_if_absent<'a>(&'a self, id: &'a RaceId) -> StorageFuture<'a, bool> {
        Box::pin(async move {
            self.take_error(StoreOp::InsertIfAbsent).await?;
            self.writes.fetch_add(1, Ordering::SeqCst);
            let mut races = self.races.write().await;
            if races.contains_key(id) {
                return Ok(false);
            }
            races.insert(id.clone(), Race::placeholder(id.clone()));
            Ok(true)
        })
    }

    fn delete<'a>(&'a self, id: &'a RaceId) -> StorageFuture<'a, ()> {
        Box::pin(async move {
            self.take_error(StoreOp::Delete).await?;
            self.writes.fetch_add(1, Ordering::SeqCst);
            match self.races.write().await.remove(id) {
                Some(_) => Ok(()),
                None => Err(CoreError::NotFound(format!("race {id}"))),
            }
        })
    }
}
