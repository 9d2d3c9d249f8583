//! Storage adapter translating race operations into persistent-store calls.
//!
//! The `RaceStorage` trait is the seam between the race service and the
//! store. Production code uses [`Storage`], a PostgreSQL-backed repository
//! container; tests use [`mock::MockRaceStorage`] to exercise service logic
//! without a database.
//!
//! The adapter owns no business logic and keeps no cache: every read is a
//! fresh lookup against the store.

use std::{future::Future, pin::Pin, sync::Arc};

use sqlx::PgPool;

pub mod mock;
pub mod races;

use crate::{
    error::Result,
    models::{Race, RaceId},
};

/// Boxed future returned by every `RaceStorage` operation.
pub type StorageFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Storage operations required by the race service.
///
/// Implementations must enforce uniqueness of race identifiers and make
/// `upsert` and `insert_if_absent` atomic with respect to that constraint.
pub trait RaceStorage: Send + Sync + 'static {
    /// Creates the race collection and its unique index on `id`.
    ///
    /// Idempotent; safe to run on every startup.
    fn ensure_unique_index(&self) -> StorageFuture<'_, ()>;

    /// Looks up a race by exact identifier.
    fn find<'a>(&'a self, id: &'a RaceId) -> StorageFuture<'a, Option<Race>>;

    /// Inserts the race, or replaces the stored race with the same id.
    fn upsert<'a>(&'a self, race: &'a Race) -> StorageFuture<'a, ()>;

    /// Stores an empty race unless one with this id already exists.
    ///
    /// Returns `true` if a new race was stored.
    fn insert_if_absent<'a>(&'a self, id: &'a RaceId) -> StorageFuture<'a, bool>;

    /// Removes the race.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound` when nothing was stored under `id`.
    fn delete<'a>(&'a self, id: &'a RaceId) -> StorageFuture<'a, ()>;
}

/// Container for all repository instances providing unified database access.
///
/// Repositories share one connection pool. Each query checks a connection
/// out of the pool and returns it when the query completes or fails.
#[derive(Clone)]
pub struct Storage {
    /// Repository for race documents.
    pub races: Arc<races::Repository>,
}

impl Storage {
    /// Creates a new storage instance with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { races: Arc::new(races::Repository::new(Arc::new(pool))) }
    }

    /// Performs a health check on the database connection.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Database` if the connection is unhealthy.
    pub async fn health_check(&self) -> Result<()> {
        let _: (i32,) = sqlx::query_as("SELECT 1").fetch_one(&*self.races.pool()).await?;

        Ok(())
    }
}

impl RaceStorage for Storage {
    fn ensure_unique_index(&self) -> StorageFuture<'_, ()> {
        Box::pin(async move { self.races.ensure_unique_index().await })
    }

    fn find<'a>(&'a self, id: &'a RaceId) -> StorageFuture<'a, Option<Race>> {
        Box::pin(async move { self.races.find_by_id(id).await })
    }

    fn upsert<'a>(&'a self, race: &'a Race) -> StorageFuture<'a, ()> {
        Box::pin(async move { self.races.upsert(race).await })
    }

    fn insert_if_absent<'a>(&'a self, id: &'a RaceId) -> StorageFuture<'a, bool> {
        Box::pin(async move { self.races.insert_if_absent(id).await })
    }

    fn delete<'a>(&'a self, id: &'a RaceId) -> StorageFuture<'a, ()> {
        Box::pin(async move { self.races.delete(id).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn storage_can_be_created() {
        // Actual database testing happens in integration tests
        let pool = sqlx::PgPool::connect_lazy("postgresql://test").unwrap();
        let _storage = Storage::new(pool);
    }
}
