//! Repository for race documents.
//!
//! Each race is one row keyed by its identifier, holding the captured
//! checkpoints as a text array. Uniqueness of `id` is enforced by the
//! `races_id_key` index, which also arbitrates concurrent upserts.

use std::sync::Arc;

use sqlx::PgPool;
use tracing::debug;

use crate::{
    error::{CoreError, Result},
    models::{Checkpoints, Race, RaceId},
};

/// Repository for race database operations.
pub struct Repository {
    pool: Arc<PgPool>,
}

impl Repository {
    /// Creates a new repository instance.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Returns a reference to the database pool.
    pub fn pool(&self) -> Arc<PgPool> {
        self.pool.clone()
    }

    /// Creates the races table and its unique index on `id`.
    ///
    /// # Errors
    ///
    /// Returns error if the DDL cannot be executed.
    pub async fn ensure_unique_index(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS races (
                id TEXT NOT NULL,
                captured_checkpoints TEXT[] NOT NULL DEFAULT '{}'
            )
            ",
        )
        .execute(&*self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE UNIQUE INDEX IF NOT EXISTS races_id_key ON races (id)
            ",
        )
        .execute(&*self.pool)
        .await?;

        debug!("races unique index ensured");
        Ok(())
    }

    /// Finds a race by ID.
    ///
    /// # Errors
    ///
    /// Returns error if query fails.
    pub async fn find_by_id(&self, id: &RaceId) -> Result<Option<Race>> {
        let row: Option<(RaceId, Vec<String>)> = sqlx::query_as(
            r"
            SELECT id, captured_checkpoints
            FROM races
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await?;

        Ok(row.map(|(id, checkpoints)| Race::new(id, Checkpoints::from(checkpoints))))
    }

    /// Inserts the race or replaces the checkpoints of the stored one.
    ///
    /// # Errors
    ///
    /// Returns error if the statement fails.
    pub async fn upsert(&self, race: &Race) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO races (id, captured_checkpoints)
            VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE
            SET captured_checkpoints = EXCLUDED.captured_checkpoints
            ",
        )
        .bind(&race.id)
        .bind(race.checkpoints.as_slice().to_vec())
        .execute(&*self.pool)
        .await?;

        Ok(())
    }

    /// Stores an empty race if the ID is free.
    ///
    /// Returns `true` when a row was inserted.
    ///
    /// # Errors
    ///
    /// Returns error if the statement fails.
    pub async fn insert_if_absent(&self, id: &RaceId) -> Result<bool> {
        let result = sqlx::query(
            r"
            INSERT INTO races (id, captured_checkpoints)
            VALUES ($1, '{}')
            ON CONFLICT (id) DO NOTHING
            ",
        )
        .bind(id)
        .execute(&*self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Deletes a race.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound` if no race has this ID, or a database
    /// error if the delete fails.
    pub async fn delete(&self, id: &RaceId) -> Result<()> {
        let result = sqlx::query(
            r"
            DELETE FROM races
            WHERE id = $1
            ",
        )
        .bind(id)
        .execute(&*self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("race {id}")));
        }

        Ok(())
    }

    /// Counts stored races with the given ID.
    ///
    /// Always 0 or 1 while the unique index is in place.
    ///
    /// # Errors
    ///
    /// Returns error if query fails.
    pub async fn count_by_id(&self, id: &RaceId) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            r"
            SELECT COUNT(*) FROM races WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_one(&*self.pool)
        .await?;

        Ok(count.0)
    }
}
