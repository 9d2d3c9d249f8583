//! Race service enforcing idempotent checkpoint recording.
//!
//! Reads never create state: an unknown race is answered with an empty
//! placeholder that is not stored. Recording a checkpoint requires the race
//! to exist already; resubmitting a checkpoint is a no-op rather than an
//! error. Concurrent writers to one race are arbitrated by the store's atomic
//! upsert, so the last writer wins at the document level.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::{
    error::{CoreError, RaceError},
    models::{Race, RaceId},
    storage::RaceStorage,
};

/// Outcome of an explicit race creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// A new, empty race was stored.
    Created(Race),
    /// A race with this ID was already stored and was left untouched.
    Existing(Race),
}

impl CreateOutcome {
    /// The race as stored after the call.
    pub fn race(&self) -> &Race {
        match self {
            Self::Created(race) | Self::Existing(race) => race,
        }
    }

    /// Consumes the outcome, returning the race.
    pub fn into_race(self) -> Race {
        match self {
            Self::Created(race) | Self::Existing(race) => race,
        }
    }
}

/// Race operations on top of a `RaceStorage` implementation.
#[derive(Clone)]
pub struct RaceService {
    storage: Arc<dyn RaceStorage>,
}

impl RaceService {
    /// Creates a service over the given storage.
    pub fn new(storage: Arc<dyn RaceStorage>) -> Self {
        Self { storage }
    }

    /// Returns the stored race, or an unstored empty placeholder.
    ///
    /// # Errors
    ///
    /// Returns `RaceError::StoreUnavailable` if the lookup fails.
    #[instrument(name = "get_race", skip(self, id), fields(race_id = %id))]
    pub async fn get_or_placeholder(&self, id: &RaceId) -> Result<Race, RaceError> {
        match self.storage.find(id).await? {
            Some(race) => Ok(race),
            None => {
                debug!("race not stored, answering with placeholder");
                Ok(Race::placeholder(id.clone()))
            },
        }
    }

    /// Stores an empty race unless one already exists.
    ///
    /// A second creation for the same ID never produces a second stored race;
    /// it reports the existing one.
    ///
    /// # Errors
    ///
    /// Returns `RaceError::StoreUnavailable` on storage failure.
    #[instrument(name = "create_race", skip(self, id), fields(race_id = %id))]
    pub async fn create_race(&self, id: &RaceId) -> Result<CreateOutcome, RaceError> {
        let created = self.storage.insert_if_absent(id).await?;

        // A concurrent delete can remove the race between the two calls.
        let race =
            self.storage.find(id).await?.unwrap_or_else(|| Race::placeholder(id.clone()));

        if created {
            info!("race created");
            Ok(CreateOutcome::Created(race))
        } else {
            debug!("race already exists");
            Ok(CreateOutcome::Existing(race))
        }
    }

    /// Adds a checkpoint to an existing race and returns the updated race.
    ///
    /// Any string is a valid checkpoint, the empty string included. Recording
    /// a checkpoint that is already present still succeeds and returns the
    /// unchanged race.
    ///
    /// # Errors
    ///
    /// - `RaceError::RaceNotFound` if the race is not stored.
    /// - `RaceError::StoreUnavailable` on storage failure.
    #[instrument(name = "record_checkpoint", skip(self, id), fields(race_id = %id))]
    pub async fn record_checkpoint(
        &self,
        id: &RaceId,
        checkpoint: &str,
    ) -> Result<Race, RaceError> {
        let Some(mut race) = self.storage.find(id).await? else {
            warn!("checkpoint reported for unknown race");
            return Err(RaceError::RaceNotFound { id: id.clone() });
        };

        if !race.record(checkpoint) {
            debug!(checkpoint, "checkpoint already captured");
        }

        self.storage.upsert(&race).await?;

        info!(checkpoint, total = race.checkpoints.len(), "checkpoint recorded");
        Ok(race)
    }

    /// Removes a race and all of its checkpoints.
    ///
    /// # Errors
    ///
    /// Returns `RaceError::RaceNotFound` if the race is not stored, or
    /// `RaceError::StoreUnavailable` on storage failure.
    #[instrument(name = "delete_race", skip(self, id), fields(race_id = %id))]
    pub async fn delete_race(&self, id: &RaceId) -> Result<(), RaceError> {
        match self.storage.delete(id).await {
            Ok(()) => {
                info!("race deleted");
                Ok(())
            },
            Err(CoreError::NotFound(_)) => Err(RaceError::RaceNotFound { id: id.clone() }),
            Err(e) => Err(RaceError::StoreUnavailable(e)),
        }
    }
}
