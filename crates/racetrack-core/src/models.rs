//! Race domain model and strongly-typed identifiers.
//!
//! Defines the race entity, its ordered checkpoint set, and the payload a
//! client submits when it captures a checkpoint. Includes the database
//! serialization traits for the race identifier.

use std::fmt;

use serde::{Deserialize, Serialize};

type PgDb = sqlx::Postgres;
type PgValueRef<'r> = sqlx::postgres::PgValueRef<'r>;
type PgTypeInfo = sqlx::postgres::PgTypeInfo;
type PgArgumentBuffer = sqlx::postgres::PgArgumentBuffer;
type EncodeResult =
    Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync + 'static>>;
type BoxDynError = sqlx::error::BoxDynError;

/// Strongly-typed race identifier.
///
/// Race identifiers are assigned by clients and never generated here. Once a
/// race is stored its identifier does not change.
///
/// # Example
///
/// ```
/// use racetrack_core::models::RaceId;
/// let race_id = RaceId::from("R1");
/// assert_eq!(race_id.as_str(), "R1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RaceId(pub String);

impl RaceId {
    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RaceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for RaceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl sqlx::Type<PgDb> for RaceId {
    fn type_info() -> PgTypeInfo {
        <String as sqlx::Type<PgDb>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <String as sqlx::Type<PgDb>>::compatible(ty)
    }
}

impl<'r> sqlx::Decode<'r, PgDb> for RaceId {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        let id = <String as sqlx::Decode<PgDb>>::decode(value)?;
        Ok(Self(id))
    }
}

impl sqlx::Encode<'_, PgDb> for RaceId {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> EncodeResult {
        <String as sqlx::Encode<PgDb>>::encode_by_ref(&self.0, buf)
    }
}

/// Ordered set of captured checkpoint identifiers.
///
/// Behaves as a set (a checkpoint appears at most once) while keeping the
/// order in which checkpoints were first captured, so responses are
/// deterministic. Building one from a list drops every repeat after the
/// first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Checkpoints(Vec<String>);

impl Checkpoints {
    /// Creates an empty checkpoint set.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Adds a checkpoint unless it is already present.
    ///
    /// Returns `true` when the set changed.
    pub fn insert(&mut self, checkpoint: impl Into<String>) -> bool {
        let checkpoint = checkpoint.into();
        if self.contains(&checkpoint) {
            return false;
        }
        self.0.push(checkpoint);
        true
    }

    /// Returns whether the checkpoint has been captured.
    pub fn contains(&self, checkpoint: &str) -> bool {
        self.0.iter().any(|existing| existing == checkpoint)
    }

    /// Number of distinct checkpoints.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no checkpoint has been captured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates checkpoints in first-capture order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Checkpoints as a slice, in first-capture order.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for Checkpoints {
    fn from(checkpoints: Vec<String>) -> Self {
        checkpoints.into_iter().collect()
    }
}

impl From<Checkpoints> for Vec<String> {
    fn from(checkpoints: Checkpoints) -> Self {
        checkpoints.0
    }
}

impl FromIterator<String> for Checkpoints {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut checkpoints = Self::new();
        for checkpoint in iter {
            checkpoints.insert(checkpoint);
        }
        checkpoints
    }
}

/// A tracked race and the checkpoints captured so far.
///
/// Serialized as `{"id": "...", "capturedcheckpoints": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Race {
    /// Client-assigned race identifier.
    pub id: RaceId,
    /// Captured checkpoints in first-capture order.
    #[serde(rename = "capturedcheckpoints")]
    pub checkpoints: Checkpoints,
}

impl Race {
    /// Creates a race with the given checkpoints.
    pub fn new(id: RaceId, checkpoints: Checkpoints) -> Self {
        Self { id, checkpoints }
    }

    /// Empty race standing in for an identifier that is not stored.
    ///
    /// Building a placeholder never touches storage.
    pub fn placeholder(id: RaceId) -> Self {
        Self { id, checkpoints: Checkpoints::new() }
    }

    /// Records a captured checkpoint. Returns `true` if it was new.
    pub fn record(&mut self, checkpoint: impl Into<String>) -> bool {
        self.checkpoints.insert(checkpoint)
    }
}

/// Request payload reporting a single captured checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedCheckpoint {
    /// Identifier of the checkpoint that was captured.
    #[serde(rename = "capturedcheckpoint")]
    pub checkpoint: String,
}
