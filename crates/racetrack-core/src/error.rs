//! Error types and result handling for race operations.
//!
//! Two layers: `CoreError` is what the storage adapter reports, `RaceError`
//! is the taxonomy the race service exposes to callers, with stable codes the
//! HTTP layer maps onto status codes. Malformed request bodies never reach the
//! service; the HTTP layer rejects them with `E1001`.

use thiserror::Error;

use crate::models::RaceId;

/// Result type alias using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error type for storage operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// Entity not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Constraint violation.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

impl From<sqlx::Error> for CoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound("requested race not found".to_string()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Self::ConstraintViolation(format!("unique constraint violation: {db_err}"))
            },
            sqlx::Error::Database(db_err) if db_err.is_check_violation() => {
                Self::ConstraintViolation(format!("check constraint violation: {db_err}"))
            },
            _ => Self::Database(err.to_string()),
        }
    }
}

/// Race service error types with codes.
#[derive(Debug, Error)]
pub enum RaceError {
    /// The race is not stored (E1002).
    #[error("[E1002] Race not found: {id}")]
    RaceNotFound {
        /// The race ID that was not found
        id: RaceId,
    },

    /// Underlying storage failed (E3001).
    #[error("[E3001] Store unavailable: {0}")]
    StoreUnavailable(#[source] CoreError),
}

impl RaceError {
    /// Returns the error code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::RaceNotFound { .. } => "E1002",
            Self::StoreUnavailable(_) => "E3001",
        }
    }

    /// Returns whether the caller may reasonably retry the request.
    ///
    /// The service itself never retries.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

impl From<CoreError> for RaceError {
    fn from(err: CoreError) -> Self {
        Self::StoreUnavailable(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(RaceError::RaceNotFound { id: RaceId::from("R1") }.code(), "E1002");
        assert_eq!(
            RaceError::StoreUnavailable(CoreError::Database("down".into())).code(),
            "E3001"
        );
    }

    #[test]
    fn only_store_failures_are_retryable() {
        assert!(!RaceError::RaceNotFound { id: RaceId::from("R1") }.is_retryable());
        assert!(RaceError::StoreUnavailable(CoreError::Database("down".into())).is_retryable());
    }

    #[test]
    fn core_errors_classify_as_store_unavailable() {
        let err: RaceError = CoreError::ConstraintViolation("dup".into()).into();

        assert!(matches!(err, RaceError::StoreUnavailable(CoreError::ConstraintViolation(_))));
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err: CoreError = sqlx::Error::RowNotFound.into();

        assert!(matches!(err, CoreError::NotFound(_)));
    }
}
