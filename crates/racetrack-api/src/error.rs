//! HTTP error boundary.
//!
//! Handlers return `Result<_, ApiError>`; this module turns the error into a
//! status code and a JSON body. Storage details are logged here and never
//! sent to clients. Panics and timeouts raised below the handlers are answered
//! with the same body shape.

use std::{any::Any, backtrace::Backtrace};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use racetrack_core::RaceError;
use serde::Serialize;
use tracing::{error, warn};

/// Error response with code and message.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error details including code and message
    pub error: ErrorDetail,
}

/// Detailed error information.
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Error code from the race error taxonomy
    pub code: String,
    /// Human-readable error description
    pub message: String,
}

/// Errors surfaced by HTTP handlers.
#[derive(Debug)]
pub enum ApiError {
    /// The request body could not be decoded.
    MalformedBody(String),
    /// The race service rejected or failed the operation.
    Race(RaceError),
    /// Request handling exceeded the configured timeout.
    Timeout,
    /// Something went wrong that the client cannot act on.
    Internal(String),
}

impl From<RaceError> for ApiError {
    fn from(err: RaceError) -> Self {
        Self::Race(err)
    }
}

impl ApiError {
    /// HTTP status code for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MalformedBody(_) => StatusCode::BAD_REQUEST,
            Self::Race(RaceError::RaceNotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Timeout => StatusCode::REQUEST_TIMEOUT,
            Self::Race(RaceError::StoreUnavailable(_)) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }

    fn detail(&self) -> ErrorDetail {
        let (code, message) = match self {
            Self::MalformedBody(_) => ("E1001", "Incorrect body"),
            Self::Race(err @ RaceError::RaceNotFound { .. }) => (err.code(), "Race not found"),
            Self::Race(err @ RaceError::StoreUnavailable(_)) => (err.code(), "Database error"),
            Self::Timeout => ("E9001", "Request timed out"),
            Self::Internal(_) => ("E9999", "Internal server error"),
        };
        ErrorDetail { code: code.to_string(), message: message.to_string() }
    }

    fn to_response(&self) -> Response {
        (self.status(), Json(ErrorResponse { error: self.detail() })).into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::MalformedBody(reason) => warn!(reason = %reason, "Rejected request body"),
            Self::Race(RaceError::RaceNotFound { id }) => warn!(race_id = %id, "Race not found"),
            Self::Race(err @ RaceError::StoreUnavailable(source)) => {
                error!(code = err.code(), error = %source, "Store operation failed");
            },
            Self::Timeout => warn!("Request timed out"),
            Self::Internal(reason) => error!(reason = %reason, "Request failed"),
        }

        self.to_response()
    }
}

/// Answers a panic caught during request handling with a generic 500.
///
/// The panic payload is logged; the stack trace is logged by the hook
/// installed with [`install_panic_hook`].
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("non-string panic payload");

    error!(panic = %message, "Request handler panicked");
    ApiError::Internal(message.to_string()).to_response()
}

/// Routes panic reports through `tracing`, with the stack trace of the
/// panicking thread.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        error!(
            panic = %info,
            backtrace = %Backtrace::force_capture(),
            "Panic"
        );
    }));
}

#[cfg(test)]
mod tests {
    use racetrack_core::{CoreError, RaceId};

    use super::*;

    #[test]
    fn statuses_follow_error_taxonomy() {
        assert_eq!(ApiError::MalformedBody("eof".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Timeout.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(
            ApiError::from(RaceError::RaceNotFound { id: RaceId::from("R1") }).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(RaceError::StoreUnavailable(CoreError::Database("down".into())))
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn store_details_are_not_exposed() {
        let err = ApiError::from(RaceError::StoreUnavailable(CoreError::Database(
            "password authentication failed for user root".into(),
        )));

        let detail = err.detail();

        assert_eq!(detail.code, "E3001");
        assert_eq!(detail.message, "Database error");
    }

    #[tokio::test]
    async fn panic_payload_is_not_exposed() {
        let response = panic_response(Box::new(String::from("index out of bounds: secret")));

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"]["code"], "E9999");
        assert_eq!(body["error"]["message"], "Internal server error");
    }
}
