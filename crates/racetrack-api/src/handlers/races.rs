//! Race resource handlers.
//!
//! Race bodies are pretty-printed JSON of the form
//! `{"id": "...", "capturedcheckpoints": [...]}`.

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use racetrack_core::{CapturedCheckpoint, CreateOutcome, Race, RaceId};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::{error::ApiError, AppState};

/// JSON response rendered with indentation.
#[derive(Debug)]
pub struct PrettyJson<T>(pub T);

impl<T: Serialize> IntoResponse for PrettyJson<T> {
    fn into_response(self) -> Response {
        match serde_json::to_vec_pretty(&self.0) {
            Ok(body) => (
                [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
                body,
            )
                .into_response(),
            Err(e) => ApiError::Internal(format!("failed to serialize response: {e}")).into_response(),
        }
    }
}

/// Returns the race, or an empty placeholder if it is not stored.
///
/// # Errors
///
/// - 500: Store unavailable
#[instrument(name = "http_get_race", skip(state))]
pub async fn get_race(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<PrettyJson<Race>, ApiError> {
    let race = state.races.get_or_placeholder(&RaceId::from(id)).await?;
    Ok(PrettyJson(race))
}

/// Creates an empty race.
///
/// This is the creation step that [`record_checkpoint`] presupposes: PUT only
/// records on a race that is already stored. Responds 201 when the race was
/// stored by this call and 200 with the existing race otherwise; an existing
/// race is never reset.
///
/// # Errors
///
/// - 500: Store unavailable
#[instrument(name = "http_create_race", skip(state))]
pub async fn create_race(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(StatusCode, PrettyJson<Race>), ApiError> {
    let outcome = state.races.create_race(&RaceId::from(id)).await?;
    let status = match outcome {
        CreateOutcome::Created(_) => StatusCode::CREATED,
        CreateOutcome::Existing(_) => StatusCode::OK,
    };
    Ok((status, PrettyJson(outcome.into_race())))
}

/// Records a captured checkpoint on an existing race.
///
/// Races are created with [`create_race`].
///
/// # Errors
///
/// - 400: Body is not `{"capturedcheckpoint": "<id>"}`
/// - 404: Race not found
/// - 500: Store unavailable
#[instrument(name = "http_record_checkpoint", skip(state, body))]
pub async fn record_checkpoint(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<PrettyJson<Race>, ApiError> {
    let captured: CapturedCheckpoint =
        serde_json::from_slice(&body).map_err(|e| ApiError::MalformedBody(e.to_string()))?;
    debug!(checkpoint = %captured.checkpoint, "Decoded captured checkpoint");

    let race = state.races.record_checkpoint(&RaceId::from(id), &captured.checkpoint).await?;
    Ok(PrettyJson(race))
}

/// Deletes a race.
///
/// # Errors
///
/// - 404: Race not found
/// - 500: Store unavailable
#[instrument(name = "http_delete_race", skip(state))]
pub async fn delete_race(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.races.delete_race(&RaceId::from(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pretty_json_is_indented() {
        let response = PrettyJson(Race::placeholder(RaceId::from("R1"))).into_response();

        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(
            std::str::from_utf8(&body).unwrap(),
            "{\n  \"id\": \"R1\",\n  \"capturedcheckpoints\": []\n}"
        );
    }
}
