// POST /moderate: classify a piece of text.
//
// Validates the body, makes exactly one upstream call with the trimmed text,
// and returns the first result as `{ flagged, scores, categories }`. No
// retry: every failure ends the request with a mapped error status.

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::debug;

use crate::error::GatewayError;
use crate::moderation::request::{InputError, ModerationRequest};
use crate::moderation::verdict::{translate, ModerationVerdict};
use crate::web::AppState;

pub async fn moderate(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ModerationVerdict>, GatewayError> {
    let body = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            GatewayError::PayloadTooLarge
        } else {
            debug!(error = %rejection, "Could not read request body");
            GatewayError::BadRequest(InputError::MissingText)
        }
    })?;

    let request = ModerationRequest::from_body(&body)?;

    let outcome = state
        .moderator
        .classify(&state.config.moderation_model, &request.text)
        .await;
    let verdict = translate(outcome)?;

    debug!(
        flagged = verdict.flagged,
        chars = request.text.chars().count(),
        "Moderated text"
    );
    Ok(Json(verdict))
}
