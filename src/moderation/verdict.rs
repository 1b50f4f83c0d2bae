// Translation from a moderation service outcome to the caller-facing verdict.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{error, warn};

use super::traits::{ModerationResult, UpstreamError};
use crate::error::GatewayError;

/// The normalized `{ flagged, scores, categories }` body returned on success.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModerationVerdict {
    pub flagged: bool,
    pub scores: BTreeMap<String, f64>,
    pub categories: BTreeMap<String, bool>,
}

impl From<ModerationResult> for ModerationVerdict {
    fn from(result: ModerationResult) -> Self {
        Self {
            flagged: result.flagged,
            scores: result.category_scores,
            categories: result.categories,
        }
    }
}

/// Map the outcome of one moderation call onto the outbound taxonomy.
///
/// Only the first result is used. Failures are logged here with full detail
/// since the returned error carries none of it.
pub fn translate(
    outcome: Result<Vec<ModerationResult>, UpstreamError>,
) -> Result<ModerationVerdict, GatewayError> {
    match outcome {
        Ok(results) => match results.into_iter().next() {
            Some(first) => Ok(first.into()),
            None => {
                warn!("Moderation API returned an empty result set");
                Err(GatewayError::EmptyResult)
            }
        },
        Err(err) => {
            match &err {
                UpstreamError::Api { status, body } => {
                    warn!(status = *status, body = %body, "Moderation API returned an error")
                }
                UpstreamError::Transport { reason } => {
                    warn!(reason = %reason, "Moderation API unreachable")
                }
                UpstreamError::Other(e) => {
                    error!(error = ?e, "Unexpected failure calling Moderation API")
                }
            }
            Err(err.into())
        }
    }
}
