// Moderation service trait and the shapes it exchanges with callers.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// One classification entry as returned by the upstream service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModerationResult {
    pub flagged: bool,
    /// Category name (e.g. `hate/threatening`) to whether it was triggered.
    #[serde(default)]
    pub categories: BTreeMap<String, bool>,
    /// Category name to model confidence, 0.0 to 1.0.
    #[serde(default)]
    pub category_scores: BTreeMap<String, f64>,
}

/// Why a call to the moderation service failed.
///
/// The variants are the only distinction the gateway cares about when
/// choosing an outbound status code.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The service answered, but with a non-success HTTP status.
    #[error("moderation API returned status {status}: {body}")]
    Api { status: u16, body: String },

    /// The service could not be reached (connect failure, reset, timeout).
    #[error("moderation API unreachable: {reason}")]
    Transport { reason: String },

    /// Anything else, e.g. a response body that could not be decoded.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Trait for classifying text. Implementations are async because the real
/// provider is an HTTP API.
#[async_trait]
pub trait ModerationService: Send + Sync {
    /// Classify `input` with the given model, returning one result per input.
    async fn classify(
        &self,
        model: &str,
        input: &str,
    ) -> Result<Vec<ModerationResult>, UpstreamError>;
}
