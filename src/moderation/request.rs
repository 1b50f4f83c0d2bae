// Inbound request validation for POST /moderate.
//
// Checks run in order and the first failure wins:
//   1. `text` present and a string
//   2. trimmed `text` not empty
//   3. trimmed `text` at most MAX_TEXT_CHARS characters

use serde_json::Value;
use thiserror::Error;

/// Upper bound on the trimmed input, counted in characters.
pub const MAX_TEXT_CHARS: usize = 5_000;

/// A validated moderation request. `text` is already trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModerationRequest {
    pub text: String,
}

/// Validation failure. The Display text is what the caller sees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Request body must include a non-empty 'text' string.")]
    MissingText,
    #[error("'text' must not be blank.")]
    BlankText,
    #[error("'text' must not exceed 5,000 characters.")]
    TooLong,
}

impl ModerationRequest {
    /// Validate a raw request body.
    ///
    /// Bodies that are not JSON objects are treated the same as a body
    /// without `text`.
    pub fn from_body(body: &[u8]) -> Result<Self, InputError> {
        let value: Value = serde_json::from_slice(body).map_err(|_| InputError::MissingText)?;
        Self::from_value(&value)
    }

    /// Validate an already-parsed JSON body.
    pub fn from_value(body: &Value) -> Result<Self, InputError> {
        let raw = body
            .get("text")
            .and_then(Value::as_str)
            .ok_or(InputError::MissingText)?;

        let text = raw.trim();
        if text.is_empty() {
            return Err(InputError::BlankText);
        }
        if text.chars().count() > MAX_TEXT_CHARS {
            return Err(InputError::TooLong);
        }

        Ok(Self {
            text: text.to_string(),
        })
    }
}
