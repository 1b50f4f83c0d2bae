// Outbound error taxonomy.
//
// Every failure a caller can observe is one of these variants. Each renders
// as `{ "error": <kind>, "message": <message> }`; upstream detail never
// reaches the response body, only the server log.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::moderation::request::InputError;
use crate::moderation::traits::UpstreamError;
use crate::web::{api_error, BODY_LIMIT_BYTES};
use crate::web::cors::OriginRejected;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    BadRequest(#[from] InputError),

    #[error(transparent)]
    Forbidden(#[from] OriginRejected),

    #[error("Route {method} {path} does not exist.")]
    NotFound { method: String, path: String },

    #[error("Request body must not exceed {} KB.", BODY_LIMIT_BYTES / 1024)]
    PayloadTooLarge,

    #[error("OpenAI returned an empty moderation result. Please try again.")]
    EmptyResult,

    #[error("OpenAI Moderation API returned an error. Please try again.")]
    Upstream,

    #[error("Could not reach OpenAI. Please try again shortly.")]
    GatewayTimeout,

    #[error("Something went wrong. Please try again.")]
    Internal,
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::EmptyResult | Self::Upstream => StatusCode::BAD_GATEWAY,
            Self::GatewayTimeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label sent as the `error` field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "Bad Request",
            Self::Forbidden(_) => "Forbidden",
            Self::NotFound { .. } => "Not Found",
            Self::PayloadTooLarge => "Payload Too Large",
            Self::EmptyResult | Self::Upstream => "Upstream Error",
            Self::GatewayTimeout => "Gateway Timeout",
            Self::Internal => "Internal Server Error",
        }
    }
}

impl From<UpstreamError> for GatewayError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Api { .. } => Self::Upstream,
            UpstreamError::Transport { .. } => Self::GatewayTimeout,
            UpstreamError::Other(_) => Self::Internal,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        api_error(self.status(), self.kind(), &self.to_string())
    }
}
