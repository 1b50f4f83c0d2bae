// Origin allow-list enforcement.
//
// Two pieces cooperate:
//   - `enforce_origin` rejects requests whose Origin is not on the list
//     with 403. Requests without an Origin header (curl, server-to-server)
//     pass untouched.
//   - `cors_layer` adds the Access-Control-* response headers for allowed
//     origins and answers preflight requests.

use axum::extract::{Request, State};
use axum::http::request::Parts;
use axum::http::{header, HeaderValue, Method};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

use super::AppState;
use crate::error::GatewayError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OriginRejected {
    #[error("Origin header is malformed.")]
    Malformed,
    #[error("Origin '{origin}' is not allowed by CORS policy.")]
    NotAllowed { origin: String },
}

/// Check an Origin header against the allow-list.
///
/// Matching is exact: browsers always send scheme, host, and non-default
/// port, and the allow-list is stored without trailing slashes.
pub fn validate_origin(
    origin_header: Option<&HeaderValue>,
    allowed: &[String],
) -> Result<(), OriginRejected> {
    let Some(value) = origin_header else {
        return Ok(());
    };

    let origin = value.to_str().map_err(|_| OriginRejected::Malformed)?;
    if origin.is_empty() {
        return Err(OriginRejected::Malformed);
    }

    if allowed.iter().any(|a| a == origin) {
        Ok(())
    } else {
        Err(OriginRejected::NotAllowed {
            origin: origin.to_string(),
        })
    }
}

/// Middleware: reject disallowed origins before any handler runs.
pub async fn enforce_origin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let origin = request.headers().get(header::ORIGIN);
    match validate_origin(origin, &state.config.allowed_origins) {
        Ok(()) => next.run(request).await,
        Err(rejection) => {
            warn!(reason = %rejection, "Rejected cross-origin request");
            GatewayError::from(rejection).into_response()
        }
    }
}

/// Response-header side of the policy: GET/POST/OPTIONS with Content-Type.
pub fn cors_layer(allowed: &[String]) -> CorsLayer {
    let allowed = allowed.to_vec();
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &Parts| {
                origin
                    .to_str()
                    .map(|o| allowed.iter().any(|a| a == o))
                    .unwrap_or(false)
            },
        ))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}
