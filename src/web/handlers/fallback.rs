// Catch-all for unknown paths and unsupported methods on known paths.

use axum::http::{Method, Uri};

use crate::error::GatewayError;

pub async fn not_found(method: Method, uri: Uri) -> GatewayError {
    GatewayError::NotFound {
        method: method.to_string(),
        path: uri.path().to_string(),
    }
}
