// Web server: Axum-based HTTP front for the moderation relay.
//
// Routes:
//   GET  /          health payload
//   GET  /health    health payload
//   POST /moderate  validate text, classify upstream, return verdict
//   anything else   404 in the standard error shape
//
// Layer order, outermost first: request tracing, origin guard, CORS headers,
// body limit. The origin guard sits outside the CORS layer so a disallowed
// origin gets 403 even on preflight.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::extract::{DefaultBodyLimit, Request};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;
use tracing::{info, Level};

use crate::config::Config;
use crate::moderation::traits::ModerationService;

pub mod cors;
pub mod handlers;

/// Largest request body accepted on any route.
pub const BODY_LIMIT_BYTES: usize = 64 * 1024;

/// Shared application state threaded through all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub moderator: Arc<dyn ModerationService>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: Config, moderator: Arc<dyn ModerationService>) -> Self {
        Self {
            config: Arc::new(config),
            moderator,
            started_at: Instant::now(),
        }
    }
}

/// Start the Axum web server and block until it shuts down.
pub async fn run_server(state: AppState, bind: &str) -> Result<()> {
    let addr = format!("{bind}:{}", state.config.port);
    info!(
        allowed_origins = ?state.config.allowed_origins,
        model = %state.config.moderation_model,
        "Moderation gateway listening on http://{addr}"
    );

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Moderation gateway stopped");
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/",
            get(handlers::health::health).fallback(handlers::fallback::not_found),
        )
        .route(
            "/health",
            get(handlers::health::health).fallback(handlers::fallback::not_found),
        )
        .route(
            "/moderate",
            post(handlers::moderate::moderate).fallback(handlers::fallback::not_found),
        )
        .fallback(handlers::fallback::not_found)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(cors::cors_layer(&state.config.allowed_origins))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            cors::enforce_origin,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request| {
                    let origin = request
                        .headers()
                        .get(header::ORIGIN)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("-");
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        path = %request.uri().path(),
                        origin = %origin,
                    )
                })
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Millis),
                ),
        )
        .with_state(state)
}

/// Resolve on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}

/// Typed JSON error response helper.
pub fn api_error(status: StatusCode, kind: &str, message: &str) -> Response {
    (
        status,
        axum::Json(serde_json::json!({ "error": kind, "message": message })),
    )
        .into_response()
}
