// Request logging tests: capture what the trace layer emits.
//
// A small tracing Layer records every span's and event's fields so the
// tests can check that each request logs method, path, origin, status,
// and latency.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

use moderation_gateway::config::Config;
use moderation_gateway::moderation::traits::{ModerationResult, ModerationService, UpstreamError};
use moderation_gateway::web::{build_router, AppState};

type Fields = BTreeMap<String, String>;

#[derive(Default)]
struct FieldMap(Fields);

impl Visit for FieldMap {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }
}

#[derive(Clone, Default)]
struct Captured {
    spans: Arc<Mutex<Vec<Fields>>>,
    events: Arc<Mutex<Vec<Fields>>>,
}

impl Captured {
    fn span_named_request(&self) -> Fields {
        self.spans
            .lock()
            .unwrap()
            .iter()
            .find(|f| f.contains_key("method") && f.contains_key("path"))
            .cloned()
            .expect("request span recorded")
    }

    fn response_event(&self) -> Fields {
        self.events
            .lock()
            .unwrap()
            .iter()
            .find(|f| f.contains_key("status") && f.contains_key("latency"))
            .cloned()
            .expect("response event recorded")
    }
}

impl<S: Subscriber> Layer<S> for Captured {
    fn on_new_span(&self, attrs: &Attributes<'_>, _id: &Id, _ctx: Context<'_, S>) {
        let mut fields = FieldMap::default();
        attrs.record(&mut fields);
        self.spans.lock().unwrap().push(fields.0);
    }

    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = FieldMap::default();
        event.record(&mut fields);
        self.events.lock().unwrap().push(fields.0);
    }
}

struct CleanModerator;

#[async_trait]
impl ModerationService for CleanModerator {
    async fn classify(
        &self,
        _model: &str,
        _input: &str,
    ) -> Result<Vec<ModerationResult>, UpstreamError> {
        Ok(vec![ModerationResult {
            flagged: false,
            categories: BTreeMap::new(),
            category_scores: BTreeMap::new(),
        }])
    }
}

fn router() -> Router {
    let config = Config::from_lookup(|key| match key {
        "OPENAI_API_KEY" => Some("sk-test".to_string()),
        "ALLOWED_ORIGIN" => Some("https://app.example.com".to_string()),
        _ => None,
    })
    .unwrap();
    build_router(AppState::new(config, Arc::new(CleanModerator)))
}

async fn logged(request: Request<Body>) -> (StatusCode, Captured) {
    let captured = Captured::default();
    let subscriber = tracing_subscriber::registry().with(captured.clone());
    let _guard = tracing::subscriber::set_default(subscriber);

    let response = router().oneshot(request).await.unwrap();
    (response.status(), captured)
}

#[tokio::test]
async fn moderate_request_logs_method_path_origin_status_latency() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/moderate")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::ORIGIN, "https://app.example.com")
        .body(Body::from(r#"{"text": "hello"}"#))
        .unwrap();

    let (status, captured) = logged(request).await;
    assert_eq!(status, StatusCode::OK);

    let span = captured.span_named_request();
    assert_eq!(span["method"], "POST");
    assert_eq!(span["path"], "/moderate");
    assert_eq!(span["origin"], "https://app.example.com");

    let event = captured.response_event();
    assert_eq!(event["status"], "200");
    assert!(event["latency"].ends_with("ms"), "latency: {}", event["latency"]);
}

#[tokio::test]
async fn missing_origin_is_logged_as_dash() {
    let request = Request::builder()
        .method(Method::GET)
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let (status, captured) = logged(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(captured.span_named_request()["origin"], "-");
}

#[tokio::test]
async fn rejected_origin_is_still_logged_with_status() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/moderate")
        .header(header::ORIGIN, "https://evil.example.net")
        .body(Body::from(r#"{"text": "hello"}"#))
        .unwrap();

    let (status, captured) = logged(request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(captured.span_named_request()["origin"], "https://evil.example.net");
    assert_eq!(captured.response_event()["status"], "403");
}
