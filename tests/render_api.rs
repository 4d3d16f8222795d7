use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use bytes::Bytes;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use stampa::application::engine::{EngineSession, RenderEngine, RenderError};
use stampa::application::service::RenderService;
use stampa::domain::{PaperFormat, RenderDirectives};
use stampa::infra::http::{HttpState, build_router};

const BODY_LIMIT: usize = 10 * 1024 * 1024;

#[derive(Default)]
struct StubEngine {
    acquires: AtomicUsize,
    fail_render: bool,
    captured: Arc<Mutex<Option<RenderDirectives>>>,
}

#[async_trait]
impl RenderEngine for StubEngine {
    async fn acquire(&self) -> Result<Box<dyn EngineSession>, RenderError> {
        self.acquires.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(StubSession {
            fail_render: self.fail_render,
            captured: self.captured.clone(),
        }))
    }
}

struct StubSession {
    fail_render: bool,
    captured: Arc<Mutex<Option<RenderDirectives>>>,
}

#[async_trait]
impl EngineSession for StubSession {
    async fn load(&mut self, _html: &str, _budget: Duration) -> Result<(), RenderError> {
        Ok(())
    }

    async fn await_fonts(&mut self, _budget: Duration) -> Result<(), RenderError> {
        Ok(())
    }

    async fn render(&mut self, directives: &RenderDirectives) -> Result<Bytes, RenderError> {
        *self.captured.lock().unwrap() = Some(directives.clone());
        if self.fail_render {
            return Err(RenderError::render("tab crashed"));
        }
        Ok(Bytes::from_static(b"%PDF-1.7 stub"))
    }

    async fn close(&mut self) {}
}

fn app(engine: Arc<StubEngine>) -> Router {
    let state = HttpState {
        render: Arc::new(RenderService::new(engine)),
    };
    build_router(state, BODY_LIMIT)
}

fn render_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/render")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

#[tokio::test]
async fn missing_html_yields_bad_request_without_touching_engine() {
    let engine = Arc::new(StubEngine::default());
    let response = app(engine.clone())
        .oneshot(render_request(json!({ "html": "   " })))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response.into_body().collect().await.expect("body").to_bytes();
    let payload: Value = serde_json::from_slice(&body).expect("json");
    assert_eq!(payload["error"], "HTML content is required");
    assert_eq!(engine.acquires.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_options_render_with_injected_defaults() {
    let engine = Arc::new(StubEngine::default());
    let response = app(engine.clone())
        .oneshot(render_request(json!({ "html": "<h1>Hi</h1>" })))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/pdf"
    );
    assert_eq!(
        response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=\"generated.pdf\""
    );

    let body = response.into_body().collect().await.expect("body").to_bytes();
    assert!(body.starts_with(b"%PDF"));

    let captured = engine.captured.lock().unwrap().clone().expect("directives");
    assert_eq!(captured.format, Some(PaperFormat::A4));
    assert_eq!(captured.scale, 1.0);
    assert_eq!(captured.margin, None);
    assert!(!captured.landscape);
}

#[tokio::test]
async fn custom_dimensions_suppress_the_default_format() {
    let engine = Arc::new(StubEngine::default());
    let response = app(engine.clone())
        .oneshot(render_request(json!({
            "html": "<p>ticket</p>",
            "options": { "width": "80mm", "height": "200mm" }
        })))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let captured = engine.captured.lock().unwrap().clone().expect("directives");
    assert_eq!(captured.format, None);
    assert_eq!(captured.width.as_deref(), Some("80mm"));
    assert_eq!(captured.height.as_deref(), Some("200mm"));
}

#[tokio::test]
async fn invalid_scale_yields_bad_request() {
    let engine = Arc::new(StubEngine::default());
    let response = app(engine.clone())
        .oneshot(render_request(json!({
            "html": "<h1>Hi</h1>",
            "options": { "scale": 5.0 }
        })))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response.into_body().collect().await.expect("body").to_bytes();
    let payload: Value = serde_json::from_slice(&body).expect("json");
    assert_eq!(payload["error"], "Invalid rendering options");
    assert_eq!(engine.acquires.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn engine_failure_yields_masked_server_error() {
    let engine = Arc::new(StubEngine {
        fail_render: true,
        ..StubEngine::default()
    });
    let response = app(engine.clone())
        .oneshot(render_request(json!({ "html": "<h1>Hi</h1>" })))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.into_body().collect().await.expect("body").to_bytes();
    let payload: Value = serde_json::from_slice(&body).expect("json");
    assert_eq!(payload["error"], "Failed to generate PDF");
    assert!(payload["details"].as_str().unwrap().contains("tab crashed"));
}

#[tokio::test]
async fn health_endpoint_answers_no_content() {
    let engine = Arc::new(StubEngine::default());
    let response = app(engine)
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/healthz")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
