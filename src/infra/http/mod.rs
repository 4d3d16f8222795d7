use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::{
        HeaderValue, StatusCode,
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::info;

use stampa_api_types::RenderRequestBody;

use crate::application::{error::AppError, service::RenderService};

#[derive(Clone)]
pub struct HttpState {
    pub render: Arc<RenderService>,
}

pub fn build_router(state: HttpState, body_limit_bytes: usize) -> Router {
    Router::new()
        .route("/api/render", post(generate_pdf))
        .route("/healthz", get(healthz))
        .layer(DefaultBodyLimit::max(body_limit_bytes))
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn generate_pdf(
    State(state): State<HttpState>,
    Json(body): Json<RenderRequestBody>,
) -> Result<Response, AppError> {
    info!(
        target: "stampa::http",
        html_bytes = body.html.len(),
        "render request received"
    );

    let pdf = state.render.generate(&body.html, &body.options).await?;

    let mut response = pdf.into_response();
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/pdf"));
    response.headers_mut().insert(
        CONTENT_DISPOSITION,
        HeaderValue::from_static("attachment; filename=\"generated.pdf\""),
    );
    Ok(response)
}
