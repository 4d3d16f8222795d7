use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use metrics::{counter, histogram};
use tracing::{info, warn};

use stampa_api_types::RenderOptions;

use crate::application::engine::RenderEngine;
use crate::application::error::AppError;
use crate::application::invoker;
use crate::domain;

/// Orchestrates one render: validate markup, normalize the option bag, then
/// hand the strict directives to the invoker.
pub struct RenderService {
    engine: Arc<dyn RenderEngine>,
}

impl RenderService {
    pub fn new(engine: Arc<dyn RenderEngine>) -> Self {
        Self { engine }
    }

    /// Produce a PDF for `html`. Markup is validated before any engine
    /// session is acquired.
    pub async fn generate(&self, html: &str, options: &RenderOptions) -> Result<Bytes, AppError> {
        if html.trim().is_empty() {
            return Err(AppError::MissingHtml);
        }

        let directives = domain::normalize(options)?;

        counter!("stampa_render_total").increment(1);
        let started = Instant::now();
        let result = invoker::render(self.engine.as_ref(), html, &directives).await;
        histogram!("stampa_render_duration_ms").record(started.elapsed().as_secs_f64() * 1_000.0);

        match result {
            Ok(bytes) => {
                info!(
                    target: "stampa::render",
                    bytes = bytes.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "render completed"
                );
                Ok(bytes)
            }
            Err(err) => {
                counter!("stampa_render_failure_total").increment(1);
                warn!(target: "stampa::render", error = %err, "render failed");
                Err(AppError::from(err))
            }
        }
    }
}
