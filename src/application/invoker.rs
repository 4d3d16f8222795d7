//! Drives a single rendering engine session from acquisition to PDF bytes.

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;
use tokio::time::{Instant, timeout_at};
use tracing::debug;

use crate::application::engine::{EngineSession, RenderEngine, RenderError};
use crate::domain::RenderDirectives;

/// Render `html` with `directives` in a fresh engine session.
///
/// Steps run strictly in sequence: acquire, load, optional font wait,
/// render. The session is closed exactly once on every exit path, including
/// failures and timeout expiry. The invoker performs no retries.
pub async fn render(
    engine: &dyn RenderEngine,
    html: &str,
    directives: &RenderDirectives,
) -> Result<Bytes, RenderError> {
    let mut session = engine.acquire().await?;
    let outcome = drive(session.as_mut(), html, directives).await;
    session.close().await;
    outcome
}

async fn drive(
    session: &mut dyn EngineSession,
    html: &str,
    directives: &RenderDirectives,
) -> Result<Bytes, RenderError> {
    let budget = directives.timeout;
    // One deadline covers load, font wait, and the render call itself.
    let deadline = Instant::now() + budget;

    bounded(deadline, budget, session.load(html, budget)).await?;

    if directives.wait_for_fonts {
        bounded(deadline, budget, session.await_fonts(budget)).await?;
    }

    let bytes = bounded(deadline, budget, session.render(directives)).await?;
    debug!(target: "stampa::invoker", bytes = bytes.len(), "render produced document");
    Ok(bytes)
}

async fn bounded<T>(
    deadline: Instant,
    budget: Duration,
    step: impl Future<Output = Result<T, RenderError>>,
) -> Result<T, RenderError> {
    match timeout_at(deadline, step).await {
        Ok(result) => result,
        Err(_) => Err(RenderError::Timeout(budget.as_millis() as u64)),
    }
}
