//! Ports describing the rendering engine collaborator.
//!
//! The engine is opaque to the application layer: it hands out isolated
//! sessions that load markup, settle, and print. Adapters live in
//! `infra::engine`; tests drive the invoker with scripted fakes.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::domain::RenderDirectives;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("rendering engine unavailable: {0}")]
    Engine(String),
    #[error("failed to load document: {0}")]
    Load(String),
    #[error("render timed out after {0} ms")]
    Timeout(u64),
    #[error("render failed: {0}")]
    Render(String),
}

impl RenderError {
    pub fn engine(err: impl std::fmt::Display) -> Self {
        Self::Engine(err.to_string())
    }

    pub fn load(err: impl std::fmt::Display) -> Self {
        Self::Load(err.to_string())
    }

    pub fn render(err: impl std::fmt::Display) -> Self {
        Self::Render(err.to_string())
    }
}

#[async_trait]
pub trait RenderEngine: Send + Sync {
    /// Acquire an isolated engine session.
    ///
    /// Each session is exclusively owned by the single request that acquired
    /// it and must be closed by the caller on every exit path.
    async fn acquire(&self) -> Result<Box<dyn EngineSession>, RenderError>;
}

#[async_trait]
pub trait EngineSession: Send {
    /// Load markup into the session and wait until resource activity is
    /// idle. `budget` bounds any internal polling; the invoker additionally
    /// enforces the wall-clock deadline.
    async fn load(&mut self, html: &str, budget: Duration) -> Result<(), RenderError>;

    /// Wait until web-font loading has completed, polling up to `budget`.
    async fn await_fonts(&mut self, budget: Duration) -> Result<(), RenderError>;

    /// Run the paginated render and capture the resulting bytes.
    async fn render(&mut self, directives: &RenderDirectives) -> Result<Bytes, RenderError>;

    /// Release the session. Infallible and safe to call once per session.
    async fn close(&mut self);
}
