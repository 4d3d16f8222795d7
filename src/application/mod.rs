pub mod engine;
pub mod error;
pub mod invoker;
pub mod service;

pub use engine::{EngineSession, RenderEngine, RenderError};
pub use error::AppError;
pub use service::RenderService;
