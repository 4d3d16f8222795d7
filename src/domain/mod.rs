pub mod error;
pub mod options;

pub use error::DomainError;
pub use options::{Margin, PaperFormat, RenderDirectives, normalize};
