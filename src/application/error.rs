use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use stampa_api_types::RenderErrorBody;

use crate::{application::engine::RenderError, domain::DomainError, infra::error::InfraError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("HTML content is required")]
    MissingHtml,
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingHtml | AppError::Domain(_) => StatusCode::BAD_REQUEST,
            AppError::Render(_) | AppError::Infra(_) | AppError::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn presentation_message(&self) -> &'static str {
        match self {
            AppError::MissingHtml => "HTML content is required",
            AppError::Domain(_) => "Invalid rendering options",
            AppError::Render(_) => "Failed to generate PDF",
            AppError::Infra(_) => "Internal server error",
            AppError::Unexpected(_) => "Unexpected error occurred",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = RenderErrorBody {
            error: self.presentation_message().to_string(),
            details: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
