//! HTTP error mapping

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::models::ErrorResponse;
use crate::validation::ValidationError;

/// Errors surfaced to HTTP clients
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request payload refused at the boundary
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Metrics exporter not installed
    #[error("Metrics are disabled")]
    MetricsDisabled,
}

impl ApiError {
    /// Status code for this error
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(e) if e.is_structural() => StatusCode::BAD_REQUEST,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::MetricsDisabled => StatusCode::NOT_FOUND,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Validation(e) => e.code(),
            Self::MetricsDisabled => "metrics_disabled",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.code().to_string(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
