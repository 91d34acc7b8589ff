//! HTTP-facing error type for the JSON API handlers.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::models::ValidationError;
use crate::render::RenderError;
use crate::repository::StoreError;
use crate::storage::StorageError;

pub type AppResult<T> = Result<T, AppError>;

/// AppError
///
/// Every failure a JSON handler can return, each mapped to one status code.
/// Store and storage failures are logged and answered with a generic 500.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(&'static str),

    #[error("unsupported media type: {0}")]
    UnsupportedMedia(String),

    /// A document body that would not render (admin writes and previews).
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Store(StoreError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AppError::NotFound("record"),
            StoreError::DuplicateKey => AppError::Conflict("record already exists"),
            other => AppError::Store(other),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Render(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::UnsupportedMedia(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::Store(_) | AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            AppError::Validation(e) => json!({ "error": self.to_string(), "missing": e.missing }),
            AppError::Store(_) | AppError::Storage(_) => {
                tracing::error!(error = %self, "request failed");
                json!({ "error": "internal error" })
            }
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
