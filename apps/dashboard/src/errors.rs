use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::dataset::DatasetError;
use crate::figure::RenderError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn code(&self) -> &'static str {
        match self {
            AppError::Dataset(DatasetError::Fetch(_)) => "FETCH_ERROR",
            AppError::Dataset(DatasetError::MalformedRecord { .. }) => "MALFORMED_RECORD",
            AppError::Dataset(DatasetError::CacheDecode { .. }) => "CACHE_DECODE_ERROR",
            AppError::Dataset(DatasetError::Cache(_)) => "CACHE_ERROR",
            AppError::Render(_) => "RENDER_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Dataset(e) => {
                tracing::error!("Dataset error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "The job dataset is currently unavailable",
                )
            }
            AppError::Render(e) => {
                tracing::error!("Render error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "The chart could not be rendered",
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred",
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
