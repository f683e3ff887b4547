//! Error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

pub type AppResult<T> = Result<T, AppError>;

/// Failure taxonomy for the analyzer.
///
/// `ModelLoad` is fatal at startup; the other variants are per-request
/// and are converted to JSON error responses at the handler boundary so
/// a bad upload never takes the session down.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Artifact missing, corrupted or version-incompatible
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Upload is not valid delimited-text tabular data
    #[error("could not parse uploaded file: {0}")]
    MalformedInput(String),

    /// Required column missing or column layout unusable
    #[error("{0}")]
    Schema(String),

    /// Model rejected the shaped input
    #[error("prediction failed: {0}")]
    Prediction(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::ModelLoad(msg) => {
                tracing::error!("Model error: {}", msg);
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::MalformedInput(_) => StatusCode::BAD_REQUEST,
            AppError::Schema(_) | AppError::Prediction(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };

        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}
