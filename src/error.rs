use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Row {row}: {message}")]
    RowParse { row: usize, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Row source error: {0}")]
    Source(String),

    #[error("Upload rejected: {message}")]
    Upload { status: StatusCode, message: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn row(row: usize, message: impl Into<String>) -> Self {
        AppError::RowParse {
            row,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::RowParse { .. } | AppError::Csv(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            AppError::Upload { status, message } => (*status, message.clone()),
            AppError::Source(msg) => {
                tracing::error!("Row source error: {}", msg);
                (StatusCode::BAD_GATEWAY, msg.clone())
            }
            AppError::Http(e) => {
                tracing::error!("HTTP client error: {:?}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "Failed to fetch row source".to_string(),
                )
            }
            AppError::Io(e) => {
                tracing::error!("IO error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "IO error".to_string())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
