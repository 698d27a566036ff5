use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::services::booking::BookingError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] anyhow::Error),

    #[error("unauthorized")]
    Unauthorized,

    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Booking(#[from] BookingError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Booking(e) => match e {
                BookingError::InvalidRange => StatusCode::BAD_REQUEST,
                BookingError::DateConflict => StatusCode::CONFLICT,
                BookingError::NotFound(_) => StatusCode::NOT_FOUND,
                BookingError::NotAuthorized => StatusCode::FORBIDDEN,
                BookingError::AlreadyResolved => StatusCode::CONFLICT,
                BookingError::StaleRange => StatusCode::CONFLICT,
                BookingError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
