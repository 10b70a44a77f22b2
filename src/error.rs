// Application error type and its conversion into HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

#[derive(Debug)]
pub enum AppError {
    InternalServerError(anyhow::Error),
    Unauthorized(String),
    NotFound(String),
}

// Conversion from anyhow::Error for easier error propagation
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::InternalServerError(error)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InternalServerError(e) => {
                // Log the detailed error here
                tracing::error!("Internal server error: {:?}", e);
                // Don't expose internal details to the client
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
            AppError::Unauthorized(message) => {
                tracing::warn!("Unauthorized access attempt: {}", message);
                (StatusCode::UNAUTHORIZED, message)
            }
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
        };

        (status, error_message).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
