use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shortie_shortener::ShortenerError;
use thiserror::Error;
use tracing::error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error(transparent)]
    Shortener(#[from] ShortenerError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Shortener(err) => match err {
                ShortenerError::InvalidUrl(_) | ShortenerError::EmptyBatch => {
                    StatusCode::BAD_REQUEST
                }
                ShortenerError::UrlConflict(_) | ShortenerError::UrlDeleted(_) => {
                    StatusCode::CONFLICT
                }
                ShortenerError::NotFound(_) => StatusCode::NOT_FOUND,
                ShortenerError::Deleted(_) => StatusCode::GONE,
                ShortenerError::GenerationExhausted { .. }
                | ShortenerError::Generator(_)
                | ShortenerError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            // Details stay in the log.
            error!(err = %self, "request failed");
            return status.into_response();
        }

        (status, self.to_string()).into_response()
    }
}
