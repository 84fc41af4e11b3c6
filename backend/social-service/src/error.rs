/// Error types for Social Service
///
/// Every variant renders as `{"error": "<message>"}`. Storage and hashing
/// failures are logged with full detail where they are converted and reach the
/// client only as a generic message.
use crate::db::StoreError;
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use crypto_core::HashError;
use thiserror::Error;

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";
pub const CONFLICT_MESSAGE: &str = "Username or email is already in use";
pub const UNKNOWN_AUTHOR_MESSAGE: &str = "User does not exist";
pub const UNAVAILABLE_MESSAGE: &str = "Service temporarily unavailable";

/// Result type for social-service operations
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),

    #[error("{0}")]
    Unavailable(String),
}

impl AppError {
    pub fn internal() -> Self {
        AppError::Internal(INTERNAL_ERROR_MESSAGE.to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string(),
        }))
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => AppError::Conflict(CONFLICT_MESSAGE.to_string()),
            StoreError::UnknownAuthor => AppError::BadRequest(UNKNOWN_AUTHOR_MESSAGE.to_string()),
            StoreError::NotFound => AppError::NotFound("Not found".to_string()),
            StoreError::Unavailable(e) => {
                tracing::warn!(error = %e, "Store unavailable");
                AppError::Unavailable(UNAVAILABLE_MESSAGE.to_string())
            }
            StoreError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                AppError::internal()
            }
        }
    }
}

impl From<HashError> for AppError {
    fn from(err: HashError) -> Self {
        tracing::error!(error = %err, "Credential hashing failed");
        AppError::internal()
    }
}

impl From<actix_web::error::BlockingError> for AppError {
    fn from(err: actix_web::error::BlockingError) -> Self {
        tracing::error!(error = %err, "Blocking task failed");
        AppError::internal()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::BadRequest(err.to_string())
    }
}
