use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::repositories::RepositoryError;
use crate::services::activity_source::SourceError;
use crate::services::email_service::EmailError;

// Type alias for Result with our AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Every failure a caller can observe.
///
/// Each variant maps to exactly one HTTP status in [`AppError::status_code`],
/// and is rendered with the same `{ statusCode, data: { message } }` envelope
/// as successful responses.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Failed to deliver the verification email: {0}")]
    Delivery(#[from] EmailError),

    #[error("No verification code was issued for this email, or it has expired")]
    CodeNotFound,

    #[error("The verification code does not match")]
    CodeMismatch,

    #[error("Ingestion failed: {0}")]
    Ingestion(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Activity source error: {0}")]
    Upstream(#[from] SourceError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) | AppError::CodeNotFound => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::CodeMismatch | AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Delivery(_) | AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Ingestion(_) | AppError::Database(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message shown to the client. Server-side details stay in the logs.
    fn public_message(&self) -> String {
        match self {
            AppError::Database(_) | AppError::Internal(_) => "Internal server error".to_string(),
            AppError::Delivery(_) => "Failed to deliver the verification email".to_string(),
            AppError::Upstream(_) => "The activity source is unavailable".to_string(),
            AppError::Ingestion(_) => "Failed to store the fetched activities".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => AppError::NotFound("Not found".to_string()),
            RepositoryError::AlreadyExists => AppError::Conflict("Already exists".to_string()),
            RepositoryError::Database(e) => AppError::Database(e),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        let body = json!({
            "statusCode": status.as_u16(),
            "data": {
                "message": [self.public_message()],
            },
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::CodeMismatch.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::CodeNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Ingestion("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Delivery(EmailError::SendFailed("smtp down".into())).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_repository_error_conversion() {
        assert!(matches!(
            AppError::from(RepositoryError::NotFound),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(RepositoryError::AlreadyExists),
            AppError::Conflict(_)
        ));
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = AppError::Internal("secret stack trace".into());
        assert_eq!(err.public_message(), "Internal server error");
    }
}
