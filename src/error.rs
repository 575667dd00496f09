//! Error types for Athenaeum server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error codes returned in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    NotAuthorized = 2,
    BackendFailure = 3,
    Duplicate = 8,
    BadValue = 18,
    NoSuchData = 20,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, ErrorCode) {
        match self {
            AppError::Authentication(_) => (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthorized),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NoSuchData),
            AppError::Validation(_) | AppError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue)
            }
            AppError::Conflict(_) => (StatusCode::CONFLICT, ErrorCode::Duplicate),
            AppError::Backend { status, .. } => match *status {
                401 => (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthorized),
                403 => (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized),
                404 => (StatusCode::NOT_FOUND, ErrorCode::NoSuchData),
                409 => (StatusCode::CONFLICT, ErrorCode::Duplicate),
                _ => (StatusCode::BAD_GATEWAY, ErrorCode::BackendFailure),
            },
            AppError::Http(_) => (StatusCode::BAD_GATEWAY, ErrorCode::BackendFailure),
            AppError::Serialization(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Failure)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            AppError::Authentication(msg)
            | AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::Conflict(msg)
            | AppError::BadRequest(msg) => msg.clone(),
            AppError::Backend { status, message } => {
                if *status >= 500 {
                    tracing::error!("Backend error {}: {}", status, message);
                }
                message.clone()
            }
            AppError::Http(e) => {
                tracing::error!("Backend unreachable: {:?}", e);
                "Backend unreachable".to_string()
            }
            AppError::Serialization(e) => {
                tracing::error!("Serialization error: {:?}", e);
                "Internal server error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_status_mapping() {
        let err = AppError::Backend { status: 401, message: "Invalid login credentials".into() };
        assert_eq!(err.status_and_code().0, StatusCode::UNAUTHORIZED);

        let err = AppError::Backend { status: 403, message: "permission denied for table books".into() };
        assert_eq!(err.status_and_code(), (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized));

        let err = AppError::Backend { status: 409, message: "duplicate key".into() };
        assert_eq!(err.status_and_code().0, StatusCode::CONFLICT);

        let err = AppError::Backend { status: 500, message: "boom".into() };
        assert_eq!(err.status_and_code(), (StatusCode::BAD_GATEWAY, ErrorCode::BackendFailure));
    }

    #[test]
    fn test_conflict_response() {
        let response = AppError::Conflict("Book is already borrowed".into()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
