//! Custom error types for the profile service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::error::DatabaseError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Failures of the profile core
#[derive(Error, Debug)]
pub enum ProfileError {
    /// Target user does not exist
    #[error("User not found")]
    NotFound,

    /// Malformed input, rejected before any write
    #[error("Validation error: {0}")]
    Validation(String),

    /// Token subject does not name a user
    #[error("Token subject is not a valid user id")]
    InvalidSubject,

    /// Unique key already taken
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Repository failure
    #[error("Storage error: {0}")]
    Storage(#[from] DatabaseError),

    /// Unexpected failure outside storage
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Type alias for profile core results
pub type ProfileResult<T> = Result<T, ProfileError>;

/// Custom error type for the HTTP surface
#[derive(Error, Debug)]
pub enum ApiError {
    /// Unauthorized access
    #[error("Unauthorized")]
    Unauthorized,

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request with message
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error
    #[error("Internal server error")]
    InternalServerError,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl From<ProfileError> for ApiError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::NotFound => ApiError::NotFound("User not found".to_string()),
            ProfileError::Validation(msg) => ApiError::BadRequest(msg),
            ProfileError::Conflict(msg) => ApiError::BadRequest(msg),
            ProfileError::InvalidSubject => ApiError::Unauthorized,
            ProfileError::Storage(e) => {
                error!("Storage failure: {}", e);
                ApiError::Database(e)
            }
            ProfileError::Internal(msg) => {
                error!("Internal failure: {}", msg);
                ApiError::InternalServerError
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
            ApiError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_errors_map_to_statuses() {
        let cases = [
            (ProfileError::NotFound, StatusCode::NOT_FOUND),
            (
                ProfileError::Validation("height out of range".into()),
                StatusCode::BAD_REQUEST,
            ),
            (ProfileError::InvalidSubject, StatusCode::UNAUTHORIZED),
            (
                ProfileError::Storage(DatabaseError::Configuration("down".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), status);
        }
    }
}
