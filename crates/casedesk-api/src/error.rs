//! API error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid login key")]
    InvalidLoginKey,

    #[error("Server configuration error")]
    Configuration,

    #[error("{0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] casedesk_db::DbError),

    #[error("Auth error: {0}")]
    Auth(#[from] casedesk_auth::AuthError),

    #[error("Storage error: {0}")]
    Storage(#[from] casedesk_storage::StorageError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::InvalidLoginKey => {
                (StatusCode::UNAUTHORIZED, "Invalid login key".to_string())
            }
            ApiError::Configuration => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server configuration error".to_string(),
            ),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            ApiError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
            ApiError::Auth(e) => match e {
                // A missing secret is a deployment problem, not a bad
                // credential; report it as such instead of 401.
                casedesk_auth::AuthError::MissingSecret => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server configuration error".to_string(),
                ),
                _ => (StatusCode::UNAUTHORIZED, e.to_string()),
            },
            ApiError::Storage(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to store image".to_string(),
            ),
        };

        let body = axum::Json(json!({
            "success": false,
            "error": message,
        }));

        (status, body).into_response()
    }
}
