//! Authentication and authorization error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid authorization header format")]
    InvalidAuthHeader,

    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("User not found")]
    UserNotFound,

    /// Carries the full client-facing denial message, including the
    /// allowed-role list or the required minimum role.
    #[error("{0}")]
    InsufficientPermissions(String),

    #[error("Authorization check failed")]
    AuthorizationFailed,

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AuthError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
            }
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token".to_string()),
            AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "Token expired".to_string()),
            AuthError::InvalidAuthHeader => (
                StatusCode::UNAUTHORIZED,
                "Invalid authorization header format".to_string(),
            ),
            AuthError::AuthenticationRequired => {
                (StatusCode::UNAUTHORIZED, "Authentication required".to_string())
            }
            AuthError::UserNotFound => (StatusCode::NOT_FOUND, "User not found".to_string()),
            AuthError::InsufficientPermissions(message) => {
                (StatusCode::FORBIDDEN, message.clone())
            }
            AuthError::AuthorizationFailed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Authorization check failed".to_string(),
            ),
            AuthError::PasswordHash(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
            AuthError::Jwt(_) => (StatusCode::UNAUTHORIZED, "Invalid token".to_string()),
        };

        let body = axum::Json(json!({
            "message": message
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_denial_status_codes() {
        let cases = [
            (AuthError::AuthenticationRequired, StatusCode::UNAUTHORIZED),
            (AuthError::UserNotFound, StatusCode::NOT_FOUND),
            (
                AuthError::InsufficientPermissions("Insufficient permissions.".to_string()),
                StatusCode::FORBIDDEN,
            ),
            (AuthError::AuthorizationFailed, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_denial_messages() {
        assert_eq!(AuthError::AuthenticationRequired.to_string(), "Authentication required");
        assert_eq!(AuthError::UserNotFound.to_string(), "User not found");
        assert_eq!(AuthError::AuthorizationFailed.to_string(), "Authorization check failed");
    }
}
