// Authentication and authorization error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::auth::models::UserRole;

/// Authentication and authorization error types
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    // Recoverable input errors
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid password: {0}")]
    InvalidPasswordFormat(String),

    /// Duplicate identity, including the loser of a concurrent registration
    #[error("Email already exists")]
    EmailAlreadyExists,

    /// Same message for unknown email, wrong password and password-less accounts
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Missing authentication token")]
    MissingToken,

    #[error("Password has already been set for this account")]
    PasswordAlreadySet,

    #[error("User not found")]
    UserNotFound,

    /// User lacks required permissions for the operation
    #[error("Insufficient permissions: required role '{required}', but user has role '{actual}'")]
    InsufficientPermissions { required: UserRole, actual: UserRole },

    // Infrastructure faults
    #[error("Token signing error: {0}")]
    SigningError(String),

    #[error("Password hashing error")]
    PasswordHashError,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// JSON body returned for every auth failure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g. "INVALID_CREDENTIALS")
    pub error_code: String,
    pub message: String,
    /// RFC 3339 timestamp of when the error occurred
    pub timestamp: String,
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AuthError::InvalidPasswordFormat(_) => StatusCode::BAD_REQUEST,
            AuthError::EmailAlreadyExists => StatusCode::CONFLICT,
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::ExpiredToken => StatusCode::UNAUTHORIZED,
            AuthError::MissingToken => StatusCode::UNAUTHORIZED,
            AuthError::PasswordAlreadySet => StatusCode::CONFLICT,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::InsufficientPermissions { .. } => StatusCode::FORBIDDEN,
            AuthError::SigningError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::PasswordHashError => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code sent to clients
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::ValidationError(_) => "VALIDATION_ERROR",
            AuthError::InvalidPasswordFormat(_) => "VALIDATION_ERROR",
            AuthError::EmailAlreadyExists => "DUPLICATE_USER",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::InvalidToken => "INVALID_TOKEN",
            AuthError::ExpiredToken => "EXPIRED_TOKEN",
            AuthError::MissingToken => "MISSING_TOKEN",
            AuthError::PasswordAlreadySet => "PASSWORD_ALREADY_SET",
            AuthError::UserNotFound => "NOT_FOUND",
            AuthError::InsufficientPermissions { .. } => "FORBIDDEN",
            AuthError::SigningError(_)
            | AuthError::PasswordHashError
            | AuthError::DatabaseError(_) => "INTERNAL_ERROR",
        }
    }

    /// Get a descriptive error message for this error
    /// This message is safe to send to clients (no sensitive data)
    pub fn error_message(&self) -> String {
        match self {
            AuthError::ValidationError(msg) => msg.clone(),
            AuthError::InvalidPasswordFormat(msg) => msg.clone(),
            AuthError::InsufficientPermissions { required, .. } => {
                format!("Insufficient permissions: required role '{}'", required)
            }
            AuthError::SigningError(_)
            | AuthError::PasswordHashError
            | AuthError::DatabaseError(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }

    fn log(&self) {
        match self {
            AuthError::SigningError(msg) => error!("Token signing error: {}", msg),
            AuthError::PasswordHashError => error!("Password hashing error"),
            AuthError::DatabaseError(msg) => error!("Database error in auth: {}", msg),
            AuthError::InvalidToken => warn!("Invalid token attempt"),
            AuthError::ExpiredToken => warn!("Expired token attempt"),
            AuthError::MissingToken => warn!("Missing token in request"),
            AuthError::InsufficientPermissions { required, actual } => warn!(
                "Authorization failed: required role '{}', user has role '{}'",
                required, actual
            ),
            other => debug!("Auth request rejected: {}", other),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();

        let body = ErrorResponse {
            error_code: self.error_code().to_string(),
            message: self.error_message(),
            timestamp: Utc::now().to_rfc3339(),
        };

        (self.status_code(), Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for AuthError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AuthError::ValidationError(errors.to_string())
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        AuthError::DatabaseError(err.to_string())
    }
}
