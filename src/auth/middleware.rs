// Authentication extractor for protected routes

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::auth::{
    error::AuthError,
    models::UserRole,
    token::TokenService,
};

/// Authenticated user extractor for protected routes
///
/// Accepts only session tokens; a password-setup token is rejected here.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: i32,
    pub email: String,
    pub role: UserRole,
}

impl AuthenticatedUser {
    /// Fail with `InsufficientPermissions` unless the caller holds `required`
    pub fn require_role(&self, required: UserRole) -> Result<(), AuthError> {
        if self.role != required {
            warn!(
                "Authorization failed: user_id={}, required_role={}, actual_role={}",
                self.user_id, required, self.role
            );
            return Err(AuthError::InsufficientPermissions {
                required,
                actual: self.role,
            });
        }

        debug!(
            "Authorization successful: user_id={}, role={}",
            self.user_id, self.role
        );
        Ok(())
    }
}

/// Pull the bearer token out of the Authorization header
fn bearer_token(parts: &Parts) -> Result<&str, AuthError> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken)?;

    auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidToken)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<dyn TokenService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;

        let token_service = Arc::<dyn TokenService>::from_ref(state);
        let claims = token_service.verify_session_token(token)?;

        Ok(AuthenticatedUser {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
        })
    }
}
