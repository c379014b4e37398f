// Authentication service - business logic layer

use std::sync::Arc;
use validator::Validate;

use crate::auth::{
    error::AuthError,
    models::{
        AuthResponse, InvitationResponse, InviteUserRequest, LoginRequest, NewUser,
        RegisterRequest, SetPasswordRequest, User, UserResponse, UserRole,
    },
    password::PasswordService,
    repository::UserStore,
    token::TokenService,
};

/// Authentication service coordinating all auth operations
///
/// Holds no per-request state; concurrent calls only meet in the user store.
pub struct AuthService {
    user_store: Arc<dyn UserStore>,
    token_service: Arc<dyn TokenService>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl AuthService {
    /// Create a new AuthService
    pub fn new(user_store: Arc<dyn UserStore>, token_service: Arc<dyn TokenService>) -> Self {
        Self {
            user_store,
            token_service,
        }
    }

    /// Register a new user
    ///
    /// Self-registered accounts always get the `User` role.
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AuthError> {
        request.validate()?;
        PasswordService::validate_password_strength(&request.password)
            .map_err(|e| AuthError::ValidationError(e.error_message()))?;

        let email = normalize_email(&request.email);
        tracing::debug!("Registering user: {}", email);

        let password_hash = PasswordService::hash_password(&request.password)?;
        let user = self
            .user_store
            .create_user(NewUser {
                email,
                full_name: request.full_name,
                password_hash: Some(password_hash),
                role: UserRole::User,
            })
            .await
            .map_err(|e| {
                if matches!(e, AuthError::EmailAlreadyExists) {
                    tracing::warn!("Attempt to register duplicate email");
                }
                e
            })?;

        let response = self
            .issue_or_rollback(&user, |user| self.session_response(user))
            .await?;

        tracing::info!("Registered user with id: {}", user.id);
        Ok(response)
    }

    /// Login a user
    ///
    /// Unknown email, wrong password and accounts still awaiting password
    /// setup are indistinguishable to the caller.
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AuthError> {
        request.validate()?;

        let email = normalize_email(&request.email);
        let user = self.user_store.find_by_email(&email).await?;

        let verified = match user.as_ref().and_then(|u| u.password_hash.as_deref()) {
            Some(hash) => PasswordService::verify_password(&request.password, hash)
                .unwrap_or_else(|_| {
                    tracing::error!(
                        "Unreadable password hash stored for user {:?}",
                        user.as_ref().map(|u| u.id)
                    );
                    false
                }),
            None => {
                PasswordService::verify_against_dummy(&request.password);
                false
            }
        };

        match user {
            Some(user) if verified => {
                tracing::info!("User {} logged in", user.id);
                self.session_response(&user)
            }
            _ => {
                tracing::debug!("Failed login attempt");
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    /// Create a password-less account and hand back its setup token
    pub async fn invite_user(
        &self,
        request: InviteUserRequest,
    ) -> Result<InvitationResponse, AuthError> {
        request.validate()?;

        let user = self
            .user_store
            .create_user(NewUser {
                email: normalize_email(&request.email),
                full_name: request.full_name,
                password_hash: None,
                role: request.role,
            })
            .await?;

        let setup_token = self
            .issue_or_rollback(&user, |user| {
                self.token_service
                    .generate_password_setup_token(user.id, &user.email, user.role)
            })
            .await?;

        tracing::info!("Invited user {} with role {}", user.id, user.role);
        Ok(InvitationResponse {
            user: user.into(),
            setup_token,
        })
    }

    /// Set the first password of an invited account and start a session
    pub async fn complete_password_setup(
        &self,
        request: SetPasswordRequest,
    ) -> Result<AuthResponse, AuthError> {
        request.validate()?;
        PasswordService::validate_password_strength(&request.password)
            .map_err(|e| AuthError::ValidationError(e.error_message()))?;

        let claims = self
            .token_service
            .verify_password_setup_token(&request.token)?;

        let password_hash = PasswordService::hash_password(&request.password)?;
        let user = self
            .user_store
            .set_initial_password(claims.sub, &password_hash)
            .await?;

        tracing::info!("User {} completed password setup", user.id);
        self.session_response(&user)
    }

    /// Create the bootstrap admin account unless the email is already taken
    ///
    /// Returns `true` when a new account was created.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> Result<bool, AuthError> {
        RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            full_name: None,
        }
        .validate()?;
        PasswordService::validate_password_strength(password)
            .map_err(|e| AuthError::ValidationError(e.error_message()))?;

        let email = normalize_email(email);
        if let Some(existing) = self.user_store.find_by_email(&email).await? {
            if existing.role != UserRole::Admin {
                tracing::warn!(
                    "Bootstrap admin email belongs to user {} with role {}",
                    existing.id,
                    existing.role
                );
            }
            return Ok(false);
        }

        let password_hash = PasswordService::hash_password(password)?;
        let created = self
            .user_store
            .create_user(NewUser {
                email,
                full_name: None,
                password_hash: Some(password_hash),
                role: UserRole::Admin,
            })
            .await;

        match created {
            Ok(user) => {
                tracing::info!("Created bootstrap admin with id: {}", user.id);
                Ok(true)
            }
            // Another instance seeded it first
            Err(AuthError::EmailAlreadyExists) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Get current user information
    pub async fn get_current_user(&self, user_id: i32) -> Result<UserResponse, AuthError> {
        self.user_store
            .find_by_id(user_id)
            .await?
            .map(UserResponse::from)
            .ok_or(AuthError::UserNotFound)
    }

    /// Run `issue` for a just-created account and delete the account if it fails
    async fn issue_or_rollback<T, F>(&self, user: &User, issue: F) -> Result<T, AuthError>
    where
        F: FnOnce(&User) -> Result<T, AuthError>,
    {
        let err = match issue(user) {
            Ok(issued) => return Ok(issued),
            Err(err) => err,
        };

        tracing::warn!("Token issuance failed for new user {}, removing account", user.id);
        if let Err(cleanup) = self.user_store.delete_user(user.id).await {
            tracing::error!(
                "Failed to remove user {} after token failure: {}",
                user.id,
                cleanup
            );
        }
        Err(err)
    }

    fn session_response(&self, user: &User) -> Result<AuthResponse, AuthError> {
        let token = self
            .token_service
            .generate_token(user.id, &user.email, user.role)?;

        Ok(AuthResponse {
            token,
            email: user.email.clone(),
            role: user.role,
        })
    }
}
