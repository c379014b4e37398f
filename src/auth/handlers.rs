// HTTP handlers for authentication endpoints

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::auth::{
    error::AuthError,
    middleware::AuthenticatedUser,
    models::{
        AuthResponse, InvitationResponse, InviteUserRequest, LoginRequest, RegisterRequest,
        SetPasswordRequest, UserResponse, UserRole,
    },
    service::AuthService,
};

/// Register a new user
/// POST /api/auth/register
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = AuthResponse),
        (status = 400, description = "Invalid input data"),
        (status = 409, description = "Email already exists")
    ),
    tag = "auth"
)]
pub async fn register_handler(
    State(service): State<Arc<AuthService>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AuthError> {
    let response = service.register(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Login a user
/// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Invalid input data"),
        (status = 401, description = "Invalid email or password")
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(service): State<Arc<AuthService>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    let response = service.login(request).await?;
    Ok(Json(response))
}

/// Get current user information (protected endpoint)
/// GET /api/auth/me
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Missing or invalid session token")
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn me_handler(
    State(service): State<Arc<AuthService>>,
    user: AuthenticatedUser,
) -> Result<Json<UserResponse>, AuthError> {
    let current = service.get_current_user(user.user_id).await?;
    Ok(Json(current))
}

/// Invite a new account (admin only)
/// POST /api/auth/invite
#[utoipa::path(
    post,
    path = "/api/auth/invite",
    request_body = InviteUserRequest,
    responses(
        (status = 201, description = "Account created, awaiting password setup", body = InvitationResponse),
        (status = 401, description = "Missing or invalid session token"),
        (status = 403, description = "Caller is not an admin"),
        (status = 409, description = "Email already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn invite_handler(
    State(service): State<Arc<AuthService>>,
    user: AuthenticatedUser,
    Json(request): Json<InviteUserRequest>,
) -> Result<(StatusCode, Json<InvitationResponse>), AuthError> {
    user.require_role(UserRole::Admin)?;

    let invitation = service.invite_user(request).await?;
    Ok((StatusCode::CREATED, Json(invitation)))
}

/// Set the first password of an invited account
/// POST /api/auth/setup-password
#[utoipa::path(
    post,
    path = "/api/auth/setup-password",
    request_body = SetPasswordRequest,
    responses(
        (status = 200, description = "Password set, session started", body = AuthResponse),
        (status = 400, description = "Invalid input data"),
        (status = 401, description = "Invalid or expired setup token"),
        (status = 409, description = "Password already set")
    ),
    tag = "auth"
)]
pub async fn setup_password_handler(
    State(service): State<Arc<AuthService>>,
    Json(request): Json<SetPasswordRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    let response = service.complete_password_setup(request).await?;
    Ok(Json(response))
}
