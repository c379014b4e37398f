// Authentication module
// JWT sessions, password-setup invitations and the identity store

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod token;

// Re-export commonly used types
pub use error::AuthError;
pub use handlers::{
    invite_handler, login_handler, me_handler, register_handler, setup_password_handler,
};
pub use middleware::AuthenticatedUser;
pub use models::{
    AuthResponse, InvitationResponse, InviteUserRequest, LoginRequest, RegisterRequest,
    SetPasswordRequest, User, UserResponse, UserRole,
};
pub use repository::{InMemoryUserStore, PgUserStore, UserStore};
pub use service::AuthService;
pub use token::{JwtTokenService, TokenGenerator, TokenService, TokenVerifier};
