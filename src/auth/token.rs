// JWT token generation and validation service

use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{error::AuthError, models::UserRole};

/// Default session token lifetime (1 hour)
pub const DEFAULT_SESSION_TOKEN_SECS: i64 = 3600;

/// Default password-setup token lifetime (24 hours)
pub const DEFAULT_PASSWORD_SETUP_TOKEN_SECS: i64 = 86400;

/// What a token may be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    Session,
    PasswordSetup,
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32, // user_id
    pub email: String,
    pub role: UserRole,
    pub purpose: TokenPurpose,
    pub jti: Uuid, // unique per issuance
    pub iat: i64,
    pub exp: i64,
}

/// Issues credentials for authenticated users
pub trait TokenGenerator: Send + Sync {
    /// Signed, time-bounded session credential
    fn generate_token(&self, user_id: i32, email: &str, role: UserRole) -> Result<String, AuthError>;

    /// Single-purpose credential that only authorizes setting the initial password
    fn generate_password_setup_token(
        &self,
        user_id: i32,
        email: &str,
        role: UserRole,
    ) -> Result<String, AuthError>;
}

/// Checks credentials issued by a [`TokenGenerator`]
pub trait TokenVerifier: Send + Sync {
    fn verify_session_token(&self, token: &str) -> Result<Claims, AuthError>;

    fn verify_password_setup_token(&self, token: &str) -> Result<Claims, AuthError>;
}

/// Both halves of the token contract
pub trait TokenService: TokenGenerator + TokenVerifier {}

impl<T: TokenGenerator + TokenVerifier> TokenService for T {}

/// HS256 implementation of the token contract
pub struct JwtTokenService {
    secret: String,
    session_token_duration: i64,        // in seconds
    password_setup_token_duration: i64, // in seconds
}

impl JwtTokenService {
    /// Create a new JwtTokenService with default lifetimes
    pub fn new(secret: String) -> Self {
        Self::with_durations(
            secret,
            DEFAULT_SESSION_TOKEN_SECS,
            DEFAULT_PASSWORD_SETUP_TOKEN_SECS,
        )
    }

    pub fn with_durations(
        secret: String,
        session_token_duration: i64,
        password_setup_token_duration: i64,
    ) -> Self {
        Self {
            secret,
            session_token_duration,
            password_setup_token_duration,
        }
    }

    fn issue(
        &self,
        user_id: i32,
        email: &str,
        role: UserRole,
        purpose: TokenPurpose,
        duration: i64,
    ) -> Result<String, AuthError> {
        if self.secret.is_empty() {
            return Err(AuthError::SigningError(
                "signing secret is not configured".to_string(),
            ));
        }

        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            role,
            purpose,
            jti: Uuid::new_v4(),
            iat: now,
            exp: now + duration,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AuthError::SigningError(e.to_string()))
    }

    /// Decode and check signature, expiry and purpose
    fn validate_token(&self, token: &str, expected: TokenPurpose) -> Result<Claims, AuthError> {
        if self.secret.is_empty() {
            return Err(AuthError::SigningError(
                "signing secret is not configured".to_string(),
            ));
        }

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
            _ => AuthError::InvalidToken,
        })?;

        if claims.purpose != expected {
            tracing::warn!(
                "Token purpose mismatch for user_id={}: expected {:?}, got {:?}",
                claims.sub,
                expected,
                claims.purpose
            );
            return Err(AuthError::InvalidToken);
        }

        Ok(claims)
    }
}

impl TokenGenerator for JwtTokenService {
    fn generate_token(&self, user_id: i32, email: &str, role: UserRole) -> Result<String, AuthError> {
        self.issue(
            user_id,
            email,
            role,
            TokenPurpose::Session,
            self.session_token_duration,
        )
    }

    fn generate_password_setup_token(
        &self,
        user_id: i32,
        email: &str,
        role: UserRole,
    ) -> Result<String, AuthError> {
        self.issue(
            user_id,
            email,
            role,
            TokenPurpose::PasswordSetup,
            self.password_setup_token_duration,
        )
    }
}

impl TokenVerifier for JwtTokenService {
    fn verify_session_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.validate_token(token, TokenPurpose::Session)
    }

    fn verify_password_setup_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.validate_token(token, TokenPurpose::PasswordSetup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TEST_SECRET: &str = "test_secret_key_for_testing_purposes";

    fn test_token_service() -> JwtTokenService {
        JwtTokenService::new(TEST_SECRET.to_string())
    }

    fn sign_raw(claims: &Claims) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_session_token_expiration_is_one_hour() {
        let service = test_token_service();
        let token = service.generate_token(1, "test@example.com", UserRole::User).unwrap();
        let claims = service.verify_session_token(&token).unwrap();

        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(claims.purpose, TokenPurpose::Session);
    }

    #[test]
    fn test_password_setup_token_expiration_is_one_day() {
        let service = test_token_service();
        let token = service
            .generate_password_setup_token(1, "test@example.com", UserRole::Editor)
            .unwrap();
        let claims = service.verify_password_setup_token(&token).unwrap();

        assert_eq!(claims.exp - claims.iat, 86400);
        assert_eq!(claims.purpose, TokenPurpose::PasswordSetup);
    }

    #[test]
    fn test_custom_durations() {
        let service = JwtTokenService::with_durations(TEST_SECRET.to_string(), 60, 120);
        let token = service.generate_token(1, "a@x.com", UserRole::User).unwrap();
        let claims = service.verify_session_token(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, 60);
    }

    #[test]
    fn test_token_claims_contain_user_identity() {
        let service = test_token_service();
        let token = service.generate_token(42, "user@example.com", UserRole::Admin).unwrap();
        let claims = service.verify_session_token(&token).unwrap();

        assert_eq!(claims.sub, 42);
        assert_eq!(claims.email, "user@example.com");
        assert_eq!(claims.role, UserRole::Admin);
    }

    #[test]
    fn test_same_inputs_yield_distinct_tokens() {
        let service = test_token_service();
        let first = service.generate_token(1, "a@x.com", UserRole::User).unwrap();
        let second = service.generate_token(1, "a@x.com", UserRole::User).unwrap();

        assert_ne!(first, second);
        assert!(service.verify_session_token(&first).is_ok());
        assert!(service.verify_session_token(&second).is_ok());
    }

    #[test]
    fn test_setup_token_is_not_a_session_token() {
        let service = test_token_service();
        let setup = service
            .generate_password_setup_token(1, "a@x.com", UserRole::User)
            .unwrap();

        assert!(matches!(
            service.verify_session_token(&setup),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_session_token_is_not_a_setup_token() {
        let service = test_token_service();
        let session = service.generate_token(1, "a@x.com", UserRole::User).unwrap();

        assert!(matches!(
            service.verify_password_setup_token(&session),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let service = test_token_service();
        let now = Utc::now().timestamp();
        let token = sign_raw(&Claims {
            sub: 1,
            email: "a@x.com".to_string(),
            role: UserRole::User,
            purpose: TokenPurpose::Session,
            jti: Uuid::new_v4(),
            iat: now - 1000,
            exp: now - 500,
        });

        assert!(matches!(
            service.verify_session_token(&token),
            Err(AuthError::ExpiredToken)
        ));
    }

    #[test]
    fn test_malformed_tokens_are_rejected() {
        let service = test_token_service();

        assert!(service.verify_session_token("").is_err());
        assert!(service.verify_session_token("not.a.token").is_err());
        assert!(service.verify_session_token("invalid_token_format").is_err());
        assert!(service
            .verify_session_token("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.invalid.signature")
            .is_err());
    }

    #[test]
    fn test_token_signature_verification() {
        let service1 = JwtTokenService::new("secret1".to_string());
        let service2 = JwtTokenService::new("secret2".to_string());

        let token = service1.generate_token(1, "test@example.com", UserRole::User).unwrap();

        assert!(service1.verify_session_token(&token).is_ok());
        assert!(service2.verify_session_token(&token).is_err());
    }

    #[test]
    fn test_missing_secret_is_a_signing_error() {
        let service = JwtTokenService::new(String::new());

        assert!(matches!(
            service.generate_token(1, "a@x.com", UserRole::User),
            Err(AuthError::SigningError(_))
        ));
        assert!(matches!(
            service.generate_password_setup_token(1, "a@x.com", UserRole::User),
            Err(AuthError::SigningError(_))
        ));
    }

    fn role_strategy() -> impl Strategy<Value = UserRole> {
        prop_oneof![
            Just(UserRole::Admin),
            Just(UserRole::Editor),
            Just(UserRole::User),
        ]
    }

    proptest! {
        #[test]
        fn prop_session_tokens_carry_identity(
            user_id in 1i32..1000000,
            email in "[a-z]{3,10}@[a-z]{3,10}\\.(com|org|net)",
            role in role_strategy()
        ) {
            let service = test_token_service();
            let token = service.generate_token(user_id, &email, role)?;
            let claims = service.verify_session_token(&token)?;

            prop_assert_eq!(claims.sub, user_id);
            prop_assert_eq!(claims.email, email);
            prop_assert_eq!(claims.role, role);
        }

        #[test]
        fn prop_token_kinds_never_interchange(
            user_id in 1i32..1000000,
            email in "[a-z]{3,10}@[a-z]{3,10}\\.(com|org|net)",
            role in role_strategy()
        ) {
            let service = test_token_service();
            let session = service.generate_token(user_id, &email, role)?;
            let setup = service.generate_password_setup_token(user_id, &email, role)?;

            prop_assert!(service.verify_password_setup_token(&session).is_err());
            prop_assert!(service.verify_session_token(&setup).is_err());
        }

        #[test]
        fn prop_malformed_tokens_rejected(malformed in "[a-zA-Z0-9]{10,50}") {
            let service = test_token_service();
            prop_assert!(service.verify_session_token(&malformed).is_err());
        }
    }
}
