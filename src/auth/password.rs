// Password hashing and validation service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::sync::OnceLock;

use crate::auth::error::AuthError;

/// Password service for hashing and verification
pub struct PasswordService;

impl PasswordService {
    /// Hash a password using Argon2id with a random salt
    pub fn hash_password(password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|_| AuthError::PasswordHashError)
    }

    /// Verify a password against a hash
    ///
    /// A mismatch is `Ok(false)`; only an unparseable hash is an error.
    pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash).map_err(|_| AuthError::PasswordHashError)?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    /// Burn the same work as a real verification when no account matched
    pub fn verify_against_dummy(password: &str) {
        static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

        let dummy = DUMMY_HASH.get_or_init(|| Self::hash_password("dummy-password-0").ok());
        if let Some(hash) = dummy {
            let _ = Self::verify_password(password, hash);
        }
    }

    /// Validate password strength requirements
    ///
    /// At least 8 characters, one letter and one digit, no surrounding whitespace.
    pub fn validate_password_strength(password: &str) -> Result<(), AuthError> {
        if password.chars().count() < 8 {
            return Err(AuthError::InvalidPasswordFormat(
                "Password must be at least 8 characters long".to_string(),
            ));
        }
        if password.trim() != password {
            return Err(AuthError::InvalidPasswordFormat(
                "Password must not start or end with whitespace".to_string(),
            ));
        }
        if !password.chars().any(|c| c.is_alphabetic()) {
            return Err(AuthError::InvalidPasswordFormat(
                "Password must contain at least one letter".to_string(),
            ));
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(AuthError::InvalidPasswordFormat(
                "Password must contain at least one digit".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = PasswordService::hash_password("correct horse 1").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(PasswordService::verify_password("correct horse 1", &hash).unwrap());
        assert!(!PasswordService::verify_password("wrong horse 1", &hash).unwrap());
    }

    #[test]
    fn test_same_password_hashes_differently() {
        let first = PasswordService::hash_password("password123").unwrap();
        let second = PasswordService::hash_password("password123").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        let result = PasswordService::verify_password("password123", "not-a-hash");
        assert!(matches!(result, Err(AuthError::PasswordHashError)));
    }

    #[test]
    fn test_password_strength() {
        assert!(PasswordService::validate_password_strength("password1").is_ok());
        assert!(PasswordService::validate_password_strength("short1").is_err());
        assert!(PasswordService::validate_password_strength("allletters").is_err());
        assert!(PasswordService::validate_password_strength("1234567890").is_err());
        assert!(PasswordService::validate_password_strength(" password1").is_err());
    }
}
