// Runtime configuration read from the environment (and `.env` via dotenv)

use crate::auth::token::{DEFAULT_PASSWORD_SETUP_TOKEN_SECS, DEFAULT_SESSION_TOKEN_SECS};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set in environment")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Credentials of the admin account created at startup
#[derive(Clone)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSeed")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    /// Absent means the in-memory user store is used
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub session_token_ttl_secs: i64,
    pub password_setup_token_ttl_secs: i64,
    /// Set only when both `ADMIN_EMAIL` and `ADMIN_PASSWORD` are given
    pub admin: Option<AdminSeed>,
}

impl Config {
    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let database_url = lookup("DATABASE_URL").filter(|s| !s.trim().is_empty());
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(&lookup, "PORT", 8080)?;
        let session_token_ttl_secs = positive(
            parse_or(&lookup, "SESSION_TOKEN_TTL_SECS", DEFAULT_SESSION_TOKEN_SECS)?,
            "SESSION_TOKEN_TTL_SECS",
        )?;
        let password_setup_token_ttl_secs = positive(
            parse_or(
                &lookup,
                "PASSWORD_SETUP_TOKEN_TTL_SECS",
                DEFAULT_PASSWORD_SETUP_TOKEN_SECS,
            )?,
            "PASSWORD_SETUP_TOKEN_TTL_SECS",
        )?;

        let admin = match (
            non_blank(&lookup, "ADMIN_EMAIL"),
            non_blank(&lookup, "ADMIN_PASSWORD"),
        ) {
            (Some(email), Some(password)) => Some(AdminSeed { email, password }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing("ADMIN_PASSWORD")),
            (None, Some(_)) => return Err(ConfigError::Missing("ADMIN_EMAIL")),
        };

        Ok(Self {
            jwt_secret,
            database_url,
            host,
            port,
            session_token_ttl_secs,
            password_setup_token_ttl_secs,
            admin,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn non_blank<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).filter(|s| !s.trim().is_empty())
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let Some(value) = lookup(name) else {
        return Ok(default);
    };

    match value.trim().parse() {
        Ok(parsed) => Ok(parsed),
        Err(_) => Err(ConfigError::Invalid { name, value }),
    }
}

fn positive(value: i64, name: &'static str) -> Result<i64, ConfigError> {
    if value > 0 {
        Ok(value)
    } else {
        Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
        })
    }
}
