// Identity store: Postgres for deployments, in-memory for development and tests

use axum::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::auth::{
    error::AuthError,
    models::{NewUser, User},
};

const USER_COLUMNS: &str = "id, email, full_name, password_hash, role, created_at";

/// Persistence for portal accounts
///
/// Implementations arbitrate duplicate emails: of two concurrent inserts for
/// the same address exactly one succeeds, the other gets `EmailAlreadyExists`.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create a new user
    async fn create_user(&self, new_user: NewUser) -> Result<User, AuthError>;

    /// Find a user by email (case-insensitive)
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError>;

    /// Find a user by ID
    async fn find_by_id(&self, id: i32) -> Result<Option<User>, AuthError>;

    /// Store the first password of an invited account
    ///
    /// Fails with `PasswordAlreadySet` when the account already has one.
    async fn set_initial_password(&self, id: i32, password_hash: &str) -> Result<User, AuthError>;

    /// Remove a user; returns whether a row was deleted
    async fn delete_user(&self, id: i32) -> Result<bool, AuthError>;
}

/// User repository backed by PostgreSQL
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Create a new PgUserStore
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create_user(&self, new_user: NewUser) -> Result<User, AuthError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, full_name, password_hash, role) VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&new_user.email)
        .bind(&new_user.full_name)
        .bind(&new_user.password_hash)
        .bind(new_user.role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // Check for unique constraint violation
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AuthError::EmailAlreadyExists;
                }
            }
            AuthError::DatabaseError(e.to_string())
        })?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE LOWER(email) = LOWER($1)",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, AuthError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn set_initial_password(&self, id: i32, password_hash: &str) -> Result<User, AuthError> {
        let updated = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET password_hash = $1 WHERE id = $2 AND password_hash IS NULL RETURNING {}",
            USER_COLUMNS
        ))
        .bind(password_hash)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(user) => Ok(user),
            None => match self.find_by_id(id).await? {
                Some(_) => Err(AuthError::PasswordAlreadySet),
                None => Err(AuthError::UserNotFound),
            },
        }
    }

    async fn delete_user(&self, id: i32) -> Result<bool, AuthError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(Default)]
struct MemoryUsers {
    next_id: i32,
    by_id: HashMap<i32, User>,
    // lowercased email -> id
    by_email: HashMap<String, i32>,
}

/// User repository kept in process memory
///
/// Every check-then-write happens under a single write guard.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<MemoryUsers>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create_user(&self, new_user: NewUser) -> Result<User, AuthError> {
        let mut users = self.users.write().await;

        let key = new_user.email.to_lowercase();
        if users.by_email.contains_key(&key) {
            return Err(AuthError::EmailAlreadyExists);
        }

        users.next_id += 1;
        let user = User {
            id: users.next_id,
            email: new_user.email,
            full_name: new_user.full_name,
            password_hash: new_user.password_hash,
            role: new_user.role,
            created_at: Utc::now(),
        };

        users.by_email.insert(key, user.id);
        users.by_id.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let users = self.users.read().await;

        Ok(users
            .by_email
            .get(&email.to_lowercase())
            .and_then(|id| users.by_id.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, AuthError> {
        Ok(self.users.read().await.by_id.get(&id).cloned())
    }

    async fn set_initial_password(&self, id: i32, password_hash: &str) -> Result<User, AuthError> {
        let mut users = self.users.write().await;

        let user = users.by_id.get_mut(&id).ok_or(AuthError::UserNotFound)?;
        if user.password_hash.is_some() {
            return Err(AuthError::PasswordAlreadySet);
        }

        user.password_hash = Some(password_hash.to_string());
        Ok(user.clone())
    }

    async fn delete_user(&self, id: i32) -> Result<bool, AuthError> {
        let mut users = self.users.write().await;

        match users.by_id.remove(&id) {
            Some(user) => {
                users.by_email.remove(&user.email.to_lowercase());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::UserRole;
    use std::sync::Arc;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            full_name: None,
            password_hash: Some("hash".to_string()),
            role: UserRole::User,
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let store = InMemoryUserStore::new();
        let created = store.create_user(new_user("a@x.com")).await.unwrap();

        let by_email = store.find_by_email("A@X.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, created.id);

        let by_id = store.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "a@x.com");

        assert!(store.find_by_email("b@x.com").await.unwrap().is_none());
        assert!(store.find_by_id(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected_case_insensitively() {
        let store = InMemoryUserStore::new();
        store.create_user(new_user("a@x.com")).await.unwrap();

        let result = store.create_user(new_user("A@x.COM")).await;
        assert!(matches!(result, Err(AuthError::EmailAlreadyExists)));
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_registration_has_one_winner() {
        let store = Arc::new(InMemoryUserStore::new());

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.create_user(new_user("race@x.com")).await })
            })
            .collect();

        let mut created = 0;
        let mut duplicates = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(AuthError::EmailAlreadyExists) => duplicates += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(duplicates, 15);
    }

    #[tokio::test]
    async fn test_set_initial_password_only_once() {
        let store = InMemoryUserStore::new();
        let invited = store
            .create_user(NewUser {
                password_hash: None,
                ..new_user("invitee@x.com")
            })
            .await
            .unwrap();

        let updated = store.set_initial_password(invited.id, "h1").await.unwrap();
        assert_eq!(updated.password_hash.as_deref(), Some("h1"));

        let again = store.set_initial_password(invited.id, "h2").await;
        assert!(matches!(again, Err(AuthError::PasswordAlreadySet)));

        let missing = store.set_initial_password(999, "h3").await;
        assert!(matches!(missing, Err(AuthError::UserNotFound)));
    }

    #[tokio::test]
    async fn test_delete_user_frees_email() {
        let store = InMemoryUserStore::new();
        let created = store.create_user(new_user("a@x.com")).await.unwrap();

        assert!(store.delete_user(created.id).await.unwrap());
        assert!(!store.delete_user(created.id).await.unwrap());
        assert!(store.find_by_email("a@x.com").await.unwrap().is_none());

        store.create_user(new_user("A@x.com")).await.unwrap();
    }
}
