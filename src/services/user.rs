//! User service
//!
//! Implements business logic for accounts and authentication:
//! - Registration with field validation (no email verification step)
//! - Login/logout with opaque session tokens
//! - Session validation for the auth middleware
//! - Profile edits

use anyhow::Context;
use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::db::repositories::{SessionRepository, UserRepository};
use crate::models::{CreateUserInput, Session, UpdateProfileInput, User};
use crate::services::password::{hash_password, verify_password};

/// Default session expiration time in days
const DEFAULT_SESSION_EXPIRATION_DAYS: i64 = 7;

/// Minimum accepted password length
const MIN_PASSWORD_LENGTH: usize = 8;

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// Authentication failed (invalid credentials)
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// User already exists
    #[error("User already exists: {0}")]
    UserExists(String),

    /// User not found
    #[error("User not found: {0}")]
    NotFound(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Input for logging in
#[derive(Debug, Clone)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

impl LoginInput {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// User service for accounts and authentication
pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    session_repo: Arc<dyn SessionRepository>,
    session_expiration_days: i64,
}

impl UserService {
    /// Create a new user service with the given repositories
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            session_expiration_days: DEFAULT_SESSION_EXPIRATION_DAYS,
        }
    }

    /// Create a new user service with custom session expiration
    pub fn with_session_expiration(
        user_repo: Arc<dyn UserRepository>,
        session_repo: Arc<dyn SessionRepository>,
        session_expiration_days: i64,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            session_expiration_days,
        }
    }

    /// Register a new user.
    ///
    /// On success the account exists but no session is created; the
    /// caller is expected to send the user to the login page.
    pub async fn register(&self, input: CreateUserInput) -> Result<User, UserServiceError> {
        self.validate_register_input(&input)?;

        if self
            .user_repo
            .exists_by_username(&input.username)
            .await
            .context("Failed to check username")?
        {
            return Err(UserServiceError::UserExists(format!(
                "Username '{}' is already taken",
                input.username
            )));
        }

        let password_hash =
            hash_password(&input.password).context("Failed to hash password")?;

        let user = User::new(
            input.username,
            input.email,
            input.first_name,
            input.last_name,
            password_hash,
        );

        let created = self
            .user_repo
            .create(&user)
            .await
            .context("Failed to create user")?;

        tracing::info!(username = %created.username, "User registered");
        Ok(created)
    }

    /// Log in with credentials, creating a new session on success.
    pub async fn login(&self, input: LoginInput) -> Result<Session, UserServiceError> {
        let user = self
            .user_repo
            .get_by_username(&input.username)
            .await
            .context("Failed to look up user")?
            .ok_or_else(|| {
                UserServiceError::AuthenticationError("Invalid username or password".to_string())
            })?;

        let valid = verify_password(&input.password, &user.password_hash)
            .context("Failed to verify password")?;
        if !valid {
            return Err(UserServiceError::AuthenticationError(
                "Invalid username or password".to_string(),
            ));
        }

        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4().to_string(),
            user_id: user.id,
            expires_at: now + Duration::days(self.session_expiration_days),
            created_at: now,
        };

        self.session_repo
            .create(&session)
            .await
            .context("Failed to create session")?;

        tracing::info!(username = %user.username, "User logged in");
        Ok(session)
    }

    /// Invalidate a session token.
    pub async fn logout(&self, token: &str) -> Result<(), UserServiceError> {
        self.session_repo
            .delete(token)
            .await
            .context("Failed to delete session")?;
        Ok(())
    }

    /// Resolve a session token to its user.
    ///
    /// Returns `None` for unknown tokens; expired sessions are removed
    /// as a side effect and also resolve to `None`.
    pub async fn validate_session(&self, token: &str) -> Result<Option<User>, UserServiceError> {
        let session = match self
            .session_repo
            .get_by_id(token)
            .await
            .context("Failed to look up session")?
        {
            Some(session) => session,
            None => return Ok(None),
        };

        if session.is_expired() {
            self.session_repo
                .delete(token)
                .await
                .context("Failed to remove expired session")?;
            return Ok(None);
        }

        let user = self
            .user_repo
            .get_by_id(session.user_id)
            .await
            .context("Failed to load session user")?;
        Ok(user)
    }

    /// Find a user by username (profile pages).
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, UserServiceError> {
        Ok(self
            .user_repo
            .get_by_username(username)
            .await
            .context("Failed to get user by username")?)
    }

    /// Update the authenticated user's own profile.
    pub async fn update_profile(
        &self,
        user_id: i64,
        input: UpdateProfileInput,
    ) -> Result<User, UserServiceError> {
        if let Some(ref username) = input.username {
            validate_username(username)?;
            if self
                .user_repo
                .exists_by_username_excluding(username, user_id)
                .await
                .context("Failed to check username")?
            {
                return Err(UserServiceError::UserExists(format!(
                    "Username '{}' is already taken",
                    username
                )));
            }
        }
        if let Some(ref email) = input.email {
            validate_email(email)?;
        }

        let updated = self
            .user_repo
            .update_profile(user_id, &input)
            .await
            .context("Failed to update profile")?;
        Ok(updated)
    }

    fn validate_register_input(&self, input: &CreateUserInput) -> Result<(), UserServiceError> {
        validate_username(&input.username)?;
        validate_email(&input.email)?;
        if input.first_name.trim().is_empty() {
            return Err(UserServiceError::ValidationError(
                "First name cannot be empty".to_string(),
            ));
        }
        if input.last_name.trim().is_empty() {
            return Err(UserServiceError::ValidationError(
                "Last name cannot be empty".to_string(),
            ));
        }
        if input.password.len() < MIN_PASSWORD_LENGTH {
            return Err(UserServiceError::ValidationError(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }
        Ok(())
    }
}

fn validate_username(username: &str) -> Result<(), UserServiceError> {
    if username.trim().is_empty() {
        return Err(UserServiceError::ValidationError(
            "Username cannot be empty".to_string(),
        ));
    }
    if username.len() > 150 {
        return Err(UserServiceError::ValidationError(
            "Username is too long".to_string(),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '@' | '+'))
    {
        return Err(UserServiceError::ValidationError(
            "Username may only contain letters, digits and @/./+/-/_".to_string(),
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), UserServiceError> {
    let trimmed = email.trim();
    let valid = trimmed
        .split_once('@')
        .map_or(false, |(local, domain)| {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        });
    if !valid {
        return Err(UserServiceError::ValidationError(
            "Enter a valid email address".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxSessionRepository, SqlxUserRepository};
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> UserService {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        UserService::new(
            SqlxUserRepository::boxed(pool.clone()),
            SqlxSessionRepository::boxed(pool),
        )
    }

    fn alice_input() -> CreateUserInput {
        CreateUserInput {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Liddell".to_string(),
            password: "wonderland42".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let service = setup().await;

        let user = service.register(alice_input()).await.unwrap();
        assert!(user.id > 0);
        assert_ne!(user.password_hash, "wonderland42");

        let session = service
            .login(LoginInput::new("alice", "wonderland42"))
            .await
            .unwrap();
        let resolved = service.validate_session(&session.id).await.unwrap().unwrap();
        assert_eq!(resolved.id, user.id);
    }

    #[tokio::test]
    async fn test_register_duplicate_username() {
        let service = setup().await;
        service.register(alice_input()).await.unwrap();

        let err = service.register(alice_input()).await.unwrap_err();
        assert!(matches!(err, UserServiceError::UserExists(_)));
    }

    #[tokio::test]
    async fn test_register_validation() {
        let service = setup().await;

        let mut bad_email = alice_input();
        bad_email.email = "not-an-email".to_string();
        assert!(matches!(
            service.register(bad_email).await.unwrap_err(),
            UserServiceError::ValidationError(_)
        ));

        let mut short_password = alice_input();
        short_password.password = "short".to_string();
        assert!(matches!(
            service.register(short_password).await.unwrap_err(),
            UserServiceError::ValidationError(_)
        ));

        let mut bad_username = alice_input();
        bad_username.username = "no spaces allowed".to_string();
        assert!(matches!(
            service.register(bad_username).await.unwrap_err(),
            UserServiceError::ValidationError(_)
        ));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let service = setup().await;
        service.register(alice_input()).await.unwrap();

        let err = service
            .login(LoginInput::new("alice", "not-the-password"))
            .await
            .unwrap_err();
        assert!(matches!(err, UserServiceError::AuthenticationError(_)));
    }

    #[tokio::test]
    async fn test_logout_invalidates_session() {
        let service = setup().await;
        service.register(alice_input()).await.unwrap();
        let session = service
            .login(LoginInput::new("alice", "wonderland42"))
            .await
            .unwrap();

        service.logout(&session.id).await.unwrap();
        assert!(service.validate_session(&session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_validate_unknown_token() {
        let service = setup().await;
        assert!(service.validate_session("bogus").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_profile_rejects_taken_username() {
        let service = setup().await;
        let alice = service.register(alice_input()).await.unwrap();

        let mut bob = alice_input();
        bob.username = "bob".to_string();
        service.register(bob).await.unwrap();

        let err = service
            .update_profile(
                alice.id,
                UpdateProfileInput {
                    username: Some("bob".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, UserServiceError::UserExists(_)));
    }
}
