//! User repository
//!
//! Database operations for user accounts.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::Row;
use std::sync::Arc;

use crate::db::DbPool;
use crate::models::{UpdateProfileInput, User};

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user
    async fn create(&self, user: &User) -> Result<User>;

    /// Get user by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Get user by username
    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Check if a username is already taken
    async fn exists_by_username(&self, username: &str) -> Result<bool>;

    /// Check if a username is taken by a different user (for profile edits)
    async fn exists_by_username_excluding(&self, username: &str, exclude_id: i64) -> Result<bool>;

    /// Update a user's own profile fields
    async fn update_profile(&self, id: i64, input: &UpdateProfileInput) -> Result<User>;
}

/// SQLx-based user repository implementation
pub struct SqlxUserRepository {
    pool: DbPool,
}

impl SqlxUserRepository {
    /// Create a new SQLx user repository
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a shared repository for use with dependency injection
    pub fn boxed(pool: DbPool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, user: &User) -> Result<User> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (username, email, first_name, last_name, password_hash, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .context("Failed to create user")?;

        Ok(User {
            id: result.last_insert_rowid(),
            ..user.clone()
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, first_name, last_name, password_hash, created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get user by ID")?;

        row.map(|row| row_to_user(&row)).transpose()
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, email, first_name, last_name, password_hash, created_at
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get user by username")?;

        row.map(|row| row_to_user(&row)).transpose()
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM users WHERE username = ?")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check username")?;

        Ok(row.try_get::<i64, _>("count")? > 0)
    }

    async fn exists_by_username_excluding(&self, username: &str, exclude_id: i64) -> Result<bool> {
        let row =
            sqlx::query("SELECT COUNT(*) as count FROM users WHERE username = ? AND id != ?")
                .bind(username)
                .bind(exclude_id)
                .fetch_one(&self.pool)
                .await
                .context("Failed to check username")?;

        Ok(row.try_get::<i64, _>("count")? > 0)
    }

    async fn update_profile(&self, id: i64, input: &UpdateProfileInput) -> Result<User> {
        let existing = self
            .get_by_id(id)
            .await?
            .with_context(|| format!("User {} not found", id))?;

        let username = input.username.clone().unwrap_or(existing.username);
        let email = input.email.clone().unwrap_or(existing.email);
        let first_name = input.first_name.clone().unwrap_or(existing.first_name);
        let last_name = input.last_name.clone().unwrap_or(existing.last_name);

        sqlx::query(
            r#"
            UPDATE users
            SET username = ?, email = ?, first_name = ?, last_name = ?
            WHERE id = ?
            "#,
        )
        .bind(&username)
        .bind(&email)
        .bind(&first_name)
        .bind(&last_name)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update user profile")?;

        Ok(User {
            username,
            email,
            first_name,
            last_name,
            ..existing
        })
    }
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        password_hash: row.try_get("password_hash")?,
        created_at: row.try_get("created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> SqlxUserRepository {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        SqlxUserRepository::new(pool)
    }

    fn alice() -> User {
        User::new(
            "alice".to_string(),
            "alice@example.com".to_string(),
            "Alice".to_string(),
            "Liddell".to_string(),
            "hash".to_string(),
        )
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = setup().await;

        let created = repo.create(&alice()).await.unwrap();
        assert!(created.id > 0);

        let by_id = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(by_id.username, "alice");

        let by_name = repo.get_by_username("alice").await.unwrap().unwrap();
        assert_eq!(by_name.id, created.id);
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let repo = setup().await;
        assert!(repo.get_by_id(42).await.unwrap().is_none());
        assert!(repo.get_by_username("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_exists_by_username() {
        let repo = setup().await;
        let created = repo.create(&alice()).await.unwrap();

        assert!(repo.exists_by_username("alice").await.unwrap());
        assert!(!repo.exists_by_username("bob").await.unwrap());
        assert!(!repo
            .exists_by_username_excluding("alice", created.id)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_update_profile_partial() {
        let repo = setup().await;
        let created = repo.create(&alice()).await.unwrap();

        let input = UpdateProfileInput {
            email: Some("wonderland@example.com".to_string()),
            ..Default::default()
        };
        let updated = repo.update_profile(created.id, &input).await.unwrap();

        assert_eq!(updated.email, "wonderland@example.com");
        assert_eq!(updated.username, "alice");
        assert_eq!(updated.first_name, "Alice");
    }
}
