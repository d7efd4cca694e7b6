//! Location repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use std::sync::Arc;

use crate::db::DbPool;
use crate::models::{CreateLocationInput, Location};

/// Location repository trait
#[async_trait]
pub trait LocationRepository: Send + Sync {
    /// Create a new location
    async fn create(&self, input: &CreateLocationInput) -> Result<Location>;

    /// Get location by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Location>>;

    /// List published locations by name (post form choices)
    async fn list_published(&self) -> Result<Vec<Location>>;

    /// Set the publish flag of a location
    async fn set_published(&self, id: i64, is_published: bool) -> Result<()>;
}

/// SQLx-based location repository implementation
pub struct SqlxLocationRepository {
    pool: DbPool,
}

impl SqlxLocationRepository {
    /// Create a new SQLx location repository
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a shared repository for use with dependency injection
    pub fn boxed(pool: DbPool) -> Arc<dyn LocationRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl LocationRepository for SqlxLocationRepository {
    async fn create(&self, input: &CreateLocationInput) -> Result<Location> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO locations (name, is_published, created_at) VALUES (?, ?, ?)",
        )
        .bind(&input.name)
        .bind(input.is_published)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create location")?;

        Ok(Location {
            id: result.last_insert_rowid(),
            name: input.name.clone(),
            is_published: input.is_published,
            created_at: now,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Location>> {
        let row = sqlx::query(
            "SELECT id, name, is_published, created_at FROM locations WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get location by ID")?;

        match row {
            Some(row) => Ok(Some(Location {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                is_published: row.try_get("is_published")?,
                created_at: row.try_get("created_at")?,
            })),
            None => Ok(None),
        }
    }

    async fn list_published(&self) -> Result<Vec<Location>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, is_published, created_at
            FROM locations
            WHERE is_published = 1
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list published locations")?;

        rows.iter()
            .map(|row| {
                Ok(Location {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                    is_published: row.try_get("is_published")?,
                    created_at: row.try_get("created_at")?,
                })
            })
            .collect()
    }

    async fn set_published(&self, id: i64, is_published: bool) -> Result<()> {
        sqlx::query("UPDATE locations SET is_published = ? WHERE id = ?")
            .bind(is_published)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update location publish flag")?;
        Ok(())
    }
}
