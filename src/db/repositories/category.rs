//! Category repository
//!
//! Database operations for categories. Categories have an administrator
//! lifecycle: the application only ever creates them from operator
//! tooling, and the public site reads them through the published-only
//! lookups.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use std::sync::Arc;

use crate::db::DbPool;
use crate::models::{Category, CreateCategoryInput};

/// Category repository trait
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Create a new category
    async fn create(&self, input: &CreateCategoryInput) -> Result<Category>;

    /// Get category by slug, regardless of publish state
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>>;

    /// Get a published category by slug (the public-site lookup)
    async fn get_published_by_slug(&self, slug: &str) -> Result<Option<Category>>;

    /// List published categories, newest first (post form choices)
    async fn list_published(&self) -> Result<Vec<Category>>;

    /// Set the publish flag of a category
    async fn set_published(&self, id: i64, is_published: bool) -> Result<()>;
}

/// SQLx-based category repository implementation
pub struct SqlxCategoryRepository {
    pool: DbPool,
}

impl SqlxCategoryRepository {
    /// Create a new SQLx category repository
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a shared repository for use with dependency injection
    pub fn boxed(pool: DbPool) -> Arc<dyn CategoryRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CategoryRepository for SqlxCategoryRepository {
    async fn create(&self, input: &CreateCategoryInput) -> Result<Category> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO categories (title, slug, description, is_published, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&input.title)
        .bind(&input.slug)
        .bind(&input.description)
        .bind(input.is_published)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create category")?;

        Ok(Category {
            id: result.last_insert_rowid(),
            title: input.title.clone(),
            slug: input.slug.clone(),
            description: input.description.clone(),
            is_published: input.is_published,
            created_at: now,
        })
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, slug, description, is_published, created_at
            FROM categories
            WHERE slug = ?
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get category by slug")?;

        row.map(|row| row_to_category(&row)).transpose()
    }

    async fn get_published_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, slug, description, is_published, created_at
            FROM categories
            WHERE slug = ? AND is_published = 1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get published category by slug")?;

        row.map(|row| row_to_category(&row)).transpose()
    }

    async fn list_published(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, slug, description, is_published, created_at
            FROM categories
            WHERE is_published = 1
            ORDER BY title
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list published categories")?;

        rows.iter().map(row_to_category).collect()
    }

    async fn set_published(&self, id: i64, is_published: bool) -> Result<()> {
        sqlx::query("UPDATE categories SET is_published = ? WHERE id = ?")
            .bind(is_published)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update category publish flag")?;
        Ok(())
    }
}

fn row_to_category(row: &sqlx::sqlite::SqliteRow) -> Result<Category> {
    Ok(Category {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        slug: row.try_get("slug")?,
        description: row.try_get("description")?,
        is_published: row.try_get("is_published")?,
        created_at: row.try_get("created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup() -> SqlxCategoryRepository {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();
        SqlxCategoryRepository::new(pool)
    }

    #[tokio::test]
    async fn test_create_and_get_by_slug() {
        let repo = setup().await;

        let created = repo
            .create(&CreateCategoryInput::new("Travel", "travel"))
            .await
            .unwrap();
        assert!(created.id > 0);

        let loaded = repo.get_by_slug("travel").await.unwrap().unwrap();
        assert_eq!(loaded.title, "Travel");
        assert!(loaded.is_published);
    }

    #[tokio::test]
    async fn test_published_lookup_hides_unpublished() {
        let repo = setup().await;

        repo.create(&CreateCategoryInput::new("Drafts", "drafts").unpublished())
            .await
            .unwrap();

        assert!(repo.get_by_slug("drafts").await.unwrap().is_some());
        assert!(repo.get_published_by_slug("drafts").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_published_orders_by_title() {
        let repo = setup().await;

        repo.create(&CreateCategoryInput::new("Zoo", "zoo")).await.unwrap();
        repo.create(&CreateCategoryInput::new("Art", "art")).await.unwrap();
        repo.create(&CreateCategoryInput::new("Hidden", "hidden").unpublished())
            .await
            .unwrap();

        let titles: Vec<String> = repo
            .list_published()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.title)
            .collect();
        assert_eq!(titles, vec!["Art".to_string(), "Zoo".to_string()]);
    }

    #[tokio::test]
    async fn test_set_published() {
        let repo = setup().await;
        let created = repo
            .create(&CreateCategoryInput::new("Travel", "travel"))
            .await
            .unwrap();

        repo.set_published(created.id, false).await.unwrap();
        assert!(repo.get_published_by_slug("travel").await.unwrap().is_none());
    }
}
