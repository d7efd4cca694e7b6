//! Comment repository
//!
//! Database operations for comments. The mutation lookups fold the
//! author (and for deletion, the post) into the filter: a viewer asking
//! for someone else's comment gets `None`, indistinguishable from an
//! absent comment.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use std::sync::Arc;

use crate::db::DbPool;
use crate::models::{AuthorRef, Comment, CommentDetail, CreateCommentInput};

/// Comment repository trait
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Create a new comment
    async fn create(&self, input: &CreateCommentInput) -> Result<Comment>;

    /// Get comment by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>>;

    /// Get a comment only if `author_id` owns it (edit path)
    async fn get_owned(&self, id: i64, author_id: i64) -> Result<Option<Comment>>;

    /// Get a comment only if it belongs to `post_id` and `author_id`
    /// owns it (delete path)
    async fn get_owned_for_post(&self, id: i64, post_id: i64, author_id: i64) -> Result<Option<Comment>>;

    /// Update the text of a comment
    async fn update_text(&self, id: i64, text: &str) -> Result<Comment>;

    /// Delete a comment
    async fn delete(&self, id: i64) -> Result<()>;

    /// List a post's comments with their authors, oldest first
    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentDetail>>;

    /// Count comments on a post
    async fn count_for_post(&self, post_id: i64) -> Result<i64>;
}

/// SQLx-based comment repository implementation
pub struct SqlxCommentRepository {
    pool: DbPool,
}

impl SqlxCommentRepository {
    /// Create a new SQLx comment repository
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a shared repository for use with dependency injection
    pub fn boxed(pool: DbPool) -> Arc<dyn CommentRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CommentRepository for SqlxCommentRepository {
    async fn create(&self, input: &CreateCommentInput) -> Result<Comment> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO comments (post_id, author_id, text, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(input.post_id)
        .bind(input.author_id)
        .bind(&input.text)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create comment")?;

        Ok(Comment {
            id: result.last_insert_rowid(),
            post_id: input.post_id,
            author_id: input.author_id,
            text: input.text.clone(),
            created_at: now,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>> {
        let row = sqlx::query(
            "SELECT id, post_id, author_id, text, created_at FROM comments WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get comment by ID")?;

        row.map(|row| row_to_comment(&row)).transpose()
    }

    async fn get_owned(&self, id: i64, author_id: i64) -> Result<Option<Comment>> {
        let row = sqlx::query(
            r#"
            SELECT id, post_id, author_id, text, created_at
            FROM comments
            WHERE id = ? AND author_id = ?
            "#,
        )
        .bind(id)
        .bind(author_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get owned comment")?;

        row.map(|row| row_to_comment(&row)).transpose()
    }

    async fn get_owned_for_post(&self, id: i64, post_id: i64, author_id: i64) -> Result<Option<Comment>> {
        let row = sqlx::query(
            r#"
            SELECT id, post_id, author_id, text, created_at
            FROM comments
            WHERE id = ? AND post_id = ? AND author_id = ?
            "#,
        )
        .bind(id)
        .bind(post_id)
        .bind(author_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get owned comment for post")?;

        row.map(|row| row_to_comment(&row)).transpose()
    }

    async fn update_text(&self, id: i64, text: &str) -> Result<Comment> {
        sqlx::query("UPDATE comments SET text = ? WHERE id = ?")
            .bind(text)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update comment")?;

        self.get_by_id(id)
            .await?
            .with_context(|| format!("Comment {} not found after update", id))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete comment")?;
        Ok(())
    }

    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentDetail>> {
        let rows = sqlx::query(
            r#"
            SELECT cm.id, cm.post_id, cm.author_id, cm.text, cm.created_at,
                   u.username AS author_username
            FROM comments cm
            JOIN users u ON u.id = cm.author_id
            WHERE cm.post_id = ?
            ORDER BY cm.created_at ASC, cm.id ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list comments for post")?;

        rows.iter()
            .map(|row| {
                Ok(CommentDetail {
                    id: row.try_get("id")?,
                    post_id: row.try_get("post_id")?,
                    author: AuthorRef {
                        id: row.try_get("author_id")?,
                        username: row.try_get("author_username")?,
                    },
                    text: row.try_get("text")?,
                    created_at: row.try_get("created_at")?,
                })
            })
            .collect()
    }

    async fn count_for_post(&self, post_id: i64) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM comments WHERE post_id = ?")
            .bind(post_id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count comments")?;
        Ok(row.try_get("count")?)
    }
}

fn row_to_comment(row: &sqlx::sqlite::SqliteRow) -> Result<Comment> {
    Ok(Comment {
        id: row.try_get("id")?,
        post_id: row.try_get("post_id")?,
        author_id: row.try_get("author_id")?,
        text: row.try_get("text")?,
        created_at: row.try_get("created_at")?,
    })
}
