//! Post service
//!
//! Implements business logic for posts:
//! - Create, update, delete with validation
//! - The detail-view lookup with the visibility policy applied
//! - Ownership-folded lookups for the delete path

use anyhow::Context;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::db::repositories::PostRepository;
use crate::models::{CreatePostInput, Post, PostDetail, UpdatePostInput, User};
use crate::policy;

/// Error types for post service operations
#[derive(Debug, thiserror::Error)]
pub enum PostServiceError {
    /// Post absent, or absent-by-policy
    #[error("Post not found: {0}")]
    NotFound(i64),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Post service
pub struct PostService {
    repo: Arc<dyn PostRepository>,
}

impl PostService {
    /// Create a new post service
    pub fn new(repo: Arc<dyn PostRepository>) -> Self {
        Self { repo }
    }

    /// Create a new post. The author is whatever the caller put in the
    /// input; handlers always set it to the authenticated user.
    pub async fn create(&self, input: CreatePostInput) -> Result<Post, PostServiceError> {
        validate_content(&input.title, &input.text)?;

        let post = self
            .repo
            .create(&input)
            .await
            .context("Failed to create post")?;

        tracing::info!(post_id = post.id, author_id = post.author_id, "Post created");
        Ok(post)
    }

    /// Get the joined read model for a post regardless of state.
    ///
    /// Handlers that need the author-or-visibility decision should use
    /// [`PostService::visible_detail`] instead.
    pub async fn get_detail(&self, id: i64) -> Result<Option<PostDetail>, PostServiceError> {
        Ok(self
            .repo
            .get_detail(id)
            .await
            .context("Failed to get post detail")?)
    }

    /// The detail-view lookup: loads the post and applies the
    /// visibility policy for `viewer` at `now`. An invisible post is
    /// reported as absent, so hidden posts do not leak their existence.
    pub async fn visible_detail(
        &self,
        id: i64,
        viewer: Option<&User>,
        now: DateTime<Utc>,
    ) -> Result<PostDetail, PostServiceError> {
        let detail = self
            .repo
            .get_detail(id)
            .await
            .context("Failed to get post detail")?
            .ok_or(PostServiceError::NotFound(id))?;

        if !policy::is_post_visible(viewer, &detail, now) {
            return Err(PostServiceError::NotFound(id));
        }

        Ok(detail)
    }

    /// Get a post regardless of state (the edit-path lookup; the
    /// redirect-vs-render decision is the handler's).
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Post>, PostServiceError> {
        Ok(self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get post")?)
    }

    /// Get a post only if `author` owns it; anything else is absent.
    /// Backs the delete confirm page and the delete action.
    pub async fn get_owned(&self, id: i64, author: &User) -> Result<Post, PostServiceError> {
        self.repo
            .get_owned(id, author.id)
            .await
            .context("Failed to get owned post")?
            .ok_or(PostServiceError::NotFound(id))
    }

    /// Get a post only if it is published; backs the comment gate.
    pub async fn get_published(&self, id: i64) -> Result<Post, PostServiceError> {
        self.repo
            .get_published(id)
            .await
            .context("Failed to get published post")?
            .ok_or(PostServiceError::NotFound(id))
    }

    /// Update a post. Ownership must already have been established by
    /// the caller (the edit handler redirects non-authors away).
    pub async fn update(&self, id: i64, input: UpdatePostInput) -> Result<Post, PostServiceError> {
        if let Some(ref title) = input.title {
            if title.trim().is_empty() {
                return Err(PostServiceError::ValidationError(
                    "Title cannot be empty".to_string(),
                ));
            }
        }
        if let Some(ref text) = input.text {
            if text.trim().is_empty() {
                return Err(PostServiceError::ValidationError(
                    "Text cannot be empty".to_string(),
                ));
            }
        }

        let post = self
            .repo
            .update(id, &input)
            .await
            .context("Failed to update post")?;
        Ok(post)
    }

    /// Delete a post owned by `author`. The lookup folds ownership, so
    /// a non-author gets `NotFound`. Comments cascade away with it.
    pub async fn delete_owned(&self, id: i64, author: &User) -> Result<(), PostServiceError> {
        let post = self.get_owned(id, author).await?;

        self.repo
            .delete(post.id)
            .await
            .context("Failed to delete post")?;

        tracing::info!(post_id = id, author_id = author.id, "Post deleted");
        Ok(())
    }
}

fn validate_content(title: &str, text: &str) -> Result<(), PostServiceError> {
    if title.trim().is_empty() {
        return Err(PostServiceError::ValidationError(
            "Title cannot be empty".to_string(),
        ));
    }
    if title.len() > 256 {
        return Err(PostServiceError::ValidationError(
            "Title is too long".to_string(),
        ));
    }
    if text.trim().is_empty() {
        return Err(PostServiceError::ValidationError(
            "Text cannot be empty".to_string(),
        ));
    }
    Ok(())
}
