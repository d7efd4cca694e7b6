//! Comment service
//!
//! Implements business logic for comments. All mutation paths use
//! folded lookups: the post must be published for adding or editing,
//! and the comment must belong to the acting user. Violations surface
//! as `NotFound`, never as a distinct "forbidden" outcome.
//!
//! The publish gate here is deliberately weaker than the view gate: a
//! scheduled or hidden-category post accepts comments as long as its
//! author has published it, while an unpublished post rejects them even
//! from its own author.

use anyhow::Context;
use std::sync::Arc;

use crate::db::repositories::{CommentRepository, PostRepository};
use crate::models::{Comment, CommentDetail, CreateCommentInput, User};

/// Error types for comment service operations
#[derive(Debug, thiserror::Error)]
pub enum CommentServiceError {
    /// Comment or post absent, or absent-by-policy
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Comment service
pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    posts: Arc<dyn PostRepository>,
}

impl CommentService {
    /// Create a new comment service
    pub fn new(comments: Arc<dyn CommentRepository>, posts: Arc<dyn PostRepository>) -> Self {
        Self { comments, posts }
    }

    /// Add a comment to a published post.
    pub async fn add(
        &self,
        post_id: i64,
        author: &User,
        text: &str,
    ) -> Result<Comment, CommentServiceError> {
        self.require_published_post(post_id).await?;
        validate_text(text)?;

        let comment = self
            .comments
            .create(&CreateCommentInput::new(post_id, author.id, text))
            .await
            .context("Failed to create comment")?;

        tracing::info!(comment_id = comment.id, post_id, "Comment added");
        Ok(comment)
    }

    /// Load a comment for editing: the post must be published and the
    /// comment must belong to `author`.
    pub async fn get_for_edit(
        &self,
        comment_id: i64,
        post_id: i64,
        author: &User,
    ) -> Result<Comment, CommentServiceError> {
        self.require_published_post(post_id).await?;

        self.comments
            .get_owned(comment_id, author.id)
            .await
            .context("Failed to get comment")?
            .ok_or_else(|| CommentServiceError::NotFound(format!("Comment {} not found", comment_id)))
    }

    /// Edit a comment owned by `author`.
    pub async fn edit(
        &self,
        comment_id: i64,
        post_id: i64,
        author: &User,
        text: &str,
    ) -> Result<Comment, CommentServiceError> {
        let comment = self.get_for_edit(comment_id, post_id, author).await?;
        validate_text(text)?;

        let updated = self
            .comments
            .update_text(comment.id, text)
            .await
            .context("Failed to update comment")?;
        Ok(updated)
    }

    /// Load a comment for the delete confirm page: folded by comment
    /// ID, post ID and ownership at once.
    pub async fn get_for_delete(
        &self,
        comment_id: i64,
        post_id: i64,
        author: &User,
    ) -> Result<Comment, CommentServiceError> {
        self.comments
            .get_owned_for_post(comment_id, post_id, author.id)
            .await
            .context("Failed to get comment")?
            .ok_or_else(|| CommentServiceError::NotFound(format!("Comment {} not found", comment_id)))
    }

    /// Delete a comment owned by `author`.
    pub async fn delete(
        &self,
        comment_id: i64,
        post_id: i64,
        author: &User,
    ) -> Result<(), CommentServiceError> {
        let comment = self.get_for_delete(comment_id, post_id, author).await?;

        self.comments
            .delete(comment.id)
            .await
            .context("Failed to delete comment")?;

        tracing::info!(comment_id, post_id, "Comment deleted");
        Ok(())
    }

    /// List a post's comments for display, oldest first.
    pub async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentDetail>, CommentServiceError> {
        Ok(self
            .comments
            .list_for_post(post_id)
            .await
            .context("Failed to list comments")?)
    }

    async fn require_published_post(&self, post_id: i64) -> Result<(), CommentServiceError> {
        self.posts
            .get_published(post_id)
            .await
            .context("Failed to look up post")?
            .ok_or_else(|| CommentServiceError::NotFound(format!("Post {} not found", post_id)))?;
        Ok(())
    }
}

fn validate_text(text: &str) -> Result<(), CommentServiceError> {
    if text.trim().is_empty() {
        return Err(CommentServiceError::ValidationError(
            "Comment cannot be empty".to_string(),
        ));
    }
    Ok(())
}
