//! Comment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::AuthorRef;

/// Comment entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    /// Unique identifier
    pub id: i64,
    /// Post the comment belongs to
    pub post_id: i64,
    /// Author user ID
    pub author_id: i64,
    /// Comment text
    pub text: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Comment joined with its author, as displayed under a post.
///
/// Display order is `created_at` ascending (oldest first).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentDetail {
    pub id: i64,
    pub post_id: i64,
    pub author: AuthorRef,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a comment
#[derive(Debug, Clone)]
pub struct CreateCommentInput {
    /// Post the comment is attached to
    pub post_id: i64,
    /// Author user ID (always the authenticated user)
    pub author_id: i64,
    /// Comment text
    pub text: String,
}

impl CreateCommentInput {
    pub fn new(post_id: i64, author_id: i64, text: impl Into<String>) -> Self {
        Self {
            post_id,
            author_id,
            text: text.into(),
        }
    }
}
