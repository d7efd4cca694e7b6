//! Post model
//!
//! This module provides:
//! - `Post` entity representing a blog post
//! - `PostDetail`, the joined read model used by feeds and the detail view
//!   (author, category, location, comment count)
//! - Input types for creating and updating posts
//!
//! A post carries a scheduling timestamp (`pub_date`) that may lie in the
//! future; whether a post is publicly visible at a given instant is decided
//! by `crate::policy`, not here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{CategoryRef, LocationRef};

/// Post entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier
    pub id: i64,
    /// Post title
    pub title: String,
    /// Body text
    pub text: String,
    /// Scheduled publication timestamp (may be in the future)
    pub pub_date: DateTime<Utc>,
    /// Author user ID
    pub author_id: i64,
    /// Category ID (optional)
    pub category_id: Option<i64>,
    /// Location ID (optional)
    pub location_id: Option<i64>,
    /// Attached image path, relative to the media directory (optional)
    pub image: Option<String>,
    /// Whether the author has published the post
    pub is_published: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Author fields embedded in a joined post row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthorRef {
    pub id: i64,
    pub username: String,
}

/// Joined read model for a post: the post row plus its author, optional
/// category and location, and the number of comments on it.
///
/// This is what feeds and the detail view operate on; the visibility
/// policy needs the embedded category's `is_published` flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetail {
    pub id: i64,
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author: AuthorRef,
    pub category: Option<CategoryRef>,
    pub location: Option<LocationRef>,
    pub image: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub comment_count: i64,
}

/// Input for creating a new post
#[derive(Debug, Clone)]
pub struct CreatePostInput {
    /// Post title
    pub title: String,
    /// Body text
    pub text: String,
    /// Scheduled publication timestamp
    pub pub_date: DateTime<Utc>,
    /// Author user ID (always the authenticated user)
    pub author_id: i64,
    /// Category ID (optional)
    pub category_id: Option<i64>,
    /// Location ID (optional)
    pub location_id: Option<i64>,
    /// Attached image path (optional)
    pub image: Option<String>,
    /// Whether the post is published (defaults to true)
    pub is_published: bool,
}

impl CreatePostInput {
    /// Create a new input with the required fields
    pub fn new(
        title: impl Into<String>,
        text: impl Into<String>,
        pub_date: DateTime<Utc>,
        author_id: i64,
    ) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            pub_date,
            author_id,
            category_id: None,
            location_id: None,
            image: None,
            is_published: true,
        }
    }

    /// Set the category
    pub fn with_category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Set the location
    pub fn with_location(mut self, location_id: i64) -> Self {
        self.location_id = Some(location_id);
        self
    }

    /// Mark the post as a draft
    pub fn draft(mut self) -> Self {
        self.is_published = false;
        self
    }
}

/// Input for updating an existing post
#[derive(Debug, Clone, Default)]
pub struct UpdatePostInput {
    /// New title (optional)
    pub title: Option<String>,
    /// New body text (optional)
    pub text: Option<String>,
    /// New publication timestamp (optional)
    pub pub_date: Option<DateTime<Utc>>,
    /// New category; `Some(None)` clears it
    pub category_id: Option<Option<i64>>,
    /// New location; `Some(None)` clears it
    pub location_id: Option<Option<i64>>,
    /// New image path; `Some(None)` clears it
    pub image: Option<Option<String>>,
    /// New published flag (optional)
    pub is_published: Option<bool>,
}

impl UpdatePostInput {
    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.title.is_some()
            || self.text.is_some()
            || self.pub_date.is_some()
            || self.category_id.is_some()
            || self.location_id.is_some()
            || self.image.is_some()
            || self.is_published.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_input_defaults() {
        let input = CreatePostInput::new("Hi", "Body", Utc::now(), 1);

        assert_eq!(input.author_id, 1);
        assert!(input.is_published);
        assert!(input.category_id.is_none());
        assert!(input.location_id.is_none());
    }

    #[test]
    fn test_create_input_builders() {
        let input = CreatePostInput::new("Hi", "Body", Utc::now(), 1)
            .with_category(7)
            .with_location(3)
            .draft();

        assert_eq!(input.category_id, Some(7));
        assert_eq!(input.location_id, Some(3));
        assert!(!input.is_published);
    }

    #[test]
    fn test_update_input_has_changes() {
        assert!(!UpdatePostInput::default().has_changes());

        let clears_category = UpdatePostInput {
            category_id: Some(None),
            ..Default::default()
        };
        assert!(clears_category.has_changes());
    }
}
