//! Category model
//!
//! Categories are editorial groupings for posts. They are created and
//! maintained by site administrators, never by end users, and are hidden
//! from the public site via `is_published` rather than deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    /// Unique identifier
    pub id: i64,
    /// Category title
    pub title: String,
    /// URL-friendly slug (unique)
    pub slug: String,
    /// Category description
    pub description: String,
    /// Whether the category is visible on the public site
    pub is_published: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Category {
    /// Create a new Category with the given parameters.
    ///
    /// The ID will be set to 0 and should be assigned by the database.
    pub fn new(title: String, slug: String, description: String) -> Self {
        Self {
            id: 0, // Will be set by the database
            title,
            slug,
            description,
            is_published: true,
            created_at: Utc::now(),
        }
    }
}

/// Category fields embedded in a joined post row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryRef {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub is_published: bool,
}

/// Input for creating a new category
#[derive(Debug, Clone)]
pub struct CreateCategoryInput {
    /// Category title
    pub title: String,
    /// URL-friendly slug
    pub slug: String,
    /// Category description
    pub description: String,
    /// Whether the category is visible (defaults to true)
    pub is_published: bool,
}

impl CreateCategoryInput {
    pub fn new(title: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            slug: slug.into(),
            description: String::new(),
            is_published: true,
        }
    }

    /// Mark the category as hidden from the public site
    pub fn unpublished(mut self) -> Self {
        self.is_published = false;
        self
    }
}
