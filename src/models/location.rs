//! Location model
//!
//! Locations follow the same administrator lifecycle as categories:
//! created by operators, soft-hidden via `is_published`, and optionally
//! attached to posts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Location entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    /// Unique identifier
    pub id: i64,
    /// Place name
    pub name: String,
    /// Whether the location is visible on the public site
    pub is_published: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Location {
    /// Create a new Location with the given name.
    pub fn new(name: String) -> Self {
        Self {
            id: 0, // Will be set by the database
            name,
            is_published: true,
            created_at: Utc::now(),
        }
    }
}

/// Location fields embedded in a joined post row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationRef {
    pub id: i64,
    pub name: String,
}

/// Input for creating a new location
#[derive(Debug, Clone)]
pub struct CreateLocationInput {
    /// Place name
    pub name: String,
    /// Whether the location is visible (defaults to true)
    pub is_published: bool,
}

impl CreateLocationInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_published: true,
        }
    }
}
