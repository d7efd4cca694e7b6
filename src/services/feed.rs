//! Feed service
//!
//! Builds the ordered, paginated post listings:
//! - the public index feed
//! - a category feed (published categories only)
//! - a profile feed, where the profile owner sees every post of theirs
//!   and everyone else sees only the publicly visible subset
//!
//! Every feed row is a joined `PostDetail` (author, category, location,
//! comment count), ordered by `pub_date` descending with `id` descending
//! as the tie-break. Page numbers are 1-based; out-of-range requests
//! clamp to the nearest valid page instead of erroring.

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::db::repositories::{CategoryRepository, PostRepository};
use crate::models::{Category, PostDetail, User};

/// Error types for feed operations
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// Category absent or unpublished
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// One page of a feed
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    /// Items on the current page
    pub items: Vec<T>,
    /// Total number of items across all pages
    pub total: i64,
    /// Current page number (1-based, already clamped)
    pub page: u32,
    /// Page size the feed was sliced with
    pub page_size: u32,
    /// Total number of pages; an empty feed still has one (empty) page
    pub total_pages: u32,
}

impl<T> Paginated<T> {
    /// Check if there is a page after the current one
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Check if there is a page before the current one
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

fn total_pages(total: i64, page_size: u32) -> u32 {
    if total <= 0 {
        return 1;
    }
    ((total as u64).div_ceil(page_size as u64)) as u32
}

/// Clamp a requested 1-based page number into the valid range for the
/// given total. Page 0 and under-range requests land on the first page,
/// over-range requests on the last.
pub fn clamp_page(requested: u32, total: i64, page_size: u32) -> u32 {
    requested.clamp(1, total_pages(total, page_size))
}

/// Feed service producing the paginated listings
pub struct FeedService {
    posts: Arc<dyn PostRepository>,
    categories: Arc<dyn CategoryRepository>,
    page_size: u32,
}

impl FeedService {
    /// Create a new feed service with the given page size
    pub fn new(
        posts: Arc<dyn PostRepository>,
        categories: Arc<dyn CategoryRepository>,
        page_size: u32,
    ) -> Self {
        Self {
            posts,
            categories,
            page_size: page_size.max(1),
        }
    }

    /// The public index feed: every post passing the three-way
    /// visibility rule at `now`, most recent first.
    pub async fn public_feed(
        &self,
        now: DateTime<Utc>,
        requested_page: u32,
    ) -> Result<Paginated<PostDetail>, FeedError> {
        let total = self
            .posts
            .count_public(now)
            .await
            .context("Failed to count public feed")?;
        let page = clamp_page(requested_page, total, self.page_size);

        let items = self
            .posts
            .list_public(now, self.offset(page), self.page_size as i64)
            .await
            .context("Failed to list public feed")?;

        Ok(self.page_of(items, total, page))
    }

    /// A category feed. Fails with `NotFound` unless a *published*
    /// category carries the slug; the posts are then the public feed
    /// narrowed to it.
    pub async fn category_feed(
        &self,
        slug: &str,
        now: DateTime<Utc>,
        requested_page: u32,
    ) -> Result<(Category, Paginated<PostDetail>), FeedError> {
        let category = self
            .categories
            .get_published_by_slug(slug)
            .await
            .context("Failed to look up category")?
            .ok_or_else(|| FeedError::NotFound(format!("Category '{}' not found", slug)))?;

        let total = self
            .posts
            .count_public_by_category(category.id, now)
            .await
            .context("Failed to count category feed")?;
        let page = clamp_page(requested_page, total, self.page_size);

        let items = self
            .posts
            .list_public_by_category(category.id, now, self.offset(page), self.page_size as i64)
            .await
            .context("Failed to list category feed")?;

        let paginated = self.page_of(items, total, page);
        Ok((category, paginated))
    }

    /// A profile feed. The profile owner sees all of their posts,
    /// published or not, any `pub_date`; every other viewer sees only
    /// the publicly visible subset. This is the listing-level mirror of
    /// the author bypass.
    pub async fn profile_feed(
        &self,
        profile: &User,
        viewer: Option<&User>,
        now: DateTime<Utc>,
        requested_page: u32,
    ) -> Result<Paginated<PostDetail>, FeedError> {
        let is_owner = viewer.map_or(false, |v| v.id == profile.id);

        if is_owner {
            let total = self
                .posts
                .count_by_author(profile.id)
                .await
                .context("Failed to count profile feed")?;
            let page = clamp_page(requested_page, total, self.page_size);
            let items = self
                .posts
                .list_by_author(profile.id, self.offset(page), self.page_size as i64)
                .await
                .context("Failed to list profile feed")?;
            return Ok(self.page_of(items, total, page));
        }

        let total = self
            .posts
            .count_public_by_author(profile.id, now)
            .await
            .context("Failed to count profile feed")?;
        let page = clamp_page(requested_page, total, self.page_size);
        let items = self
            .posts
            .list_public_by_author(profile.id, now, self.offset(page), self.page_size as i64)
            .await
            .context("Failed to list profile feed")?;
        Ok(self.page_of(items, total, page))
    }

    fn offset(&self, page: u32) -> i64 {
        ((page - 1) as i64) * (self.page_size as i64)
    }

    fn page_of<T>(&self, items: Vec<T>, total: i64, page: u32) -> Paginated<T> {
        Paginated {
            items,
            total,
            page,
            page_size: self.page_size,
            total_pages: total_pages(total, self.page_size),
        }
    }
}
