//! Post repository
//!
//! Database operations for posts, including the joined feed queries the
//! query-assembly layer builds on. Every feed row carries the author,
//! the optional category and location, and a comment count.
//!
//! Two lookup families deserve a note:
//! - `get_owned` folds ownership into the filter (`id AND author_id`),
//!   so a non-author asking for a post gets `None`, not an error.
//! - `get_published` folds the published flag only; it backs the comment
//!   gate, which is weaker than full public visibility.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use std::sync::Arc;

use crate::db::DbPool;
use crate::models::{AuthorRef, CategoryRef, CreatePostInput, LocationRef, Post, PostDetail, UpdatePostInput};

/// Post repository trait
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Create a new post
    async fn create(&self, input: &CreatePostInput) -> Result<Post>;

    /// Get post by ID, regardless of state
    async fn get_by_id(&self, id: i64) -> Result<Option<Post>>;

    /// Get the joined read model for a post, regardless of state
    async fn get_detail(&self, id: i64) -> Result<Option<PostDetail>>;

    /// Get a post only if `author_id` owns it (folded ownership lookup)
    async fn get_owned(&self, id: i64, author_id: i64) -> Result<Option<Post>>;

    /// Get a post only if it is published (the comment-gate lookup)
    async fn get_published(&self, id: i64) -> Result<Option<Post>>;

    /// Update a post
    async fn update(&self, id: i64, input: &UpdatePostInput) -> Result<Post>;

    /// Delete a post (comments cascade)
    async fn delete(&self, id: i64) -> Result<()>;

    /// List publicly visible posts, most recent `pub_date` first
    async fn list_public(&self, now: DateTime<Utc>, offset: i64, limit: i64) -> Result<Vec<PostDetail>>;

    /// Count publicly visible posts
    async fn count_public(&self, now: DateTime<Utc>) -> Result<i64>;

    /// List publicly visible posts in a category
    async fn list_public_by_category(
        &self,
        category_id: i64,
        now: DateTime<Utc>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<PostDetail>>;

    /// Count publicly visible posts in a category
    async fn count_public_by_category(&self, category_id: i64, now: DateTime<Utc>) -> Result<i64>;

    /// List all posts of an author, any state (the owner's profile feed)
    async fn list_by_author(&self, author_id: i64, offset: i64, limit: i64) -> Result<Vec<PostDetail>>;

    /// Count all posts of an author
    async fn count_by_author(&self, author_id: i64) -> Result<i64>;

    /// List publicly visible posts of an author (someone else's profile)
    async fn list_public_by_author(
        &self,
        author_id: i64,
        now: DateTime<Utc>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<PostDetail>>;

    /// Count publicly visible posts of an author
    async fn count_public_by_author(&self, author_id: i64, now: DateTime<Utc>) -> Result<i64>;
}

/// SQLx-based post repository implementation
pub struct SqlxPostRepository {
    pool: DbPool,
}

impl SqlxPostRepository {
    /// Create a new SQLx post repository
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a shared repository for use with dependency injection
    pub fn boxed(pool: DbPool) -> Arc<dyn PostRepository> {
        Arc::new(Self::new(pool))
    }
}

/// Columns selected for the joined read model
const DETAIL_COLUMNS: &str = r#"
    p.id, p.title, p.text, p.pub_date, p.author_id, p.category_id,
    p.location_id, p.image, p.is_published, p.created_at,
    u.username AS author_username,
    c.title AS category_title, c.slug AS category_slug,
    c.is_published AS category_is_published,
    l.name AS location_name,
    (SELECT COUNT(*) FROM comments cm WHERE cm.post_id = p.id) AS comment_count
"#;

const DETAIL_JOINS: &str = r#"
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN categories c ON c.id = p.category_id
    LEFT JOIN locations l ON l.id = p.location_id
"#;

/// The public three-way visibility rule, expressed as SQL. Must agree
/// with `policy::is_publicly_visible`; the `?` is the current instant.
const PUBLIC_FILTER: &str =
    "p.is_published = 1 AND p.pub_date <= ? AND (p.category_id IS NULL OR c.is_published = 1)";

const FEED_ORDER: &str = "ORDER BY p.pub_date DESC, p.id DESC LIMIT ? OFFSET ?";

fn detail_query(where_clause: &str, ordered: bool) -> String {
    let tail = if ordered { FEED_ORDER } else { "" };
    format!(
        "SELECT {} {} WHERE {} {}",
        DETAIL_COLUMNS, DETAIL_JOINS, where_clause, tail
    )
}

fn count_query(where_clause: &str) -> String {
    format!(
        "SELECT COUNT(*) AS count {} WHERE {}",
        DETAIL_JOINS, where_clause
    )
}

#[async_trait]
impl PostRepository for SqlxPostRepository {
    async fn create(&self, input: &CreatePostInput) -> Result<Post> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO posts (title, text, pub_date, author_id, category_id, location_id, image, is_published, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&input.title)
        .bind(&input.text)
        .bind(input.pub_date)
        .bind(input.author_id)
        .bind(input.category_id)
        .bind(input.location_id)
        .bind(&input.image)
        .bind(input.is_published)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create post")?;

        Ok(Post {
            id: result.last_insert_rowid(),
            title: input.title.clone(),
            text: input.text.clone(),
            pub_date: input.pub_date,
            author_id: input.author_id,
            category_id: input.category_id,
            location_id: input.location_id,
            image: input.image.clone(),
            is_published: input.is_published,
            created_at: now,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Post>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, text, pub_date, author_id, category_id, location_id, image, is_published, created_at
            FROM posts
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get post by ID")?;

        row.map(|row| row_to_post(&row)).transpose()
    }

    async fn get_detail(&self, id: i64) -> Result<Option<PostDetail>> {
        let query = detail_query("p.id = ?", false);
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get post detail")?;

        row.map(|row| row_to_detail(&row)).transpose()
    }

    async fn get_owned(&self, id: i64, author_id: i64) -> Result<Option<Post>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, text, pub_date, author_id, category_id, location_id, image, is_published, created_at
            FROM posts
            WHERE id = ? AND author_id = ?
            "#,
        )
        .bind(id)
        .bind(author_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get owned post")?;

        row.map(|row| row_to_post(&row)).transpose()
    }

    async fn get_published(&self, id: i64) -> Result<Option<Post>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, text, pub_date, author_id, category_id, location_id, image, is_published, created_at
            FROM posts
            WHERE id = ? AND is_published = 1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get published post")?;

        row.map(|row| row_to_post(&row)).transpose()
    }

    async fn update(&self, id: i64, input: &UpdatePostInput) -> Result<Post> {
        let existing = self
            .get_by_id(id)
            .await?
            .with_context(|| format!("Post {} not found", id))?;

        let title = input.title.clone().unwrap_or(existing.title);
        let text = input.text.clone().unwrap_or(existing.text);
        let pub_date = input.pub_date.unwrap_or(existing.pub_date);
        let category_id = input.category_id.unwrap_or(existing.category_id);
        let location_id = input.location_id.unwrap_or(existing.location_id);
        let image = input.image.clone().unwrap_or(existing.image);
        let is_published = input.is_published.unwrap_or(existing.is_published);

        sqlx::query(
            r#"
            UPDATE posts
            SET title = ?, text = ?, pub_date = ?, category_id = ?, location_id = ?, image = ?, is_published = ?
            WHERE id = ?
            "#,
        )
        .bind(&title)
        .bind(&text)
        .bind(pub_date)
        .bind(category_id)
        .bind(location_id)
        .bind(&image)
        .bind(is_published)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update post")?;

        Ok(Post {
            title,
            text,
            pub_date,
            category_id,
            location_id,
            image,
            is_published,
            ..existing
        })
    }

    async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete post")?;
        Ok(())
    }

    async fn list_public(&self, now: DateTime<Utc>, offset: i64, limit: i64) -> Result<Vec<PostDetail>> {
        let query = detail_query(PUBLIC_FILTER, true);
        let rows = sqlx::query(&query)
            .bind(now)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list public posts")?;

        rows.iter().map(row_to_detail).collect()
    }

    async fn count_public(&self, now: DateTime<Utc>) -> Result<i64> {
        let query = count_query(PUBLIC_FILTER);
        let row = sqlx::query(&query)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count public posts")?;
        Ok(row.try_get("count")?)
    }

    async fn list_public_by_category(
        &self,
        category_id: i64,
        now: DateTime<Utc>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<PostDetail>> {
        let filter = format!("{} AND p.category_id = ?", PUBLIC_FILTER);
        let query = detail_query(&filter, true);
        let rows = sqlx::query(&query)
            .bind(now)
            .bind(category_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list public posts by category")?;

        rows.iter().map(row_to_detail).collect()
    }

    async fn count_public_by_category(&self, category_id: i64, now: DateTime<Utc>) -> Result<i64> {
        let filter = format!("{} AND p.category_id = ?", PUBLIC_FILTER);
        let query = count_query(&filter);
        let row = sqlx::query(&query)
            .bind(now)
            .bind(category_id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count public posts by category")?;
        Ok(row.try_get("count")?)
    }

    async fn list_by_author(&self, author_id: i64, offset: i64, limit: i64) -> Result<Vec<PostDetail>> {
        let query = detail_query("p.author_id = ?", true);
        let rows = sqlx::query(&query)
            .bind(author_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list posts by author")?;

        rows.iter().map(row_to_detail).collect()
    }

    async fn count_by_author(&self, author_id: i64) -> Result<i64> {
        let query = count_query("p.author_id = ?");
        let row = sqlx::query(&query)
            .bind(author_id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count posts by author")?;
        Ok(row.try_get("count")?)
    }

    async fn list_public_by_author(
        &self,
        author_id: i64,
        now: DateTime<Utc>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<PostDetail>> {
        let filter = format!("{} AND p.author_id = ?", PUBLIC_FILTER);
        let query = detail_query(&filter, true);
        let rows = sqlx::query(&query)
            .bind(now)
            .bind(author_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list public posts by author")?;

        rows.iter().map(row_to_detail).collect()
    }

    async fn count_public_by_author(&self, author_id: i64, now: DateTime<Utc>) -> Result<i64> {
        let filter = format!("{} AND p.author_id = ?", PUBLIC_FILTER);
        let query = count_query(&filter);
        let row = sqlx::query(&query)
            .bind(now)
            .bind(author_id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count public posts by author")?;
        Ok(row.try_get("count")?)
    }
}

fn row_to_post(row: &sqlx::sqlite::SqliteRow) -> Result<Post> {
    Ok(Post {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        text: row.try_get("text")?,
        pub_date: row.try_get("pub_date")?,
        author_id: row.try_get("author_id")?,
        category_id: row.try_get("category_id")?,
        location_id: row.try_get("location_id")?,
        image: row.try_get("image")?,
        is_published: row.try_get("is_published")?,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_detail(row: &sqlx::sqlite::SqliteRow) -> Result<PostDetail> {
    let category = match row.try_get::<Option<i64>, _>("category_id")? {
        Some(id) => Some(CategoryRef {
            id,
            title: row.try_get("category_title")?,
            slug: row.try_get("category_slug")?,
            is_published: row.try_get("category_is_published")?,
        }),
        None => None,
    };

    let location = match row.try_get::<Option<i64>, _>("location_id")? {
        Some(id) => Some(LocationRef {
            id,
            name: row.try_get("location_name")?,
        }),
        None => None,
    };

    Ok(PostDetail {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        text: row.try_get("text")?,
        pub_date: row.try_get("pub_date")?,
        author: AuthorRef {
            id: row.try_get("author_id")?,
            username: row.try_get("author_username")?,
        },
        category,
        location,
        image: row.try_get("image")?,
        is_published: row.try_get("is_published")?,
        created_at: row.try_get("created_at")?,
        comment_count: row.try_get("comment_count")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        CategoryRepository, CommentRepository, SqlxCategoryRepository, SqlxCommentRepository,
        SqlxUserRepository, UserRepository,
    };
    use crate::db::{create_test_pool, migrations};
    use crate::models::{CreateCategoryInput, CreateCommentInput, User};
    use chrono::Duration;

    struct Fixture {
        posts: SqlxPostRepository,
        comments: SqlxCommentRepository,
        categories: SqlxCategoryRepository,
        alice: User,
        bob: User,
    }

    async fn setup() -> Fixture {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();

        let users = SqlxUserRepository::new(pool.clone());
        let alice = users
            .create(&User::new(
                "alice".into(),
                "alice@example.com".into(),
                String::new(),
                String::new(),
                "hash".into(),
            ))
            .await
            .unwrap();
        let bob = users
            .create(&User::new(
                "bob".into(),
                "bob@example.com".into(),
                String::new(),
                String::new(),
                "hash".into(),
            ))
            .await
            .unwrap();

        Fixture {
            posts: SqlxPostRepository::new(pool.clone()),
            comments: SqlxCommentRepository::new(pool.clone()),
            categories: SqlxCategoryRepository::new(pool),
            alice,
            bob,
        }
    }

    #[tokio::test]
    async fn test_create_and_detail_join() {
        let fx = setup().await;
        let now = Utc::now();

        let category = fx
            .categories
            .create(&CreateCategoryInput::new("Travel", "travel"))
            .await
            .unwrap();
        let post = fx
            .posts
            .create(
                &CreatePostInput::new("Hi", "Body", now - Duration::hours(1), fx.alice.id)
                    .with_category(category.id),
            )
            .await
            .unwrap();

        let detail = fx.posts.get_detail(post.id).await.unwrap().unwrap();
        assert_eq!(detail.author.username, "alice");
        assert_eq!(detail.category.as_ref().unwrap().slug, "travel");
        assert!(detail.location.is_none());
        assert_eq!(detail.comment_count, 0);
    }

    #[tokio::test]
    async fn test_owned_lookup_folds_ownership() {
        let fx = setup().await;
        let post = fx
            .posts
            .create(&CreatePostInput::new("Hi", "Body", Utc::now(), fx.alice.id))
            .await
            .unwrap();

        assert!(fx.posts.get_owned(post.id, fx.alice.id).await.unwrap().is_some());
        // Indistinguishable from an absent post
        assert!(fx.posts.get_owned(post.id, fx.bob.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_published_lookup_ignores_schedule() {
        let fx = setup().await;
        let future = Utc::now() + Duration::days(1);

        let scheduled = fx
            .posts
            .create(&CreatePostInput::new("Soon", "Body", future, fx.alice.id))
            .await
            .unwrap();
        let draft = fx
            .posts
            .create(&CreatePostInput::new("Draft", "Body", Utc::now(), fx.alice.id).draft())
            .await
            .unwrap();

        // Future-dated but published: the comment gate accepts it
        assert!(fx.posts.get_published(scheduled.id).await.unwrap().is_some());
        assert!(fx.posts.get_published(draft.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_public_feed_filters_and_orders() {
        let fx = setup().await;
        let now = Utc::now();

        let hidden_cat = fx
            .categories
            .create(&CreateCategoryInput::new("Hidden", "hidden").unpublished())
            .await
            .unwrap();

        fx.posts
            .create(&CreatePostInput::new("Old", "Body", now - Duration::days(2), fx.alice.id))
            .await
            .unwrap();
        fx.posts
            .create(&CreatePostInput::new("New", "Body", now - Duration::hours(1), fx.alice.id))
            .await
            .unwrap();
        fx.posts
            .create(&CreatePostInput::new("Draft", "Body", now, fx.alice.id).draft())
            .await
            .unwrap();
        fx.posts
            .create(&CreatePostInput::new("Future", "Body", now + Duration::days(1), fx.alice.id))
            .await
            .unwrap();
        fx.posts
            .create(
                &CreatePostInput::new("Buried", "Body", now, fx.alice.id)
                    .with_category(hidden_cat.id),
            )
            .await
            .unwrap();

        let feed = fx.posts.list_public(now, 0, 10).await.unwrap();
        let titles: Vec<&str> = feed.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["New", "Old"]);
        assert_eq!(fx.posts.count_public(now).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_feed_tie_break_is_id_descending() {
        let fx = setup().await;
        let now = Utc::now();
        let same_moment = now - Duration::hours(1);

        let first = fx
            .posts
            .create(&CreatePostInput::new("First", "Body", same_moment, fx.alice.id))
            .await
            .unwrap();
        let second = fx
            .posts
            .create(&CreatePostInput::new("Second", "Body", same_moment, fx.alice.id))
            .await
            .unwrap();

        let feed = fx.posts.list_public(now, 0, 10).await.unwrap();
        let ids: Vec<i64> = feed.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn test_author_feed_includes_all_states() {
        let fx = setup().await;
        let now = Utc::now();

        fx.posts
            .create(&CreatePostInput::new("Live", "Body", now - Duration::hours(1), fx.alice.id))
            .await
            .unwrap();
        fx.posts
            .create(&CreatePostInput::new("Draft", "Body", now, fx.alice.id).draft())
            .await
            .unwrap();
        fx.posts
            .create(&CreatePostInput::new("Future", "Body", now + Duration::days(1), fx.alice.id))
            .await
            .unwrap();
        fx.posts
            .create(&CreatePostInput::new("Bobs", "Body", now, fx.bob.id))
            .await
            .unwrap();

        assert_eq!(fx.posts.count_by_author(fx.alice.id).await.unwrap(), 3);
        assert_eq!(
            fx.posts.count_public_by_author(fx.alice.id, now).await.unwrap(),
            1
        );

        let all = fx.posts.list_by_author(fx.alice.id, 0, 10).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_delete_cascades_to_comments() {
        let fx = setup().await;
        let post = fx
            .posts
            .create(&CreatePostInput::new("Hi", "Body", Utc::now(), fx.alice.id))
            .await
            .unwrap();

        fx.comments
            .create(&CreateCommentInput::new(post.id, fx.bob.id, "Nice"))
            .await
            .unwrap();
        assert_eq!(fx.comments.count_for_post(post.id).await.unwrap(), 1);

        fx.posts.delete(post.id).await.unwrap();
        assert!(fx.posts.get_by_id(post.id).await.unwrap().is_none());
        assert_eq!(fx.comments.count_for_post(post.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_clears_category() {
        let fx = setup().await;
        let category = fx
            .categories
            .create(&CreateCategoryInput::new("Travel", "travel"))
            .await
            .unwrap();
        let post = fx
            .posts
            .create(
                &CreatePostInput::new("Hi", "Body", Utc::now(), fx.alice.id)
                    .with_category(category.id),
            )
            .await
            .unwrap();

        let updated = fx
            .posts
            .update(
                post.id,
                &UpdatePostInput {
                    category_id: Some(None),
                    title: Some("Hello".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Hello");
        assert!(updated.category_id.is_none());
        assert_eq!(updated.text, "Body");
    }
}
