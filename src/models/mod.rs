//! Data models for the Blogicum blog platform
//!
//! This module contains the entity types together with their input and
//! joined read models:
//! - `User`: registered accounts
//! - `Session`: authentication sessions
//! - `Category`: editorial post categories (administrator lifecycle)
//! - `Location`: optional post locations (administrator lifecycle)
//! - `Post`: blog posts with scheduled publication
//! - `Comment`: comments on posts

pub mod category;
pub mod comment;
pub mod location;
pub mod post;
pub mod session;
pub mod user;

pub use category::{Category, CategoryRef, CreateCategoryInput};
pub use comment::{Comment, CommentDetail, CreateCommentInput};
pub use location::{CreateLocationInput, Location, LocationRef};
pub use post::{AuthorRef, CreatePostInput, Post, PostDetail, UpdatePostInput};
pub use session::Session;
pub use user::{CreateUserInput, UpdateProfileInput, User};
