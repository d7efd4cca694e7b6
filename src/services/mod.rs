//! Service layer
//!
//! Business logic between the HTTP handlers and the repositories:
//! - `password`: argon2 hashing and verification
//! - `user`: registration, login, sessions, profile edits
//! - `feed`: the paginated post listings (public, category, profile)
//! - `post`: post CRUD with the visibility and ownership rules applied
//! - `comment`: comment CRUD with folded-ownership semantics

pub mod comment;
pub mod feed;
pub mod password;
pub mod post;
pub mod user;

pub use comment::{CommentService, CommentServiceError};
pub use feed::{FeedError, FeedService, Paginated};
pub use post::{PostService, PostServiceError};
pub use user::{LoginInput, UserService, UserServiceError};
