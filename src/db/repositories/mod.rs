//! Repository layer
//!
//! One repository per entity, each defined as a trait (the seam the
//! service layer depends on) plus a SQLx implementation. Lookups whose
//! filter already encodes an authorization check (ownership, published
//! state) live here as dedicated methods: callers cannot distinguish
//! "absent" from "not yours", which is the intended behavior.

pub mod category;
pub mod comment;
pub mod location;
pub mod post;
pub mod session;
pub mod user;

pub use category::{CategoryRepository, SqlxCategoryRepository};
pub use comment::{CommentRepository, SqlxCommentRepository};
pub use location::{LocationRepository, SqlxLocationRepository};
pub use post::{PostRepository, SqlxPostRepository};
pub use session::{SessionRepository, SqlxSessionRepository};
pub use user::{SqlxUserRepository, UserRepository};
