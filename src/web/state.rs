//! Shared application state

use std::sync::Arc;

use crate::config::MediaConfig;
use crate::db::repositories::{CategoryRepository, LocationRepository};
use crate::services::{CommentService, FeedService, PostService, UserService};
use crate::web::templates::TemplateEngine;

/// Application state containing the shared services
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub post_service: Arc<PostService>,
    pub comment_service: Arc<CommentService>,
    pub feed_service: Arc<FeedService>,
    pub category_repo: Arc<dyn CategoryRepository>,
    pub location_repo: Arc<dyn LocationRepository>,
    pub templates: Arc<TemplateEngine>,
    pub media_config: Arc<MediaConfig>,
}
