//! Blogicum — a multi-user blogging platform

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blogicum::{
    config::Config,
    db::{
        self,
        repositories::{
            SessionRepository, SqlxCategoryRepository, SqlxCommentRepository,
            SqlxLocationRepository, SqlxPostRepository, SqlxSessionRepository,
            SqlxUserRepository,
        },
    },
    services::{CommentService, FeedService, PostService, UserService},
    web::{self, AppState},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blogicum=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Blogicum...");

    // Load configuration
    let config = Config::load(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {}", config.database.url);

    // Run migrations
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // Create repositories
    let user_repo = SqlxUserRepository::boxed(pool.clone());
    let session_repo = SqlxSessionRepository::boxed(pool.clone());
    let category_repo = SqlxCategoryRepository::boxed(pool.clone());
    let location_repo = SqlxLocationRepository::boxed(pool.clone());
    let post_repo = SqlxPostRepository::boxed(pool.clone());
    let comment_repo = SqlxCommentRepository::boxed(pool.clone());

    // Initialize services
    let user_service = Arc::new(UserService::new(user_repo, session_repo.clone()));
    let post_service = Arc::new(PostService::new(post_repo.clone()));
    let comment_service = Arc::new(CommentService::new(comment_repo, post_repo.clone()));
    let feed_service = Arc::new(FeedService::new(
        post_repo,
        category_repo.clone(),
        config.pagination.page_size,
    ));

    // Sweep stale sessions once at startup
    let removed = session_repo.delete_expired().await?;
    if removed > 0 {
        tracing::info!(removed, "Expired sessions removed");
    }

    // Load templates
    let templates = Arc::new(web::templates::TemplateEngine::new(&config.templates.path)?);
    tracing::info!("Templates loaded from {:?}", config.templates.path);

    // Build application state
    let state = AppState {
        user_service,
        post_service,
        comment_service,
        feed_service,
        category_repo,
        location_repo,
        templates,
        media_config: Arc::new(config.media.clone()),
    };

    // Build router
    let app = web::build_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
