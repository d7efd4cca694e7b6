//! Web layer — HTTP handlers and routing
//!
//! Server-rendered HTML pages over the service layer:
//! - the public, category and profile feeds
//! - the post detail view and the post/comment mutation flows
//! - registration, login/logout and profile editing
//! - static informational pages
//!
//! Successful POSTs answer with a redirect so a refresh never repeats
//! the write.

pub mod auth;
pub mod comments;
pub mod error;
pub mod forms;
pub mod pages;
pub mod posts;
pub mod profiles;
pub mod state;
pub mod templates;


use axum::{middleware as axum_middleware, routing::get, routing::post, Router};
use tower_http::{services::ServeDir, trace::TraceLayer};

pub use error::PageError;
pub use state::AppState;

/// Build the application router.
///
/// Route shape mirrors the site map: feeds and the detail view are
/// public, everything that writes goes through the `CurrentUser` guard
/// inside its handler. Uploaded images are served from the media
/// directory.
pub fn build_router(state: AppState) -> Router {
    let media_dir = state.media_config.path.clone();

    Router::new()
        .route("/", get(posts::index))
        .route("/posts/{id}/", get(posts::post_detail))
        .route("/category/{slug}/", get(posts::category_posts))
        .route(
            "/profile/edit/",
            get(profiles::edit_profile_form).post(profiles::edit_profile),
        )
        .route("/profile/{username}/", get(profiles::profile))
        .route(
            "/posts/create/",
            get(posts::create_post_form).post(posts::create_post),
        )
        .route(
            "/registration/",
            get(auth::registration_form).post(auth::register),
        )
        .route(
            "/posts/{id}/edit/",
            get(posts::edit_post_form).post(posts::edit_post),
        )
        .route(
            "/posts/{id}/comment/",
            get(comments::add_comment_form).post(comments::add_comment),
        )
        .route(
            "/posts/{id}/edit_comment/{comment_id}/",
            get(comments::edit_comment_form).post(comments::edit_comment),
        )
        .route(
            "/posts/{id}/delete/",
            get(posts::delete_post_confirm).post(posts::delete_post),
        )
        .route(
            "/posts/{id}/delete_comment/{comment_id}/",
            get(comments::delete_comment_confirm).post(comments::delete_comment),
        )
        .route("/login/", get(auth::login_form).post(auth::login))
        .route("/logout/", post(auth::logout))
        .route("/profile_redirect/", get(profiles::profile_redirect))
        .route("/about/", get(pages::about))
        .route("/rules/", get(pages::rules))
        .nest_service("/media", ServeDir::new(media_dir))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth::load_current_user,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
