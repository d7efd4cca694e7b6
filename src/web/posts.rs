//! Post page handlers
//!
//! The index and category feeds, the single-post detail view, and the
//! create/edit/delete flows. The authorization contracts differ on
//! purpose and are inherited behavior:
//! - an invisible post reads as NotFound, never Forbidden
//! - a non-author editing a post is redirected to the read-only detail
//!   view instead of seeing an error
//! - a non-author deleting a post gets NotFound, because ownership is
//!   part of the lookup itself

use axum::{
    extract::{Multipart, Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;

use crate::db::repositories::{CategoryRepository, LocationRepository};
use crate::models::{CreatePostInput, Post, UpdatePostInput, User};
use crate::services::PostServiceError;
use crate::web::auth::{CurrentUser, OptionalUser};
use crate::web::error::PageError;
use crate::web::forms::{CommentForm, PageQuery, PostForm};
use crate::web::state::AppState;
use crate::web::templates::TemplateEngine;

/// GET /
pub async fn index(
    State(state): State<AppState>,
    viewer: OptionalUser,
    Query(query): Query<PageQuery>,
) -> Result<Response, PageError> {
    let page = state
        .feed_service
        .public_feed(Utc::now(), query.number())
        .await?;

    let mut context = TemplateEngine::context_for(viewer.as_ref());
    context.insert("page_obj", &page);
    Ok(state.templates.render("blog/index.html", &context)?.into_response())
}

/// GET /category/{slug}/
pub async fn category_posts(
    State(state): State<AppState>,
    viewer: OptionalUser,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Response, PageError> {
    let (category, page) = state
        .feed_service
        .category_feed(&slug, Utc::now(), query.number())
        .await?;

    let mut context = TemplateEngine::context_for(viewer.as_ref());
    context.insert("category", &category);
    context.insert("page_obj", &page);
    Ok(state.templates.render("blog/category.html", &context)?.into_response())
}

/// GET /posts/{id}/
pub async fn post_detail(
    State(state): State<AppState>,
    viewer: OptionalUser,
    Path(post_id): Path<i64>,
) -> Result<Response, PageError> {
    let post = state
        .post_service
        .visible_detail(post_id, viewer.as_ref(), Utc::now())
        .await?;
    let comments = state.comment_service.list_for_post(post.id).await?;

    let mut context = TemplateEngine::context_for(viewer.as_ref());
    context.insert("post", &post);
    context.insert("comments", &comments);
    context.insert("form", &CommentForm::default());
    Ok(state.templates.render("blog/detail.html", &context)?.into_response())
}

/// GET /posts/create/
pub async fn create_post_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Response, PageError> {
    // New posts default to published; the checkbox starts checked
    let form = PostForm {
        is_published: true,
        ..Default::default()
    };
    render_post_form(&state, &user, form, Vec::new(), None).await
}

/// POST /posts/create/
pub async fn create_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    multipart: Multipart,
) -> Result<Response, PageError> {
    let form = PostForm::from_multipart(multipart, &state.media_config).await?;
    let mut errors = Vec::new();

    match form.parsed_pub_date() {
        Ok(pub_date) => {
            let mut input = CreatePostInput::new(
                form.title.clone(),
                form.text.clone(),
                pub_date,
                user.id,
            );
            input.category_id = form.category_id;
            input.location_id = form.location_id;
            input.image = form.image.clone();
            input.is_published = form.is_published;

            match state.post_service.create(input).await {
                Ok(_) => {
                    let target =
                        format!("/profile/{}/", urlencoding::encode(&user.username));
                    return Ok(Redirect::to(&target).into_response());
                }
                Err(PostServiceError::ValidationError(msg)) => errors.push(msg),
                Err(err) => return Err(err.into()),
            }
        }
        Err(msg) => errors.push(msg),
    }

    render_post_form(&state, &user, form, errors, None).await
}

/// GET /posts/{id}/edit/
pub async fn edit_post_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(post_id): Path<i64>,
) -> Result<Response, PageError> {
    let post = match lookup_for_edit(&state, &user, post_id).await? {
        EditLookup::Owned(post) => post,
        EditLookup::Redirect(response) => return Ok(response),
    };

    let form = PostForm {
        title: post.title.clone(),
        text: post.text.clone(),
        pub_date: post.pub_date.format("%Y-%m-%dT%H:%M").to_string(),
        category_id: post.category_id,
        location_id: post.location_id,
        is_published: post.is_published,
        image: post.image.clone(),
    };
    render_post_form(&state, &user, form, Vec::new(), Some(post.id)).await
}

/// POST /posts/{id}/edit/
pub async fn edit_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(post_id): Path<i64>,
    multipart: Multipart,
) -> Result<Response, PageError> {
    let post = match lookup_for_edit(&state, &user, post_id).await? {
        EditLookup::Owned(post) => post,
        EditLookup::Redirect(response) => return Ok(response),
    };

    let form = PostForm::from_multipart(multipart, &state.media_config).await?;
    let mut errors = Vec::new();

    match form.parsed_pub_date() {
        Ok(pub_date) => {
            let input = UpdatePostInput {
                title: Some(form.title.clone()),
                text: Some(form.text.clone()),
                pub_date: Some(pub_date),
                category_id: Some(form.category_id),
                location_id: Some(form.location_id),
                // Only replace the stored image when a new one came in
                image: form.image.clone().map(Some),
                is_published: Some(form.is_published),
            };

            match state.post_service.update(post.id, input).await {
                Ok(_) => {
                    return Ok(Redirect::to(&format!("/posts/{}/", post.id)).into_response())
                }
                Err(PostServiceError::ValidationError(msg)) => errors.push(msg),
                Err(err) => return Err(err.into()),
            }
        }
        Err(msg) => errors.push(msg),
    }

    render_post_form(&state, &user, form, errors, Some(post.id)).await
}

/// GET /posts/{id}/delete/ — confirm page
pub async fn delete_post_confirm(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(post_id): Path<i64>,
) -> Result<Response, PageError> {
    // Ownership folded into the lookup: not yours reads as absent
    let post = state.post_service.get_owned(post_id, &user).await?;

    let mut context = TemplateEngine::context_for(Some(&user));
    context.insert("post", &post);
    Ok(state.templates.render("blog/delete.html", &context)?.into_response())
}

/// POST /posts/{id}/delete/
pub async fn delete_post(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(post_id): Path<i64>,
) -> Result<Response, PageError> {
    state.post_service.delete_owned(post_id, &user).await?;
    Ok(Redirect::to("/").into_response())
}

enum EditLookup {
    Owned(Post),
    Redirect(Response),
}

/// The edit-path lookup: absent posts are NotFound, posts owned by
/// someone else bounce to the read-only detail view.
async fn lookup_for_edit(
    state: &AppState,
    user: &User,
    post_id: i64,
) -> Result<EditLookup, PageError> {
    let post = state
        .post_service
        .get_by_id(post_id)
        .await?
        .ok_or(PageError::NotFound)?;

    if post.author_id != user.id {
        let target = format!("/posts/{}/", post_id);
        return Ok(EditLookup::Redirect(Redirect::to(&target).into_response()));
    }

    Ok(EditLookup::Owned(post))
}

async fn render_post_form(
    state: &AppState,
    user: &User,
    form: PostForm,
    errors: Vec<String>,
    editing_id: Option<i64>,
) -> Result<Response, PageError> {
    let categories = state
        .category_repo
        .list_published()
        .await
        .map_err(PageError::Internal)?;
    let locations = state
        .location_repo
        .list_published()
        .await
        .map_err(PageError::Internal)?;

    let mut context = TemplateEngine::context_for(Some(user));
    context.insert("form", &form);
    context.insert("errors", &errors);
    context.insert("categories", &categories);
    context.insert("locations", &locations);
    if let Some(id) = editing_id {
        context.insert("editing_id", &id);
    }
    Ok(state.templates.render("blog/create.html", &context)?.into_response())
}
