//! Comment page handlers
//!
//! Adding, editing and deleting comments. Every lookup folds its
//! authorization into the query: commenting requires the post to be
//! published (nothing more — the gate is weaker than the view gate),
//! and mutating a comment requires owning it. Violations surface as
//! NotFound.

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};

use crate::models::{Comment, Post};
use crate::services::CommentServiceError;
use crate::web::auth::CurrentUser;
use crate::web::error::PageError;
use crate::web::forms::CommentForm;
use crate::web::state::AppState;
use crate::web::templates::TemplateEngine;

fn detail_url(post_id: i64) -> String {
    format!("/posts/{}/", post_id)
}

/// GET /posts/{id}/comment/
pub async fn add_comment_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(post_id): Path<i64>,
) -> Result<Response, PageError> {
    let post = state.post_service.get_published(post_id).await?;
    render_comment_form(&state, &user, &post, CommentForm::default(), Vec::new(), None)
}

/// POST /posts/{id}/comment/
pub async fn add_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(post_id): Path<i64>,
    Form(form): Form<CommentForm>,
) -> Result<Response, PageError> {
    let post = state.post_service.get_published(post_id).await?;

    match state.comment_service.add(post.id, &user, &form.text).await {
        Ok(_) => Ok(Redirect::to(&detail_url(post.id)).into_response()),
        Err(CommentServiceError::ValidationError(msg)) => {
            render_comment_form(&state, &user, &post, form, vec![msg], None)
        }
        Err(err) => Err(err.into()),
    }
}

/// GET /posts/{id}/edit_comment/{comment_id}/
pub async fn edit_comment_form(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((post_id, comment_id)): Path<(i64, i64)>,
) -> Result<Response, PageError> {
    let post = state.post_service.get_published(post_id).await?;
    let comment = state
        .comment_service
        .get_for_edit(comment_id, post_id, &user)
        .await?;

    let form = CommentForm {
        text: comment.text.clone(),
    };
    render_comment_form(&state, &user, &post, form, Vec::new(), Some(&comment))
}

/// POST /posts/{id}/edit_comment/{comment_id}/
pub async fn edit_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((post_id, comment_id)): Path<(i64, i64)>,
    Form(form): Form<CommentForm>,
) -> Result<Response, PageError> {
    let post = state.post_service.get_published(post_id).await?;

    match state
        .comment_service
        .edit(comment_id, post_id, &user, &form.text)
        .await
    {
        Ok(_) => Ok(Redirect::to(&detail_url(post.id)).into_response()),
        Err(CommentServiceError::ValidationError(msg)) => {
            let comment = state
                .comment_service
                .get_for_edit(comment_id, post_id, &user)
                .await?;
            render_comment_form(&state, &user, &post, form, vec![msg], Some(&comment))
        }
        Err(err) => Err(err.into()),
    }
}

/// GET /posts/{id}/delete_comment/{comment_id}/ — confirm page
pub async fn delete_comment_confirm(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((post_id, comment_id)): Path<(i64, i64)>,
) -> Result<Response, PageError> {
    let comment = state
        .comment_service
        .get_for_delete(comment_id, post_id, &user)
        .await?;
    let post = state
        .post_service
        .get_by_id(post_id)
        .await?
        .ok_or(PageError::NotFound)?;

    let mut context = TemplateEngine::context_for(Some(&user));
    context.insert("post", &post);
    context.insert("comment", &comment);
    Ok(state
        .templates
        .render("blog/delete_comment.html", &context)?
        .into_response())
}

/// POST /posts/{id}/delete_comment/{comment_id}/
pub async fn delete_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((post_id, comment_id)): Path<(i64, i64)>,
) -> Result<Response, PageError> {
    state
        .comment_service
        .delete(comment_id, post_id, &user)
        .await?;
    Ok(Redirect::to(&detail_url(post_id)).into_response())
}

fn render_comment_form(
    state: &AppState,
    user: &crate::models::User,
    post: &Post,
    form: CommentForm,
    errors: Vec<String>,
    comment: Option<&Comment>,
) -> Result<Response, PageError> {
    let mut context = TemplateEngine::context_for(Some(user));
    context.insert("post", post);
    context.insert("form", &form);
    context.insert("errors", &errors);
    if let Some(comment) = comment {
        context.insert("comment", comment);
    }
    Ok(state.templates.render("blog/comment.html", &context)?.into_response())
}
